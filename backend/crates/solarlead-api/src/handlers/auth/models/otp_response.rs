//! OTP response models

use serde::{Deserialize, Serialize};
use solarlead_auth::OtpDispatch;

/// Returned once a code is on its way.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendOtpResponse {
    /// "email" or "sms"
    pub channel: String,
    /// "primary" or "secondary"
    pub provider: String,
    /// Must be echoed back on verify when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<String>,
}

impl From<OtpDispatch> for SendOtpResponse {
    fn from(dispatch: OtpDispatch) -> Self {
        Self {
            channel: dispatch.route.channel().to_string(),
            provider: dispatch.route.provider().to_string(),
            session_info: dispatch.session_info,
        }
    }
}

/// Returned after a successful login. Tokens travel in cookies only.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub user_id: String,
    /// Path the browser should navigate to next
    pub redirect: String,
}
