use serde::{Deserialize, Serialize};
use solarlead_commons::UserAccess;

/// GET /api/auth/me body
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: String,
    /// Absent when the user store had no answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl MeResponse {
    pub fn new(user_id: impl Into<String>, access: Option<UserAccess>) -> Self {
        Self {
            user_id: user_id.into(),
            role: access.map(|a| a.role.as_str().to_string()),
            is_active: access.map(|a| a.is_active),
        }
    }
}
