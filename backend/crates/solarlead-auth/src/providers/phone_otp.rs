//! Secondary phone OTP provider (Identity Toolkit REST API).
//!
//! Only sends and checks SMS codes. A verified phone yields an ID token which
//! is exchanged with the primary provider, so sessions always come from one
//! place.

use super::hosted::{error_detail, transport_error};
use crate::errors::{AuthError, AuthResult};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use solarlead_configs::PhoneOtpSettings;

/// Result of a successful code check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPhone {
    pub id_token: String,
    pub phone: String,
    pub provider_uid: String,
}

#[async_trait::async_trait]
pub trait PhoneOtpProvider: Send + Sync {
    /// Send a code to an E.164 number. Returns the opaque session info the
    /// client must echo back on verification.
    async fn send_code(&self, phone: &str, verification_token: Option<&str>) -> AuthResult<String>;

    async fn verify_code(&self, session_info: &str, code: &str) -> AuthResult<VerifiedPhone>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeResponse {
    session_info: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    #[serde(default)]
    local_id: String,
    #[serde(default)]
    phone_number: String,
}

fn map_status(status: StatusCode, detail: String) -> AuthError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        AuthError::RateLimited
    } else if status.is_server_error() {
        AuthError::ProviderUnavailable(format!("phone OTP provider returned {}", status))
    } else {
        AuthError::OtpRejected(detail)
    }
}

#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitClient {
    pub fn new(settings: &PhoneOtpSettings, request_timeout_ms: u64) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(request_timeout_ms))
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self::with_client(http, &settings.base_url, &settings.api_key))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn call<T>(&self, method: &str, body: serde_json::Value) -> AuthResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(format!("{}/accounts:{}", self.base_url, method))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // Identity Toolkit nests the reason: {"error": {"message": "INVALID_CODE"}}
            let detail = error_detail(response).await;
            log::debug!("Phone OTP provider {} failed: {} {}", method, status, detail);
            return Err(map_status(status, detail));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("malformed {} response: {}", method, e)))
    }
}

#[async_trait::async_trait]
impl PhoneOtpProvider for IdentityToolkitClient {
    async fn send_code(&self, phone: &str, verification_token: Option<&str>) -> AuthResult<String> {
        let mut body = json!({ "phoneNumber": phone });
        if let Some(token) = verification_token {
            body["recaptchaToken"] = json!(token);
        }

        let response: SendCodeResponse = self.call("sendVerificationCode", body).await?;
        Ok(response.session_info)
    }

    async fn verify_code(&self, session_info: &str, code: &str) -> AuthResult<VerifiedPhone> {
        let body = json!({ "sessionInfo": session_info, "code": code });
        let response: SignInResponse = self.call("signInWithPhoneNumber", body).await?;

        Ok(VerifiedPhone {
            id_token: response.id_token,
            phone: response.phone_number,
            provider_uid: response.local_id,
        })
    }
}
