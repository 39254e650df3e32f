//! OTP request models

use serde::{Deserialize, Serialize};

/// Email addresses top out at 254; phone input with separators is far shorter.
const MAX_IDENTIFIER_LENGTH: usize = 254;
const MAX_CODE_LENGTH: usize = 16;
/// Provider handles (reCAPTCHA tokens, session info) can run to a few KB.
const MAX_TOKEN_LENGTH: usize = 4096;
const MAX_REDIRECT_LENGTH: usize = 2048;

/// POST /api/auth/otp/send body
#[derive(Debug, Deserialize, Serialize)]
pub struct SendOtpRequest {
    /// Email address or phone number
    #[serde(deserialize_with = "validate_identifier_length")]
    pub identifier: String,
    /// Bot-check token forwarded to the phone OTP provider
    #[serde(default, deserialize_with = "validate_optional_token_length")]
    pub verification_token: Option<String>,
}

/// POST /api/auth/otp/verify body
#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyOtpRequest {
    #[serde(deserialize_with = "validate_identifier_length")]
    pub identifier: String,
    #[serde(deserialize_with = "validate_code_length")]
    pub code: String,
    /// Handle returned by the send call when the phone provider was used
    #[serde(default, deserialize_with = "validate_optional_token_length")]
    pub session_info: Option<String>,
    /// Where the user was headed before login
    #[serde(default, deserialize_with = "validate_optional_redirect_length")]
    pub redirect: Option<String>,
}

fn bounded<'de, D>(deserializer: D, field: &str, max: usize) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.len() > max {
        return Err(serde::de::Error::custom(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(s)
}

fn bounded_optional<'de, D>(deserializer: D, field: &str, max: usize) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s {
        Some(s) if s.len() > max => Err(serde::de::Error::custom(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        ))),
        other => Ok(other),
    }
}

pub(crate) fn validate_identifier_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    bounded(deserializer, "identifier", MAX_IDENTIFIER_LENGTH)
}

pub(crate) fn validate_code_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    bounded(deserializer, "code", MAX_CODE_LENGTH)
}

fn validate_optional_token_length<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    bounded_optional(deserializer, "token", MAX_TOKEN_LENGTH)
}

fn validate_optional_redirect_length<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    bounded_optional(deserializer, "redirect", MAX_REDIRECT_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_optional_token() {
        let req: SendOtpRequest = serde_json::from_str(r#"{"identifier":"98765 43210"}"#).unwrap();
        assert_eq!(req.identifier, "98765 43210");
        assert_eq!(req.verification_token, None);
    }

    #[test]
    fn test_overlong_identifier_rejected() {
        let body = format!(r#"{{"identifier":"{}"}}"#, "a".repeat(MAX_IDENTIFIER_LENGTH + 1));
        let err = serde_json::from_str::<SendOtpRequest>(&body).unwrap_err();
        assert!(err.to_string().contains("identifier exceeds maximum length"));
    }

    #[test]
    fn test_verify_request() {
        let req: VerifyOtpRequest = serde_json::from_str(
            r#"{"identifier":"a@example.in","code":"123456","redirect":"/dashboard/leads"}"#,
        )
        .unwrap();
        assert_eq!(req.code, "123456");
        assert_eq!(req.session_info, None);
        assert_eq!(req.redirect.as_deref(), Some("/dashboard/leads"));

        let body = format!(r#"{{"identifier":"a@example.in","code":"{}"}}"#, "1".repeat(17));
        assert!(serde_json::from_str::<VerifyOtpRequest>(&body).is_err());
    }
}
