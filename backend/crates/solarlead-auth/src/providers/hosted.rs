//! reqwest client for the hosted auth service (GoTrue-compatible REST API).

use super::identity::{IdentityProvider, ProviderSession, ProviderUser};
use super::token;
use crate::errors::{AuthError, AuthResult};
use crate::otp::OtpTarget;
use chrono::{DateTime, Duration, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use solarlead_configs::IdentitySettings;

/// Which provider call produced a status. The same code means different
/// things depending on the call (a 400 on verify is a wrong code, a 400 on
/// refresh is a dead refresh token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthCall {
    GetUser,
    Refresh,
    SendOtp,
    VerifyOtp,
    IdTokenGrant,
    SignOut,
}

/// Map a non-success provider status to an [`AuthError`].
pub(crate) fn map_status(call: AuthCall, status: StatusCode, detail: String) -> AuthError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return match call {
            AuthCall::SendOtp | AuthCall::VerifyOtp => AuthError::RateLimited,
            _ => AuthError::ProviderUnavailable(format!("identity provider throttled ({})", status)),
        };
    }
    if status.is_server_error() {
        return AuthError::ProviderUnavailable(format!("identity provider returned {}", status));
    }

    match call {
        AuthCall::GetUser if status == StatusCode::NOT_FOUND => AuthError::UserNotFound(detail),
        AuthCall::GetUser | AuthCall::IdTokenGrant | AuthCall::SignOut => {
            AuthError::InvalidToken(detail)
        },
        AuthCall::Refresh => AuthError::InvalidToken(format!("refresh rejected: {}", detail)),
        AuthCall::SendOtp | AuthCall::VerifyOtp => AuthError::OtpRejected(detail),
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::ProviderUnavailable("identity provider timed out".to_string())
    } else {
        AuthError::ProviderUnavailable(format!("identity provider unreachable: {}", err))
    }
}

/// Pull a human-readable reason out of an error body.
pub(crate) async fn error_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let from_json = serde_json::from_str::<Value>(&body).ok().and_then(|v| {
        ["msg", "error_description", "message", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
            .or_else(|| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
    });

    match from_json {
        Some(msg) => msg,
        None if body.trim().is_empty() => status.to_string(),
        None => body.chars().take(200).collect(),
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: ProviderUser,
}

impl SessionBody {
    fn into_session(self, now: DateTime<Utc>) -> ProviderSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)))
            .or_else(|| token::peek_expiry(&self.access_token));

        ProviderSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Client for the primary identity provider.
#[derive(Debug, Clone)]
pub struct HostedAuthClient {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl HostedAuthClient {
    pub fn new(settings: &IdentitySettings) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self::with_client(http, &settings.base_url, &settings.anon_key))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            auth_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send(&self, call: AuthCall, request: RequestBuilder) -> AuthResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = error_detail(response).await;
        log::debug!("Identity provider {:?} failed: {} {}", call, status, detail);
        Err(map_status(call, status, detail))
    }

    async fn session_call(&self, call: AuthCall, request: RequestBuilder) -> AuthResult<ProviderSession> {
        let body: SessionBody = self
            .send(call, request)
            .await?
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("malformed session response: {}", e)))?;

        Ok(body.into_session(Utc::now()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HostedAuthClient {
    async fn get_user(&self, access_token: &str) -> AuthResult<ProviderUser> {
        let request = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);

        let response = match self.send(AuthCall::GetUser, request).await {
            Ok(response) => response,
            Err(AuthError::InvalidToken(_)) if token::is_expired(access_token) => {
                return Err(AuthError::TokenExpired)
            },
            Err(e) => return Err(e),
        };

        response
            .json::<ProviderUser>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("malformed user response: {}", e)))
    }

    async fn refresh_session(&self, refresh_token: &str) -> AuthResult<ProviderSession> {
        let request = self
            .post("/token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        self.session_call(AuthCall::Refresh, request).await
    }

    async fn send_otp(&self, target: &OtpTarget) -> AuthResult<()> {
        let body = match target {
            OtpTarget::Email(email) => json!({ "email": email, "create_user": true }),
            OtpTarget::Phone(phone) => {
                json!({ "phone": phone, "create_user": true, "channel": "sms" })
            },
        };

        self.send(AuthCall::SendOtp, self.post("/otp").json(&body)).await?;
        Ok(())
    }

    async fn verify_otp(&self, target: &OtpTarget, code: &str) -> AuthResult<ProviderSession> {
        let body = match target {
            OtpTarget::Email(email) => json!({ "type": "email", "email": email, "token": code }),
            OtpTarget::Phone(phone) => json!({ "type": "sms", "phone": phone, "token": code }),
        };

        self.session_call(AuthCall::VerifyOtp, self.post("/verify").json(&body))
            .await
    }

    async fn exchange_id_token(&self, provider: &str, id_token: &str) -> AuthResult<ProviderSession> {
        let request = self
            .post("/token")
            .query(&[("grant_type", "id_token")])
            .json(&json!({ "provider": provider, "id_token": id_token }));

        self.session_call(AuthCall::IdTokenGrant, request).await
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let request = self.post("/logout").bearer_auth(access_token);
        match self.send(AuthCall::SignOut, request).await {
            Ok(_) => Ok(()),
            // Already revoked or expired: nothing left to sign out.
            Err(AuthError::InvalidToken(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
