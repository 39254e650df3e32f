use crate::errors::AuthResult;
use crate::otp::OtpTarget;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use solarlead_commons::UserId;

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A token pair issued by the primary provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: ProviderUser,
}

/// Primary identity provider.
///
/// Every successful login ends with a [`ProviderSession`] from this provider;
/// the session resolver only ever validates tokens it issued.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Introspect an access token.
    async fn get_user(&self, access_token: &str) -> AuthResult<ProviderUser>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh_session(&self, refresh_token: &str) -> AuthResult<ProviderSession>;

    /// Send a one-time password by email or SMS depending on the target.
    async fn send_otp(&self, target: &OtpTarget) -> AuthResult<()>;

    async fn verify_otp(&self, target: &OtpTarget, code: &str) -> AuthResult<ProviderSession>;

    /// Sign in with an ID token minted by another provider.
    async fn exchange_id_token(&self, provider: &str, id_token: &str)
        -> AuthResult<ProviderSession>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
}
