//! Closed set of failures produced by the provider adapters.
//!
//! Adapters translate HTTP statuses and transport errors into these kinds so
//! callers can match exhaustively instead of inspecting provider messages.

/// Result alias used throughout the auth crate.
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Transport, timeout, 5xx or misconfiguration talking to an identity provider.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The presented token was rejected by the provider.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    /// No user for this id, either at the provider or in the user store.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The user store could not answer (transport, malformed row, unknown role).
    #[error("User lookup failed: {0}")]
    LookupError(String),

    /// Identifier is neither a usable email nor a phone number.
    #[error("Invalid OTP target: {0}")]
    InvalidOtpTarget(String),

    /// Request is structurally wrong (bad code format, missing session info).
    #[error("Invalid OTP request: {0}")]
    InvalidOtpRequest(String),

    /// Provider refused the code or the send.
    #[error("OTP rejected: {0}")]
    OtpRejected(String),

    #[error("Too many OTP requests")]
    RateLimited,

    /// Endpoint requires a session and none was presented.
    #[error("No active session")]
    MissingSession,
}

impl AuthError {
    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::ProviderUnavailable(_) => "provider_unavailable",
            AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::MissingSession => {
                "unauthorized"
            },
            AuthError::UserNotFound(_) => "unauthorized",
            AuthError::LookupError(_) => "internal_error",
            AuthError::InvalidOtpTarget(_) | AuthError::InvalidOtpRequest(_) => "invalid_request",
            AuthError::OtpRejected(_) => "otp_rejected",
            AuthError::RateLimited => "rate_limited",
        }
    }
}
