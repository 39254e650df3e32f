use super::target::OtpTarget;
use crate::errors::{AuthError, AuthResult};
use crate::providers::{IdentityProvider, PhoneOtpProvider, ProviderSession};
use std::fmt;
use std::sync::Arc;

/// Which provider and channel carries a given OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRoute {
    PrimaryEmail,
    PrimarySms,
    SecondarySms,
}

impl OtpRoute {
    pub fn channel(&self) -> &'static str {
        match self {
            OtpRoute::PrimaryEmail => "email",
            OtpRoute::PrimarySms | OtpRoute::SecondarySms => "sms",
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            OtpRoute::PrimaryEmail | OtpRoute::PrimarySms => "primary",
            OtpRoute::SecondarySms => "secondary",
        }
    }
}

impl fmt::Display for OtpRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider(), self.channel())
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpDispatch {
    pub target: OtpTarget,
    pub route: OtpRoute,
    /// Opaque handle from the secondary provider; the client sends it back
    /// with the code.
    pub session_info: Option<String>,
}

struct SecondaryPhone {
    provider: Arc<dyn PhoneOtpProvider>,
    id_token_provider: String,
}

/// One-time password login.
///
/// Email always goes to the primary provider. Phone goes to the secondary
/// provider when one is configured, otherwise to the primary provider's SMS
/// channel. Every successful verification returns a primary-provider session.
pub struct OtpService {
    primary: Arc<dyn IdentityProvider>,
    secondary: Option<SecondaryPhone>,
    default_country_code: String,
}

impl OtpService {
    pub fn new(primary: Arc<dyn IdentityProvider>, default_country_code: impl Into<String>) -> Self {
        Self {
            primary,
            secondary: None,
            default_country_code: default_country_code.into(),
        }
    }

    pub fn with_phone_provider(
        mut self,
        provider: Arc<dyn PhoneOtpProvider>,
        id_token_provider: impl Into<String>,
    ) -> Self {
        self.secondary = Some(SecondaryPhone {
            provider,
            id_token_provider: id_token_provider.into(),
        });
        self
    }

    pub fn parse_target(&self, identifier: &str) -> AuthResult<OtpTarget> {
        OtpTarget::parse(identifier, &self.default_country_code)
    }

    pub fn route_for(&self, target: &OtpTarget) -> OtpRoute {
        match target {
            OtpTarget::Email(_) => OtpRoute::PrimaryEmail,
            OtpTarget::Phone(_) if self.secondary.is_some() => OtpRoute::SecondarySms,
            OtpTarget::Phone(_) => OtpRoute::PrimarySms,
        }
    }

    /// Send a code to an already normalized target.
    pub async fn send_to(
        &self,
        target: OtpTarget,
        verification_token: Option<&str>,
    ) -> AuthResult<OtpDispatch> {
        let route = self.route_for(&target);
        let session_info = match (&self.secondary, route) {
            (Some(secondary), OtpRoute::SecondarySms) => Some(
                secondary
                    .provider
                    .send_code(target.as_str(), verification_token)
                    .await?,
            ),
            _ => {
                self.primary.send_otp(&target).await?;
                None
            },
        };

        log::info!("OTP sent to {} via {}", target.masked(), route);
        Ok(OtpDispatch {
            target,
            route,
            session_info,
        })
    }

    pub async fn send(&self, identifier: &str, verification_token: Option<&str>) -> AuthResult<OtpDispatch> {
        let target = self.parse_target(identifier)?;
        self.send_to(target, verification_token).await
    }

    /// Check a code and return a primary-provider session.
    pub async fn verify(
        &self,
        target: &OtpTarget,
        code: &str,
        session_info: Option<&str>,
    ) -> AuthResult<ProviderSession> {
        let code = validate_code(code)?;

        let session = match (&self.secondary, self.route_for(target)) {
            (Some(secondary), OtpRoute::SecondarySms) => {
                let session_info = session_info.filter(|s| !s.is_empty()).ok_or_else(|| {
                    AuthError::InvalidOtpRequest("session_info is required for phone codes".to_string())
                })?;

                let verified = secondary.provider.verify_code(session_info, code).await?;
                if !verified.phone.is_empty() && verified.phone != target.as_str() {
                    log::warn!(
                        "Phone OTP session belongs to {}, not {}",
                        OtpTarget::Phone(verified.phone.clone()).masked(),
                        target.masked()
                    );
                    return Err(AuthError::OtpRejected("code was issued for another number".to_string()));
                }

                self.primary
                    .exchange_id_token(&secondary.id_token_provider, &verified.id_token)
                    .await?
            },
            _ => self.primary.verify_otp(target, code).await?,
        };

        log::info!("OTP verified for {} (user {})", target.masked(), session.user.id);
        Ok(session)
    }
}

/// Codes are 4 to 8 ASCII digits.
pub fn validate_code(code: &str) -> AuthResult<&str> {
    let code = code.trim();
    if (4..=8).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(AuthError::InvalidOtpRequest("code must be 4 to 8 digits".to_string()))
    }
}
