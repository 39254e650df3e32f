//! Resolve a request's session cookies into a [`SessionState`].
//!
//! The resolver never touches a response. Token refreshes and stale cookies
//! come back as a list of [`CookieMutation`]s for the HTTP layer to apply.

use crate::errors::{AuthError, AuthResult};
use crate::helpers::cookie::{clear_session, store_session, CookieMutation, SessionCookies};
use crate::providers::{token, IdentityProvider};
use chrono::{DateTime, Utc};
use solarlead_commons::UserId;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated {
        user_id: UserId,
        expires_at: Option<DateTime<Utc>>,
    },
}

impl SessionState {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResolution {
    pub state: SessionState,
    /// Changes the caller must apply to the outgoing response.
    pub cookies: Vec<CookieMutation>,
}

impl SessionResolution {
    fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            cookies: Vec::new(),
        }
    }

    /// Anonymous, and the stale cookies should go.
    fn cleared() -> Self {
        Self {
            state: SessionState::Anonymous,
            cookies: clear_session(),
        }
    }
}

#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the session carried by `cookies`.
    ///
    /// Missing, invalid or expired sessions resolve to `Anonymous`. The only
    /// error is [`AuthError::ProviderUnavailable`].
    pub async fn resolve(&self, cookies: &SessionCookies) -> AuthResult<SessionResolution> {
        if cookies.is_empty() {
            return Ok(SessionResolution::anonymous());
        }

        if let Some(access_token) = cookies.access_token.as_deref() {
            if !token::is_expired(access_token) {
                match self.provider.get_user(access_token).await {
                    Ok(user) => {
                        return Ok(SessionResolution {
                            state: SessionState::Authenticated {
                                user_id: user.id,
                                expires_at: token::peek_expiry(access_token),
                            },
                            cookies: Vec::new(),
                        })
                    },
                    Err(AuthError::InvalidToken(_)) | Err(AuthError::TokenExpired) => {},
                    Err(AuthError::UserNotFound(reason)) => {
                        log::debug!("Session user no longer exists: {}", reason);
                        return Ok(SessionResolution::cleared());
                    },
                    Err(e @ AuthError::ProviderUnavailable(_)) => return Err(e),
                    Err(e) => {
                        log::warn!("Unexpected introspection error, dropping session: {}", e);
                        return Ok(SessionResolution::cleared());
                    },
                }
            }
        }

        self.refresh(cookies.refresh_token.as_deref()).await
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<SessionResolution> {
        let Some(refresh_token) = refresh_token else {
            return Ok(SessionResolution::cleared());
        };

        match self.provider.refresh_session(refresh_token).await {
            Ok(session) => {
                log::debug!("Refreshed session for user {}", session.user.id);
                Ok(SessionResolution {
                    cookies: store_session(&session.access_token, &session.refresh_token),
                    state: SessionState::Authenticated {
                        user_id: session.user.id,
                        expires_at: session.expires_at,
                    },
                })
            },
            Err(e @ AuthError::ProviderUnavailable(_)) => Err(e),
            Err(e) => {
                log::debug!("Refresh rejected: {}", e);
                Ok(SessionResolution::cleared())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
    use crate::providers::token::tests::token_expiring_at;
    use crate::testing::FakeIdentityProvider;
    use chrono::Duration;

    fn cookies(access: Option<&str>, refresh: Option<&str>) -> SessionCookies {
        SessionCookies::new(access.map(String::from), refresh.map(String::from))
    }

    fn resolver(provider: &Arc<FakeIdentityProvider>) -> SessionResolver {
        SessionResolver::new(provider.clone())
    }

    #[tokio::test]
    async fn test_no_cookies_is_anonymous_without_provider_call() {
        let provider = Arc::new(FakeIdentityProvider::new());
        let resolution = resolver(&provider).resolve(&SessionCookies::default()).await.unwrap();

        assert_eq!(resolution, SessionResolution::anonymous());
        assert_eq!(provider.get_user_calls(), 0);
        assert_eq!(provider.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_access_token() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_session("access-1", "user-1");

        let resolution = resolver(&provider)
            .resolve(&cookies(Some("access-1"), Some("refresh-1")))
            .await
            .unwrap();

        assert_eq!(resolution.state.user_id().map(UserId::as_str), Some("user-1"));
        assert!(resolution.cookies.is_empty());
        assert_eq!(provider.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_access_token_refreshes() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_refresh("refresh-1", "access-2", "refresh-2", "user-1");

        let resolution = resolver(&provider)
            .resolve(&cookies(Some("stale"), Some("refresh-1")))
            .await
            .unwrap();

        assert!(resolution.state.is_authenticated());
        assert_eq!(
            resolution.cookies,
            vec![
                CookieMutation::Set {
                    name: ACCESS_COOKIE_NAME,
                    value: "access-2".to_string()
                },
                CookieMutation::Set {
                    name: REFRESH_COOKIE_NAME,
                    value: "refresh-2".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_locally_expired_token_skips_introspection() {
        let provider = Arc::new(FakeIdentityProvider::new());
        let expired = token_expiring_at(Utc::now() - Duration::hours(2));
        provider.add_session(&expired, "user-1");
        provider.add_refresh("refresh-1", "access-2", "refresh-2", "user-1");

        let resolution = resolver(&provider)
            .resolve(&cookies(Some(&expired), Some("refresh-1")))
            .await
            .unwrap();

        assert!(resolution.state.is_authenticated());
        assert_eq!(provider.get_user_calls(), 0);
        assert_eq!(provider.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_clears() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_session("access-1", "user-1");
        provider.expire("access-1");

        let resolution = resolver(&provider)
            .resolve(&cookies(Some("access-1"), None))
            .await
            .unwrap();

        assert_eq!(resolution.state, SessionState::Anonymous);
        assert_eq!(resolution.cookies, clear_session());
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears() {
        let provider = Arc::new(FakeIdentityProvider::new());

        let resolution = resolver(&provider)
            .resolve(&cookies(None, Some("revoked")))
            .await
            .unwrap();

        assert_eq!(resolution.state, SessionState::Anonymous);
        assert_eq!(resolution.cookies, clear_session());
    }

    #[tokio::test]
    async fn test_deleted_user_clears() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_session("access-1", "user-1");
        provider.delete_user("access-1");

        let resolution = resolver(&provider)
            .resolve(&cookies(Some("access-1"), Some("refresh-1")))
            .await
            .unwrap();

        assert_eq!(resolution.state, SessionState::Anonymous);
        assert_eq!(resolution.cookies, clear_session());
        assert_eq!(provider.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_outage_is_an_error() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_session("access-1", "user-1");
        provider.set_unavailable(true);

        let err = resolver(&provider)
            .resolve(&cookies(Some("access-1"), Some("refresh-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));

        let err = resolver(&provider)
            .resolve(&cookies(None, Some("refresh-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }
}
