//! In-memory stand-ins for the identity providers and the user store.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature, for
//! downstream crates' tests.

use crate::errors::{AuthError, AuthResult};
use crate::otp::OtpTarget;
use crate::providers::{IdentityProvider, PhoneOtpProvider, ProviderSession, ProviderUser, VerifiedPhone};
use crate::repository::UserRepository;
use chrono::{Duration, Utc};
use solarlead_commons::{Role, UserAccess, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

fn user(user_id: &str) -> ProviderUser {
    ProviderUser {
        id: UserId::from(user_id),
        email: None,
        phone: None,
    }
}

fn unavailable() -> AuthError {
    AuthError::ProviderUnavailable("fake provider is down".to_string())
}

/// Scripted primary provider.
///
/// Unknown access or refresh tokens are rejected as invalid. Sessions minted
/// by OTP verification or ID-token exchange are registered, so they resolve
/// on later requests.
#[derive(Default)]
pub struct FakeIdentityProvider {
    sessions: Mutex<HashMap<String, ProviderUser>>,
    refresh_tokens: Mutex<HashMap<String, ProviderSession>>,
    expired: Mutex<HashSet<String>>,
    deleted: Mutex<HashSet<String>>,
    otps: Mutex<HashMap<String, (String, ProviderUser)>>,
    id_tokens: Mutex<HashMap<String, ProviderUser>>,
    sent: Mutex<Vec<String>>,
    signed_out: Mutex<Vec<String>>,
    unavailable: AtomicBool,
    get_user_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    minted: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live access token for `user_id`.
    pub fn add_session(&self, access_token: &str, user_id: &str) {
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .insert(access_token.to_string(), user(user_id));
    }

    /// Register a refresh token that yields a new token pair.
    pub fn add_refresh(&self, refresh_token: &str, new_access: &str, new_refresh: &str, user_id: &str) {
        let session = ProviderSession {
            access_token: new_access.to_string(),
            refresh_token: new_refresh.to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user: user(user_id),
        };
        self.refresh_tokens
            .lock()
            .expect("fake state poisoned")
            .insert(refresh_token.to_string(), session);
    }

    /// Introspection of this token reports `TokenExpired`.
    pub fn expire(&self, access_token: &str) {
        self.expired
            .lock()
            .expect("fake state poisoned")
            .insert(access_token.to_string());
    }

    /// Introspection of this token reports `UserNotFound`.
    pub fn delete_user(&self, access_token: &str) {
        self.deleted
            .lock()
            .expect("fake state poisoned")
            .insert(access_token.to_string());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Accept `code` for a normalized target and sign in `user_id`.
    pub fn set_otp(&self, target: &str, code: &str, user_id: &str) {
        self.otps
            .lock()
            .expect("fake state poisoned")
            .insert(target.to_string(), (code.to_string(), user(user_id)));
    }

    /// Accept an ID token from the secondary provider for `user_id`.
    pub fn set_id_token(&self, id_token: &str, user_id: &str) {
        self.id_tokens
            .lock()
            .expect("fake state poisoned")
            .insert(id_token.to_string(), user(user_id));
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Targets an OTP was sent to, in order.
    pub fn sent_otps(&self) -> Vec<String> {
        self.sent.lock().expect("fake state poisoned").clone()
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().expect("fake state poisoned").clone()
    }

    fn check_available(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    fn mint_session(&self, user: ProviderUser) -> ProviderSession {
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        let session = ProviderSession {
            access_token: format!("access-{}-{}", user.id, n),
            refresh_token: format!("refresh-{}-{}", user.id, n),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user,
        };
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .insert(session.access_token.clone(), session.user.clone());
        session
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn get_user(&self, access_token: &str) -> AuthResult<ProviderUser> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        if self.expired.lock().expect("fake state poisoned").contains(access_token) {
            return Err(AuthError::TokenExpired);
        }
        if self.deleted.lock().expect("fake state poisoned").contains(access_token) {
            return Err(AuthError::UserNotFound("user deleted".to_string()));
        }
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown access token".to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> AuthResult<ProviderSession> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let session = self
            .refresh_tokens
            .lock()
            .expect("fake state poisoned")
            .get(refresh_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("refresh rejected".to_string()))?;
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .insert(session.access_token.clone(), session.user.clone());
        Ok(session)
    }

    async fn send_otp(&self, target: &OtpTarget) -> AuthResult<()> {
        self.check_available()?;
        self.sent
            .lock()
            .expect("fake state poisoned")
            .push(target.as_str().to_string());
        Ok(())
    }

    async fn verify_otp(&self, target: &OtpTarget, code: &str) -> AuthResult<ProviderSession> {
        self.check_available()?;
        let expected = self
            .otps
            .lock()
            .expect("fake state poisoned")
            .get(target.as_str())
            .cloned();

        match expected {
            Some((expected_code, user)) if expected_code == code => Ok(self.mint_session(user)),
            _ => Err(AuthError::OtpRejected("Token has expired or is invalid".to_string())),
        }
    }

    async fn exchange_id_token(&self, _provider: &str, id_token: &str) -> AuthResult<ProviderSession> {
        self.check_available()?;
        let user = self
            .id_tokens
            .lock()
            .expect("fake state poisoned")
            .get(id_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown id token".to_string()))?;
        Ok(self.mint_session(user))
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        self.check_available()?;
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .remove(access_token);
        self.signed_out
            .lock()
            .expect("fake state poisoned")
            .push(access_token.to_string());
        Ok(())
    }
}

/// Scripted secondary phone OTP provider.
#[derive(Default)]
pub struct FakePhoneOtpProvider {
    codes: Mutex<HashMap<String, (String, String)>>,
    sessions: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    send_calls: AtomicUsize,
}

impl FakePhoneOtpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `code` for `phone`; a successful check yields `id_token`.
    pub fn set_code(&self, phone: &str, code: &str, id_token: &str) {
        self.codes
            .lock()
            .expect("fake state poisoned")
            .insert(phone.to_string(), (code.to_string(), id_token.to_string()));
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PhoneOtpProvider for FakePhoneOtpProvider {
    async fn send_code(&self, phone: &str, _verification_token: Option<&str>) -> AuthResult<String> {
        let n = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let session_info = format!("session-{}", n);
        self.sessions
            .lock()
            .expect("fake state poisoned")
            .insert(session_info.clone(), phone.to_string());
        Ok(session_info)
    }

    async fn verify_code(&self, session_info: &str, code: &str) -> AuthResult<VerifiedPhone> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let phone = self
            .sessions
            .lock()
            .expect("fake state poisoned")
            .get(session_info)
            .cloned()
            .ok_or_else(|| AuthError::OtpRejected("INVALID_SESSION_INFO".to_string()))?;

        match self.codes.lock().expect("fake state poisoned").get(&phone) {
            Some((expected, id_token)) if expected == code => Ok(VerifiedPhone {
                id_token: id_token.clone(),
                provider_uid: format!("uid{}", phone.trim_start_matches('+')),
                phone,
            }),
            _ => Err(AuthError::OtpRejected("INVALID_CODE".to_string())),
        }
    }
}

/// User store backed by a map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, UserAccess>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: &str, role: Role, is_active: bool) {
        self.users
            .lock()
            .expect("fake state poisoned")
            .insert(UserId::from(user_id), UserAccess::new(role, is_active));
    }

    /// Every lookup fails with `LookupError` while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user_access(&self, user_id: &UserId) -> AuthResult<UserAccess> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::LookupError("user store unreachable".to_string()));
        }

        self.users
            .lock()
            .expect("fake state poisoned")
            .get(user_id)
            .copied()
            .ok_or_else(|| AuthError::UserNotFound(format!("no user record for {}", user_id)))
    }
}
