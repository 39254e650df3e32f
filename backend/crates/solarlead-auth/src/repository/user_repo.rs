use crate::errors::AuthResult;
use solarlead_commons::{UserAccess, UserId};

/// Read access to the application's user records.
///
/// Role and active flag live in the application database, not in the
/// identity provider, so every gated decision needs one lookup.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch role and active flag.
    ///
    /// A missing row is `UserNotFound`; every other failure (unknown role,
    /// malformed row, unreachable store) is a `LookupError`.
    async fn get_user_access(&self, user_id: &UserId) -> AuthResult<UserAccess>;
}
