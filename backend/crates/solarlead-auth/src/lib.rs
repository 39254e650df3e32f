// Solarlead Authentication Library
// Identity provider adapters, session resolution, role lookup and OTP login

pub mod errors;
pub mod helpers;
pub mod otp;
pub mod providers;
pub mod repository;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use errors::{AuthError, AuthResult};
pub use helpers::cookie::{
    clear_session, store_session, CookieConfig, CookieMutation, SessionCookies, ACCESS_COOKIE_NAME,
    REFRESH_COOKIE_NAME,
};
pub use helpers::ip_extractor::extract_client_ip;
pub use otp::{OtpDispatch, OtpRoute, OtpService, OtpTarget};
pub use providers::{
    HostedAuthClient, IdentityProvider, IdentityToolkitClient, PhoneOtpProvider, ProviderSession,
    ProviderUser,
};
pub use repository::{RestUserRepository, UserRepository};
pub use session::{SessionResolution, SessionResolver, SessionState};
