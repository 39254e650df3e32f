//! Adapters around the external identity providers.
//!
//! - [`IdentityProvider`]: primary hosted auth (sessions, email/SMS OTP)
//! - [`PhoneOtpProvider`]: optional secondary provider for phone OTP only
//!
//! Both are traits so the gate and handlers can be exercised against fakes.

pub mod hosted;
pub mod identity;
pub mod phone_otp;
pub mod token;

pub use hosted::HostedAuthClient;
pub use identity::{IdentityProvider, ProviderSession, ProviderUser};
pub use phone_otp::{IdentityToolkitClient, PhoneOtpProvider, VerifiedPhone};
