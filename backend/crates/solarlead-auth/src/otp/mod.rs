pub mod service;
pub mod target;

pub use service::{validate_code, OtpDispatch, OtpRoute, OtpService};
pub use target::{normalize_email, normalize_phone, OtpTarget};
