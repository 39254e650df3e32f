//! Request and response bodies for the auth endpoints.

mod error_response;
mod me_response;
mod otp_request;
mod otp_response;

pub use error_response::AuthErrorResponse;
pub use me_response::MeResponse;
pub use otp_request::{SendOtpRequest, VerifyOtpRequest};
pub use otp_response::{SendOtpResponse, VerifyOtpResponse};
