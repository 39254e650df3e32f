//! OTP login endpoints
//!
//! Session tokens live in the two HttpOnly cookies managed by
//! `solarlead_auth::helpers::cookie`; no endpoint returns them in a body.
//!
//! ## Endpoints
//! - POST /api/auth/otp/send - Send a one-time password to an email or phone
//! - POST /api/auth/otp/verify - Check the code and start a session
//! - POST /api/auth/logout - End the session
//! - GET /api/auth/me - Current user and role

pub mod models;

mod logout;
mod me;
mod send_otp;
mod verify_otp;

pub use logout::logout_handler;
pub use me::me_handler;
pub use send_otp::send_otp_handler;
pub use verify_otp::{post_login_redirect, verify_otp_handler};

use actix_web::http::header;
use actix_web::HttpResponse;
use models::AuthErrorResponse;
use solarlead_auth::AuthError;
use std::time::Duration;

/// Map authentication errors to HTTP responses
///
/// Messages are generic: a response never tells whether an identifier or
/// user exists.
pub(crate) fn map_auth_error_to_response(err: AuthError) -> HttpResponse {
    match err {
        AuthError::ProviderUnavailable(_) => HttpResponse::ServiceUnavailable().json(
            AuthErrorResponse::new(err.code(), "Sign-in is temporarily unavailable, please retry"),
        ),
        AuthError::InvalidToken(_)
        | AuthError::TokenExpired
        | AuthError::UserNotFound(_)
        | AuthError::MissingSession => {
            HttpResponse::Unauthorized().json(AuthErrorResponse::new(err.code(), "Authentication required"))
        },
        AuthError::LookupError(_) => HttpResponse::InternalServerError()
            .json(AuthErrorResponse::new(err.code(), "Authentication failed")),
        AuthError::InvalidOtpTarget(_) => HttpResponse::BadRequest().json(AuthErrorResponse::new(
            err.code(),
            "Enter a valid email address or mobile number",
        )),
        AuthError::InvalidOtpRequest(ref message) => {
            HttpResponse::BadRequest().json(AuthErrorResponse::new(err.code(), message.clone()))
        },
        AuthError::OtpRejected(_) => HttpResponse::BadRequest()
            .json(AuthErrorResponse::new(err.code(), "The code is invalid or has expired")),
        AuthError::RateLimited => rate_limited_response(None),
    }
}

/// 429 with an optional `Retry-After` in whole seconds.
pub(crate) fn rate_limited_response(retry_after: Option<Duration>) -> HttpResponse {
    let mut builder = HttpResponse::TooManyRequests();
    if let Some(wait) = retry_after {
        let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
        builder.insert_header((header::RETRY_AFTER, secs.max(1).to_string()));
    }
    builder.json(AuthErrorResponse::new(
        "rate_limited",
        "Too many code requests, please wait before trying again",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AuthError::ProviderUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::InvalidToken("bad".into()), StatusCode::UNAUTHORIZED),
            (AuthError::TokenExpired, StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound("u".into()), StatusCode::UNAUTHORIZED),
            (AuthError::MissingSession, StatusCode::UNAUTHORIZED),
            (AuthError::LookupError("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::InvalidOtpTarget("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidOtpRequest("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::OtpRejected("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
        ];

        for (err, status) in cases {
            assert_eq!(map_auth_error_to_response(err.clone()).status(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let resp = rate_limited_response(Some(Duration::from_millis(2500)));
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "3");

        let resp = rate_limited_response(Some(Duration::ZERO));
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "1");

        let resp = rate_limited_response(None);
        assert!(resp.headers().get(header::RETRY_AFTER).is_none());
    }
}
