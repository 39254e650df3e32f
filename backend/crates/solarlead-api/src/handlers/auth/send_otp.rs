//! OTP send handler
//!
//! POST /api/auth/otp/send - Sends a one-time password to an email or phone

use actix_web::{web, HttpRequest, HttpResponse};
use solarlead_auth::{extract_client_ip, OtpService};
use std::sync::Arc;

use super::models::{SendOtpRequest, SendOtpResponse};
use super::{map_auth_error_to_response, rate_limited_response};
use crate::limiter::{OtpRateLimiter, RateLimitDecision};

/// POST /api/auth/otp/send
///
/// Sends are throttled per client IP and per normalized target, so a number
/// typed with or without spaces shares one budget.
pub async fn send_otp_handler(
    req: HttpRequest,
    otp: web::Data<Arc<OtpService>>,
    rate_limiter: web::Data<Arc<OtpRateLimiter>>,
    body: web::Json<SendOtpRequest>,
) -> HttpResponse {
    let target = match otp.parse_target(&body.identifier) {
        Ok(target) => target,
        Err(err) => return map_auth_error_to_response(err),
    };

    let connection_info = extract_client_ip(&req);
    if let RateLimitDecision::Limited { retry_after } = rate_limiter.check_send(&connection_info, &target) {
        log::warn!(
            "OTP send to {} from {} rate limited",
            target.masked(),
            connection_info.client_key()
        );
        return rate_limited_response(Some(retry_after));
    }

    match otp.send_to(target, body.verification_token.as_deref()).await {
        Ok(dispatch) => HttpResponse::Ok().json(SendOtpResponse::from(dispatch)),
        Err(err) => map_auth_error_to_response(err),
    }
}
