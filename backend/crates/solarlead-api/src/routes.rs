//! API routes configuration

use crate::handlers;
use crate::handlers::auth::models::AuthErrorResponse;
use actix_web::{error, web, HttpResponse};

/// Auth request bodies are a handful of short strings.
const MAX_JSON_BODY_BYTES: usize = 16 * 1024;

/// Configure the JSON API
///
/// - POST /api/auth/otp/send
/// - POST /api/auth/otp/verify
/// - POST /api/auth/logout
/// - GET /api/auth/me
/// - GET /api/healthz
/// - GET /api/readyz
///
/// Handlers expect `OtpService`, `AccessGate`, `UserRepository`,
/// `IdentityProvider`, `CookieConfig` and `OtpRateLimiter` as
/// `web::Data<Arc<_>>` app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(
                web::scope("/auth")
                    .route("/otp/send", web::post().to(handlers::send_otp_handler))
                    .route("/otp/verify", web::post().to(handlers::verify_otp_handler))
                    .route("/logout", web::post().to(handlers::logout_handler))
                    .route("/me", web::get().to(handlers::me_handler)),
            )
            .route("/healthz", web::get().to(handlers::healthz_handler))
            .route("/readyz", web::get().to(handlers::readyz_handler)),
    );
}

/// Malformed bodies get the same JSON error shape as every other auth failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, _req| {
            let message = err.to_string();
            error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(AuthErrorResponse::new("invalid_request", message)),
            )
            .into()
        })
}
