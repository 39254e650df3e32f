//! Server-wide middleware configuration helpers.
//!
//! ## Middleware stack (outermost first)
//!
//! 1. **CORS**: only when cross-origin callers are configured (via actix-cors)
//! 2. **Logger**: request/response logging
//! 3. **AccessGate**: session and role checks for the site's gated areas

use actix_cors::Cors;
use actix_web::http::{header::HeaderName, Method};
use actix_web::middleware;
use log::debug;
use solarlead_configs::CorsSettings;

/// Build CORS middleware from server configuration using actix-cors.
///
/// An empty origin list leaves CORS disabled; same-origin pages need no headers.
pub fn build_cors_from_config(cors_config: &CorsSettings) -> middleware::Condition<Cors> {
    let enabled = !cors_config.allowed_origins.is_empty();
    let mut cors = Cors::default();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
        debug!("CORS: Allowing any origin");
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: Allowed origins: {:?}", cors_config.allowed_origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    if cors_config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_any_header();
    } else {
        let headers: Vec<HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if !headers.is_empty() {
            cors = cors.allowed_headers(headers);
        }
    }

    // Session cookies only cross origins with credentials enabled
    if cors_config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors = cors.max_age(cors_config.max_age as usize);

    middleware::Condition::new(enabled, cors)
}

/// Build the request logger middleware.
///
/// Logs the path without the query string; `?redirect=` values stay out of
/// access logs.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::new(r#"%a "%{path}xi" %s %b %Dms"#).custom_request_replace("path", |req| {
        format!("{} {}", req.method(), req.path())
    })
}
