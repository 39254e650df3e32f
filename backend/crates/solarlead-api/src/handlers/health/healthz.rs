//! Liveness probe handler

use actix_web::{HttpResponse, Responder};

use super::models::HealthResponse;

/// GET /api/healthz
///
/// Returns 200 OK whenever the process is serving requests.
pub async fn healthz_handler() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok_with_version(env!("CARGO_PKG_VERSION")))
}
