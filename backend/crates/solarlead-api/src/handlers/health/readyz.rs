//! Readiness probe handler

use actix_web::{web, HttpResponse, Responder};
use solarlead_gate::AccessGate;
use std::sync::Arc;

use super::models::HealthResponse;

/// GET /api/readyz
///
/// Ready once configuration is loaded and the gate is registered. Identity
/// providers are not probed, so a provider outage never takes the site out of
/// the load balancer.
pub async fn readyz_handler(gate: Option<web::Data<Arc<AccessGate>>>) -> impl Responder {
    let response = HealthResponse::readiness(gate.is_some());

    if gate.is_some() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
