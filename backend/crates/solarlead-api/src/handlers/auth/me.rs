//! Current user handler
//!
//! GET /api/auth/me - Returns the signed-in user and their role

use actix_web::{web, HttpRequest, HttpResponse};
use solarlead_auth::{CookieConfig, SessionCookies};
use solarlead_gate::{apply_cookie_mutations, AccessGate, AccessVerdict};
use std::sync::Arc;

use super::models::{AuthErrorResponse, MeResponse};

/// GET /api/auth/me
///
/// 401 without a live session. A refreshed token pair is written back either way.
pub async fn me_handler(
    req: HttpRequest,
    gate: web::Data<Arc<AccessGate>>,
    cookie_config: web::Data<Arc<CookieConfig>>,
) -> HttpResponse {
    let cookies = SessionCookies::from_request(&req);
    let outcome = gate.authorize_api(&cookies).await;

    let mut response = match (&outcome.verdict, outcome.principal) {
        (AccessVerdict::Allow, Some(principal)) => {
            HttpResponse::Ok().json(MeResponse::new(principal.user_id.as_str(), principal.access))
        },
        _ => HttpResponse::Unauthorized()
            .json(AuthErrorResponse::new("unauthorized", "Authentication required")),
    };
    apply_cookie_mutations(&mut response, &outcome.cookies, &cookie_config);
    response
}
