//! Logout handler
//!
//! POST /api/auth/logout - Ends the session

use actix_web::{web, HttpRequest, HttpResponse};
use solarlead_auth::{clear_session, CookieConfig, IdentityProvider, SessionCookies};
use solarlead_gate::apply_cookie_mutations;
use std::sync::Arc;

/// POST /api/auth/logout
///
/// Revokes the provider session when possible; the cookies are cleared even
/// if the provider cannot be reached.
pub async fn logout_handler(
    req: HttpRequest,
    identity: web::Data<Arc<dyn IdentityProvider>>,
    cookie_config: web::Data<Arc<CookieConfig>>,
) -> HttpResponse {
    let cookies = SessionCookies::from_request(&req);
    if let Some(access_token) = cookies.access_token.as_deref() {
        if let Err(e) = identity.sign_out(access_token).await {
            log::warn!("Provider sign-out failed: {}", e);
        }
    }

    let mut response = HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out successfully"
    }));
    apply_cookie_mutations(&mut response, &clear_session(), &cookie_config);
    response
}
