//! OTP verify handler
//!
//! POST /api/auth/otp/verify - Checks the code and starts a session

use actix_web::{web, HttpRequest, HttpResponse};
use solarlead_auth::{extract_client_ip, store_session, CookieConfig, OtpService, UserRepository};
use solarlead_commons::UserAccess;
use solarlead_gate::{apply_cookie_mutations, canonicalize_path, AccessGate, RouteClass, RouteTable};
use std::sync::Arc;

use super::models::{VerifyOtpRequest, VerifyOtpResponse};
use super::{map_auth_error_to_response, rate_limited_response};
use crate::limiter::{OtpRateLimiter, RateLimitDecision};

/// POST /api/auth/otp/verify
///
/// On success both session cookies are set and the body names the page the
/// browser should open next. Every attempt, right or wrong, spends one guess
/// from the client's and the target's verify budget.
pub async fn verify_otp_handler(
    req: HttpRequest,
    otp: web::Data<Arc<OtpService>>,
    rate_limiter: web::Data<Arc<OtpRateLimiter>>,
    gate: web::Data<Arc<AccessGate>>,
    user_repo: web::Data<Arc<dyn UserRepository>>,
    cookie_config: web::Data<Arc<CookieConfig>>,
    body: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    let target = match otp.parse_target(&body.identifier) {
        Ok(target) => target,
        Err(err) => return map_auth_error_to_response(err),
    };

    let connection_info = extract_client_ip(&req);
    if let RateLimitDecision::Limited { retry_after } = rate_limiter.check_verify(&connection_info, &target) {
        log::warn!(
            "OTP verify for {} from {} rate limited",
            target.masked(),
            connection_info.client_key()
        );
        return rate_limited_response(Some(retry_after));
    }

    let session = match otp.verify(&target, &body.code, body.session_info.as_deref()).await {
        Ok(session) => session,
        Err(err) => return map_auth_error_to_response(err),
    };

    // Only picks the landing page; the gate looks the role up again anyway.
    let access = match user_repo.get_user_access(&session.user.id).await {
        Ok(access) => Some(access),
        Err(e) => {
            log::warn!("Role lookup after login for {} failed: {}", session.user.id, e);
            None
        },
    };

    let redirect = post_login_redirect(gate.routes(), body.redirect.as_deref(), access);
    let mut response = HttpResponse::Ok().json(VerifyOtpResponse {
        user_id: session.user.id.to_string(),
        redirect,
    });
    apply_cookie_mutations(
        &mut response,
        &store_session(&session.access_token, &session.refresh_token),
        &cookie_config,
    );
    response
}

/// Landing page after a successful login.
///
/// Admins always land on the admin home. Everyone else returns to the page
/// they asked for when it is a safe local path, else to the user home.
pub fn post_login_redirect(routes: &RouteTable, requested: Option<&str>, access: Option<UserAccess>) -> String {
    if access.is_some_and(|a| a.role.is_admin()) {
        return routes.admin_home().to_string();
    }

    match requested {
        Some(path) if is_safe_return_path(routes, path) => path.to_string(),
        _ => routes.user_home().to_string(),
    }
}

fn is_safe_return_path(routes: &RouteTable, path: &str) -> bool {
    if !path.starts_with('/')
        || path.starts_with("//")
        || path.contains('\\')
        || path.chars().any(|c| c.is_control())
    {
        return false;
    }

    let without_query = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let canonical = canonicalize_path(without_query);
    let login = canonicalize_path(routes.login_path());
    if canonical == login || canonical.starts_with(&format!("{}/", login)) {
        return false;
    }

    // Non-admins would only bounce back to login from there.
    routes.classify(&canonical) != RouteClass::AdminArea
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarlead_commons::Role;
    use solarlead_configs::RouteSettings;

    fn routes() -> RouteTable {
        RouteTable::from_settings(&RouteSettings::default()).unwrap()
    }

    fn user() -> Option<UserAccess> {
        Some(UserAccess::new(Role::User, true))
    }

    #[test]
    fn test_admins_always_land_on_admin_home() {
        let routes = routes();
        for role in [Role::Admin, Role::SuperAdmin] {
            let access = Some(UserAccess::new(role, true));
            assert_eq!(post_login_redirect(&routes, Some("/dashboard/leads"), access), "/admin");
            assert_eq!(post_login_redirect(&routes, None, access), "/admin");
        }
    }

    #[test]
    fn test_users_return_to_requested_page() {
        let routes = routes();
        assert_eq!(
            post_login_redirect(&routes, Some("/dashboard/leads?page=2"), user()),
            "/dashboard/leads?page=2"
        );
        assert_eq!(post_login_redirect(&routes, Some("/blog/net-metering"), None), "/blog/net-metering");
        assert_eq!(post_login_redirect(&routes, None, user()), "/dashboard");
    }

    #[test]
    fn test_unsafe_requests_fall_back_to_user_home() {
        let routes = routes();
        for requested in [
            "https://evil.example",
            "//evil.example/path",
            "/\\evil.example",
            "dashboard",
            "",
            "/auth/login",
            "/auth/login/",
            "/auth/login?redirect=/dashboard",
            "/auth/./login",
            "/admin/leads",
            "/%61dmin",
            "/dashboard\r\nSet-Cookie: x=y",
        ] {
            assert_eq!(post_login_redirect(&routes, Some(requested), user()), "/dashboard", "{}", requested);
        }
    }

    #[test]
    fn test_pages_next_to_login_are_allowed() {
        let routes = routes();
        assert_eq!(post_login_redirect(&routes, Some("/auth/loginhelp"), user()), "/auth/loginhelp");
    }
}
