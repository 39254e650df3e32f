//! Access gate behavior against in-memory providers.

use solarlead_auth::testing::{FakeIdentityProvider, InMemoryUserRepository};
use solarlead_auth::{clear_session, CookieMutation, SessionCookies, SessionResolver, ACCESS_COOKIE_NAME};
use solarlead_commons::Role;
use solarlead_configs::RouteSettings;
use solarlead_gate::{AccessGate, AccessVerdict, RouteClass, RouteTable};
use std::sync::Arc;

struct Fixture {
    provider: Arc<FakeIdentityProvider>,
    users: Arc<InMemoryUserRepository>,
    gate: AccessGate,
}

fn fixture() -> Fixture {
    let provider = Arc::new(FakeIdentityProvider::new());
    let users = Arc::new(InMemoryUserRepository::new());

    provider.add_session("partner-token", "partner");
    provider.add_session("admin-token", "admin");
    provider.add_session("super-token", "super");
    provider.add_session("inactive-admin-token", "inactive-admin");
    provider.add_session("ghost-token", "ghost");
    users.insert("partner", Role::User, true);
    users.insert("admin", Role::Admin, true);
    users.insert("super", Role::SuperAdmin, true);
    users.insert("inactive-admin", Role::Admin, false);

    let routes = RouteTable::from_settings(&RouteSettings::default()).unwrap();
    let gate = AccessGate::new(routes, SessionResolver::new(provider.clone()), users.clone());

    Fixture {
        provider,
        users,
        gate,
    }
}

fn anonymous() -> SessionCookies {
    SessionCookies::default()
}

fn session(access: &str) -> SessionCookies {
    SessionCookies::new(Some(access.to_string()), None)
}

fn login_without_return() -> AccessVerdict {
    AccessVerdict::RedirectToLogin { return_to: None }
}

#[tokio::test]
async fn test_public_paths_allow_any_session() {
    let f = fixture();
    for path in ["/", "/about", "/services/ongrid", "/blog/2024/pm-surya-ghar", "/auth/login", "/faq"] {
        for cookies in [anonymous(), session("partner-token"), session("bogus")] {
            let outcome = f.gate.evaluate(path, &cookies).await;
            assert_eq!(outcome.route_class, RouteClass::Public, "{}", path);
            assert_eq!(outcome.verdict, AccessVerdict::Allow, "{}", path);
        }
    }
}

#[tokio::test]
async fn test_file_extension_is_static_even_in_gated_areas() {
    let f = fixture();
    for path in ["/logo.png", "/dashboard/chart.js", "/admin/styles.css", "/robots.txt"] {
        let outcome = f.gate.evaluate(path, &anonymous()).await;
        assert_eq!(outcome.route_class, RouteClass::StaticAsset, "{}", path);
        assert_eq!(outcome.verdict, AccessVerdict::Allow, "{}", path);
    }
}

#[tokio::test]
async fn test_static_assets_never_touch_providers() {
    let f = fixture();
    f.gate.evaluate("/_assets/app.js", &session("partner-token")).await;
    f.gate.evaluate("/api/auth/me", &session("partner-token")).await;

    assert_eq!(f.provider.get_user_calls(), 0);
    assert_eq!(f.users.lookup_calls(), 0);
}

#[tokio::test]
async fn test_anonymous_dashboard_redirects_with_exact_path() {
    let f = fixture();
    let outcome = f.gate.evaluate("/dashboard/leads/17", &anonymous()).await;

    assert_eq!(outcome.route_class, RouteClass::UserArea);
    assert_eq!(
        outcome.verdict,
        AccessVerdict::RedirectToLogin {
            return_to: Some("/dashboard/leads/17".to_string())
        }
    );
    assert_eq!(
        outcome.verdict.location("/auth/login").as_deref(),
        Some("/auth/login?redirect=%2Fdashboard%2Fleads%2F17")
    );
}

#[tokio::test]
async fn test_anonymous_admin_redirects_without_return_path() {
    let f = fixture();
    let outcome = f.gate.evaluate("/admin/withdrawals", &anonymous()).await;

    assert_eq!(outcome.route_class, RouteClass::AdminArea);
    assert_eq!(outcome.verdict, login_without_return());
    assert_eq!(outcome.verdict.location("/auth/login").as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn test_admins_never_see_the_user_dashboard() {
    let f = fixture();
    for token in ["admin-token", "super-token"] {
        let outcome = f.gate.evaluate("/dashboard", &session(token)).await;
        assert_eq!(outcome.verdict, AccessVerdict::RedirectTo("/admin".to_string()));
        assert_eq!(outcome.principal, None);
    }
}

#[tokio::test]
async fn test_partner_reaches_dashboard_with_principal() {
    let f = fixture();
    let outcome = f.gate.evaluate("/dashboard/rewards", &session("partner-token")).await;

    assert_eq!(outcome.verdict, AccessVerdict::Allow);
    let principal = outcome.principal.unwrap();
    assert_eq!(principal.user_id.as_str(), "partner");
    assert_eq!(principal.access.map(|a| a.role), Some(Role::User));
}

#[tokio::test]
async fn test_partner_is_sent_to_login_from_admin() {
    let f = fixture();
    let outcome = f.gate.evaluate("/admin/anything", &session("partner-token")).await;
    assert_eq!(outcome.verdict, login_without_return());
}

#[tokio::test]
async fn test_active_admins_enter_admin_area() {
    let f = fixture();
    for token in ["admin-token", "super-token"] {
        let outcome = f.gate.evaluate("/admin/leads", &session(token)).await;
        assert_eq!(outcome.verdict, AccessVerdict::Allow);
    }
}

#[tokio::test]
async fn test_inactive_admin_is_turned_away() {
    let f = fixture();
    let outcome = f.gate.evaluate("/admin", &session("inactive-admin-token")).await;
    assert_eq!(outcome.verdict, login_without_return());
}

#[tokio::test]
async fn test_lookup_failure_denies_admin_but_allows_dashboard() {
    let f = fixture();
    f.users.set_failing(true);

    let admin = f.gate.evaluate("/admin", &session("admin-token")).await;
    assert_eq!(admin.verdict, login_without_return());

    let dashboard = f.gate.evaluate("/dashboard", &session("admin-token")).await;
    assert_eq!(dashboard.verdict, AccessVerdict::Allow);
    assert_eq!(dashboard.principal.and_then(|p| p.access), None);
}

#[tokio::test]
async fn test_missing_user_record() {
    let f = fixture();

    let admin = f.gate.evaluate("/admin", &session("ghost-token")).await;
    assert_eq!(admin.verdict, login_without_return());

    let dashboard = f.gate.evaluate("/dashboard", &session("ghost-token")).await;
    assert_eq!(dashboard.verdict, AccessVerdict::Allow);
}

#[tokio::test]
async fn test_provider_outage_never_allows_gated_routes() {
    let f = fixture();
    f.provider.set_unavailable(true);

    let dashboard = f.gate.evaluate("/dashboard", &session("partner-token")).await;
    assert_eq!(
        dashboard.verdict,
        AccessVerdict::RedirectToLogin {
            return_to: Some("/dashboard".to_string())
        }
    );

    let admin = f.gate.evaluate("/admin", &session("admin-token")).await;
    assert_eq!(admin.verdict, login_without_return());

    let public = f.gate.evaluate("/gallery", &session("partner-token")).await;
    assert_eq!(public.verdict, AccessVerdict::Allow);
    assert!(public.cookies.is_empty());
    assert_eq!(f.users.lookup_calls(), 0);
}

#[tokio::test]
async fn test_role_is_looked_up_on_every_request() {
    let f = fixture();
    f.gate.evaluate("/admin", &session("admin-token")).await;
    f.gate.evaluate("/admin", &session("admin-token")).await;
    assert_eq!(f.users.lookup_calls(), 2);

    // Demotion takes effect on the very next request.
    f.users.insert("admin", Role::User, true);
    let outcome = f.gate.evaluate("/admin", &session("admin-token")).await;
    assert_eq!(outcome.verdict, login_without_return());
}

#[tokio::test]
async fn test_same_request_twice_yields_same_verdict() {
    let f = fixture();
    let cases = [
        ("/", anonymous()),
        ("/dashboard", anonymous()),
        ("/dashboard", session("partner-token")),
        ("/dashboard", session("admin-token")),
        ("/admin", session("partner-token")),
        ("/admin", session("admin-token")),
    ];

    for (path, cookies) in cases {
        let first = f.gate.evaluate(path, &cookies).await;
        let second = f.gate.evaluate(path, &cookies).await;
        assert_eq!(first, second, "{}", path);
    }
}

#[tokio::test]
async fn test_refreshed_tokens_propagate_on_public_and_gated_routes() {
    let f = fixture();
    f.provider.add_refresh("r-1", "fresh-access", "r-2", "partner");
    let stale = SessionCookies::new(Some("stale".to_string()), Some("r-1".to_string()));

    let outcome = f.gate.evaluate("/dashboard", &stale).await;
    assert_eq!(outcome.verdict, AccessVerdict::Allow);
    assert!(outcome.cookies.contains(&CookieMutation::Set {
        name: ACCESS_COOKIE_NAME,
        value: "fresh-access".to_string()
    }));

    let outcome = f.gate.evaluate("/about", &stale).await;
    assert_eq!(outcome.verdict, AccessVerdict::Allow);
    assert_eq!(outcome.cookies.len(), 2);
}

#[tokio::test]
async fn test_dead_session_is_cleared_even_when_redirecting() {
    let f = fixture();
    let dead = SessionCookies::new(Some("revoked".to_string()), Some("revoked-refresh".to_string()));

    let outcome = f.gate.evaluate("/dashboard", &dead).await;
    assert!(matches!(outcome.verdict, AccessVerdict::RedirectToLogin { .. }));
    assert_eq!(outcome.cookies, clear_session());
}

#[tokio::test]
async fn test_encoded_admin_path_is_gated() {
    let f = fixture();
    let outcome = f.gate.evaluate("/%61dmin/users", &anonymous()).await;
    assert_eq!(outcome.route_class, RouteClass::AdminArea);
    assert_eq!(outcome.verdict, login_without_return());
}

#[tokio::test]
async fn test_authorize_api() {
    let f = fixture();

    let outcome = f.gate.authorize_api(&anonymous()).await;
    assert_eq!(outcome.verdict, AccessVerdict::DenyAsUnauthorized);

    let outcome = f.gate.authorize_api(&session("admin-token")).await;
    assert_eq!(outcome.verdict, AccessVerdict::Allow);
    assert_eq!(outcome.principal.and_then(|p| p.access).map(|a| a.role), Some(Role::Admin));

    f.provider.set_unavailable(true);
    let outcome = f.gate.authorize_api(&session("admin-token")).await;
    assert_eq!(outcome.verdict, AccessVerdict::DenyAsUnauthorized);
}
