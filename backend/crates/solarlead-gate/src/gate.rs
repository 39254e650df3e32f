//! Per-request orchestration: classify, resolve the session, look up the
//! role, decide.

use crate::decision::{decide, decide_api, RoleLookup, SessionView};
use crate::route_class::{RouteClass, RouteTable};
use crate::verdict::AccessVerdict;
use log::{debug, warn};
use solarlead_auth::{AuthError, CookieMutation, SessionCookies, SessionResolver, SessionState, UserRepository};
use solarlead_commons::{UserAccess, UserId};
use std::sync::Arc;

/// Who is behind an allowed request. Inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePrincipal {
    pub user_id: UserId,
    /// Present when the role was looked up and found.
    pub access: Option<UserAccess>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub route_class: RouteClass,
    pub verdict: AccessVerdict,
    pub principal: Option<GatePrincipal>,
    /// Must be applied to the outgoing response, whatever the verdict.
    pub cookies: Vec<CookieMutation>,
}

/// Outcome for JSON endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOutcome {
    pub verdict: AccessVerdict,
    pub principal: Option<GatePrincipal>,
    pub cookies: Vec<CookieMutation>,
}

struct ResolvedSession {
    view: SessionView,
    user_id: Option<UserId>,
    cookies: Vec<CookieMutation>,
}

/// The request access gate.
///
/// Holds no per-request state; one instance serves every worker.
pub struct AccessGate {
    routes: RouteTable,
    resolver: SessionResolver,
    users: Arc<dyn UserRepository>,
}

impl AccessGate {
    pub fn new(routes: RouteTable, resolver: SessionResolver, users: Arc<dyn UserRepository>) -> Self {
        Self {
            routes,
            resolver,
            users,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn evaluate(&self, path: &str, cookies: &SessionCookies) -> GateOutcome {
        let route_class = self.routes.classify(path);

        match route_class {
            RouteClass::StaticAsset => GateOutcome {
                route_class,
                verdict: AccessVerdict::Allow,
                principal: None,
                cookies: Vec::new(),
            },
            RouteClass::Public => {
                // Resolved only so refreshed tokens reach the browser.
                let session = self.resolve(path, cookies).await;
                GateOutcome {
                    route_class,
                    verdict: AccessVerdict::Allow,
                    principal: session.user_id.map(|user_id| GatePrincipal {
                        user_id,
                        access: None,
                    }),
                    cookies: session.cookies,
                }
            },
            RouteClass::UserArea | RouteClass::AdminArea => {
                let session = self.resolve(path, cookies).await;
                let role = match &session.user_id {
                    Some(user_id) => self.lookup_role(user_id).await,
                    None => RoleLookup::Skipped,
                };

                let verdict = decide(route_class, path, session.view, role, self.routes.admin_home());
                debug!(
                    "Gate: path={} class={} session={:?} verdict={}",
                    path, route_class, session.view, verdict
                );

                let principal = match (&verdict, session.user_id) {
                    (AccessVerdict::Allow, Some(user_id)) => Some(GatePrincipal {
                        user_id,
                        access: role.access(),
                    }),
                    _ => None,
                };

                GateOutcome {
                    route_class,
                    verdict,
                    principal,
                    cookies: session.cookies,
                }
            },
        }
    }

    /// Session check for JSON endpoints under the API prefix.
    pub async fn authorize_api(&self, cookies: &SessionCookies) -> ApiOutcome {
        let session = self.resolve("api", cookies).await;
        let verdict = decide_api(session.view);

        let principal = match session.user_id {
            Some(user_id) => {
                let access = self.lookup_role(&user_id).await.access();
                Some(GatePrincipal { user_id, access })
            },
            None => None,
        };

        ApiOutcome {
            verdict,
            principal,
            cookies: session.cookies,
        }
    }

    async fn resolve(&self, path: &str, cookies: &SessionCookies) -> ResolvedSession {
        match self.resolver.resolve(cookies).await {
            Ok(resolution) => match resolution.state {
                SessionState::Authenticated { user_id, .. } => ResolvedSession {
                    view: SessionView::Authenticated,
                    user_id: Some(user_id),
                    cookies: resolution.cookies,
                },
                SessionState::Anonymous => ResolvedSession {
                    view: SessionView::Anonymous,
                    user_id: None,
                    cookies: resolution.cookies,
                },
            },
            Err(e) => {
                warn!("Session check failed for {}: {}", path, e);
                ResolvedSession {
                    view: SessionView::Unavailable,
                    user_id: None,
                    cookies: Vec::new(),
                }
            },
        }
    }

    /// One fresh read per request. No cache, no retry.
    async fn lookup_role(&self, user_id: &UserId) -> RoleLookup {
        match self.users.get_user_access(user_id).await {
            Ok(access) => RoleLookup::Found(access),
            Err(AuthError::UserNotFound(reason)) => {
                warn!("Role lookup for {} found no record: {}", user_id, reason);
                RoleLookup::NotFound
            },
            Err(e) => {
                warn!("Role lookup for {} failed: {}", user_id, e);
                RoleLookup::Failed
            },
        }
    }
}
