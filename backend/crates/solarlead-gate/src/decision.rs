//! The access decision table.
//!
//! Pure functions: the verdict depends only on the route class, the raw path,
//! the session and the role lookup outcome.
//!
//! | Route       | Session            | Role lookup                   | Verdict                   |
//! |-------------|--------------------|-------------------------------|---------------------------|
//! | StaticAsset | any                |                               | Allow                     |
//! | Public      | any                |                               | Allow                     |
//! | UserArea    | anonymous/down     |                               | login, back to path       |
//! | UserArea    | authenticated      | admin or super admin          | admin home                |
//! | UserArea    | authenticated      | user, missing or failed       | Allow                     |
//! | AdminArea   | anonymous/down     |                               | login, no return path     |
//! | AdminArea   | authenticated      | active admin or super admin   | Allow                     |
//! | AdminArea   | authenticated      | anything else                 | login, no return path     |

use crate::route_class::RouteClass;
use crate::verdict::AccessVerdict;
use solarlead_commons::UserAccess;

/// Session as far as the decision is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    Anonymous,
    Authenticated,
    /// The identity provider could not be reached.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLookup {
    Found(UserAccess),
    NotFound,
    Failed,
    /// No lookup was made (no session).
    Skipped,
}

impl RoleLookup {
    pub fn access(&self) -> Option<UserAccess> {
        match self {
            RoleLookup::Found(access) => Some(*access),
            _ => None,
        }
    }
}

pub fn decide(
    class: RouteClass,
    raw_path: &str,
    session: SessionView,
    role: RoleLookup,
    admin_home: &str,
) -> AccessVerdict {
    match class {
        RouteClass::StaticAsset | RouteClass::Public => AccessVerdict::Allow,

        RouteClass::UserArea => match (session, role) {
            (SessionView::Authenticated, RoleLookup::Found(access)) if access.role.is_admin() => {
                AccessVerdict::RedirectTo(admin_home.to_string())
            },
            // Missing or failed lookups are tolerated here.
            (SessionView::Authenticated, _) => AccessVerdict::Allow,
            (SessionView::Anonymous | SessionView::Unavailable, _) => AccessVerdict::RedirectToLogin {
                return_to: Some(raw_path.to_string()),
            },
        },

        RouteClass::AdminArea => match (session, role) {
            (SessionView::Authenticated, RoleLookup::Found(access)) if access.can_enter_admin() => {
                AccessVerdict::Allow
            },
            // Never reveal which admin page was requested.
            _ => AccessVerdict::RedirectToLogin { return_to: None },
        },
    }
}

/// Decision for JSON endpoints, which answer 401 instead of redirecting.
pub fn decide_api(session: SessionView) -> AccessVerdict {
    match session {
        SessionView::Authenticated => AccessVerdict::Allow,
        SessionView::Anonymous | SessionView::Unavailable => AccessVerdict::DenyAsUnauthorized,
    }
}
