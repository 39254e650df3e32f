// Solarlead Access Gate
// Decides, per request, whether a session may reach a route

pub mod decision;
pub mod gate;
pub mod middleware;
pub mod route_class;
pub mod verdict;

pub use decision::{decide, decide_api, RoleLookup, SessionView};
pub use gate::{AccessGate, ApiOutcome, GateOutcome, GatePrincipal};
pub use middleware::{apply_cookie_mutations, AccessGateMiddleware};
pub use route_class::{canonicalize_path, RouteClass, RouteTable};
pub use verdict::AccessVerdict;
