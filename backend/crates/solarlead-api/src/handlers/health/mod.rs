//! Health check handlers
//!
//! ## Endpoints
//! - GET /api/healthz - Liveness probe
//! - GET /api/readyz - Readiness probe
//!
//! Both are unauthenticated. The `/api` prefix is never gated.

pub mod models;

mod healthz;
mod readyz;

pub use healthz::healthz_handler;
pub use readyz::readyz_handler;
