//! HTTP handlers for the JSON API
//!
//! Everything here lives under `/api`, which the access gate treats as a
//! static prefix. Endpoints that need a session check it themselves.

pub mod auth;
pub mod health;

pub use auth::{logout_handler, me_handler, send_otp_handler, verify_otp_handler};
pub use health::{healthz_handler, readyz_handler};
