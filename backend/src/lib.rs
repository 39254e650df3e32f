//! Solarlead Server Library
//!
//! Exposes the server wiring for integration testing.

pub mod lifecycle;
pub mod logging;
pub mod middleware;
