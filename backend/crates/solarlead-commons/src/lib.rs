//! solarlead-commons
//!
//! Identifiers and small models shared by the auth, gate and API crates.

pub mod models;

pub use models::{ConnectionInfo, Role, UserAccess, UserId};
