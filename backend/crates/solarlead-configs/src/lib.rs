//! solarlead-configs
//!
//! Server configuration types and loader.

pub mod config;

pub use config::defaults;
pub use config::*;
