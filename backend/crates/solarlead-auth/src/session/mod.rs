pub mod resolver;

pub use resolver::{SessionResolution, SessionResolver, SessionState};
