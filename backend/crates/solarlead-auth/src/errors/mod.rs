pub mod error;

pub use error::{AuthError, AuthResult};
