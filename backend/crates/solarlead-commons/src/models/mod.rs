mod connection;
mod role;
mod user_id;

pub use connection::ConnectionInfo;
pub use role::{Role, UserAccess};
pub use user_id::UserId;
