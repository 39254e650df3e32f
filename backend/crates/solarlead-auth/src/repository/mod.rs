pub mod rest_user_repo;
pub mod user_repo;

pub use rest_user_repo::RestUserRepository;
pub use user_repo::UserRepository;
