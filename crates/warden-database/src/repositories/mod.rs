//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod reset_token;
pub mod role;
pub mod user;

pub use activity::ActivityLogRepository;
pub use reset_token::ResetTokenRepository;
pub use role::RoleRepository;
pub use user::UserRepository;
