//! User administration and self-service.

pub mod service;

pub use service::{BulkAction, BulkActionResult, CreateUserInput, ProfileUpdate, UserService};
