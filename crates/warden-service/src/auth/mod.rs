//! Registration, login, token refresh, and logout.

pub mod service;

pub use service::{AuthResponse, AuthService, RegisterInput};
