//! Read-only aggregates for the admin dashboard.

pub mod service;

pub use service::{DashboardService, DashboardStats};
