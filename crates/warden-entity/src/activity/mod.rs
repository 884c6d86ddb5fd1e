//! Activity log entities.

pub mod model;

pub use model::{ActivityLog, CreateActivityLog};
