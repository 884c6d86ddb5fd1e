//! # warden-database
//!
//! Persistence for Warden: the store traits the rest of the workspace
//! programs against, their PostgreSQL implementations, and an in-memory
//! implementation used by tests and `provider = "memory"` runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{ActivityLogStore, ResetTokenStore, RoleStore, Stores, UserStore};
