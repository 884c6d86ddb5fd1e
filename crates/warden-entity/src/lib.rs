//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate represents a
//! database table row or a value object assembled from several rows. Table
//! rows additionally derive `sqlx::FromRow`.

pub mod activity;
pub mod reset;
pub mod role;
pub mod user;
