//! Core type definitions used across the Warden workspace.

pub mod id;
pub mod pagination;
pub mod response;

pub use id::*;
pub use pagination::{PageRequest, PageResponse, SortOrder};
pub use response::ApiErrorResponse;
