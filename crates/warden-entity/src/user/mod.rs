//! User domain entities.

pub mod model;

pub use model::{
    CreateUser, DailySignups, UpdateUser, User, UserQuery, UserSortField, UserWithRole,
};
