//! Password-reset credential lifecycle.

pub mod delivery;
pub mod reset;

pub use delivery::{DiscardDelivery, ResetDelivery};
pub use reset::PasswordResetService;
