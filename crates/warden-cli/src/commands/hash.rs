//! Offline password hashing, for seeding accounts by hand.

use clap::Args;

use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_core::error::AppError;

/// Arguments for the hash-password command
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Plaintext password
    pub password: String,

    /// Hash even if the password fails the configured policy
    #[arg(long)]
    pub skip_policy: bool,
}

/// Execute the hash-password command
pub fn execute(args: &HashArgs, env: &str) -> Result<(), AppError> {
    if !args.skip_policy {
        let config = super::load_config(env)?;
        PasswordPolicy::new(&config.auth).validate(&args.password)?;
    }

    let hash = PasswordHasher::new().hash_password(&args.password)?;
    println!("{hash}");
    Ok(())
}
