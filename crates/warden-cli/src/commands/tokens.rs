//! Password-reset token housekeeping.

use std::sync::Arc;

use clap::{Args, Subcommand};

use crate::output;
use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_core::error::AppError;
use warden_service::PasswordResetService;
use warden_service::password::DiscardDelivery;

/// Arguments for the tokens command
#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Tokens subcommand
    #[command(subcommand)]
    pub command: TokensCommand,
}

/// Tokens subcommands
#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    /// Delete expired password-reset tokens
    Sweep,
}

/// Execute token commands
pub async fn execute(args: &TokensArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let (stores, pool) = warden_api::app::open_stores(&config).await?;

    match &args.command {
        TokensCommand::Sweep => {
            let service = PasswordResetService::new(
                &stores,
                Arc::new(PasswordHasher::new()),
                Arc::new(PasswordPolicy::new(&config.auth)),
                Arc::new(DiscardDelivery),
            );
            let removed = service.sweep_expired().await?;
            output::print_success(&format!("Removed {removed} expired reset token(s)."));
        }
    }

    if let Some(pool) = pool {
        pool.close().await;
    }
    Ok(())
}
