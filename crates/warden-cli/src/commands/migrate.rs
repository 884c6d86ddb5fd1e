//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use warden_core::config::DatabaseProvider;
use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    if config.database.provider != DatabaseProvider::Postgres {
        return Err(AppError::configuration(
            "Migrations need database.provider = \"postgres\"",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    pool.close().await;
    Ok(())
}
