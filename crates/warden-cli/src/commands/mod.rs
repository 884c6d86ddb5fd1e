//! CLI command definitions and dispatch.

pub mod hash;
pub mod migrate;
pub mod roles;
pub mod serve;
pub mod tokens;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use warden_core::config::AppConfig;
use warden_core::error::AppError;

/// Warden: authentication and role-based access control service
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Environment overlay loaded after config/default (config/{env})
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Warden server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Password-reset token housekeeping
    Tokens(tokens::TokensArgs),
    /// Role inspection
    Roles(roles::RolesArgs),
    /// Print the Argon2id hash of a password
    HashPassword(hash::HashArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Tokens(args) => tokens::execute(args, &self.env).await,
            Commands::Roles(args) => roles::execute(args, &self.env, self.format).await,
            Commands::HashPassword(args) => hash::execute(args, &self.env),
        }
    }
}

/// Helper: load layered configuration for `env`
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}
