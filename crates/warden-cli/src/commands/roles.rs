//! Role inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use warden_auth::rbac::RoleHierarchy;
use warden_core::error::AppError;
use warden_service::RoleService;

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RolesCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RolesCommand {
    /// List roles with their rank and permissions
    List,
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role name
    name: String,
    /// Rank in the management hierarchy
    rank: String,
    /// Seeded by migration
    system: bool,
    /// Granted permission names
    permissions: String,
}

/// Execute role commands
pub async fn execute(args: &RolesArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let (stores, pool) = warden_api::app::open_stores(&config).await?;
    let hierarchy = RoleHierarchy::from_config(&config.rbac);

    match &args.command {
        RolesCommand::List => {
            let mut roles = RoleService::new(&stores).list_roles().await?;
            roles.sort_by_key(|r| std::cmp::Reverse(hierarchy.rank(&r.role.name)));

            let rows: Vec<RoleRow> = roles
                .into_iter()
                .map(|r| RoleRow {
                    rank: hierarchy
                        .rank(&r.role.name)
                        .map_or_else(|| "-".to_string(), |rank| rank.to_string()),
                    name: r.role.name,
                    system: r.role.is_system_role,
                    permissions: r
                        .permissions
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    if let Some(pool) = pool {
        pool.close().await;
    }
    Ok(())
}
