//! Schema and seed migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

/// Migrations embedded from the workspace `migrations/` directory.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration. Already-applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations completed");
    Ok(())
}
