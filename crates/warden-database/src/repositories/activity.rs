//! Activity log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::activity::{ActivityLog, CreateActivityLog};

use crate::store::ActivityLogStore;

/// Repository for the append-only activity log.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    /// Create a new activity log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogStore for ActivityLogRepository {
    async fn append(&self, data: &CreateActivityLog) -> AppResult<ActivityLog> {
        sqlx::query_as::<_, ActivityLog>(
            "INSERT INTO activity_logs (user_id, action, resource, details, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.action)
        .bind(&data.resource)
        .bind(&data.details)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append activity log", e))
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLog>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count activity logs", e)
            })?;

        let items = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activity logs", e))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<ActivityLog>> {
        sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recent activity", e))
    }
}
