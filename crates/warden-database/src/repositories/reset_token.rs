//! Password-reset token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_entity::reset::{CreateResetToken, PasswordResetToken};

use crate::store::ResetTokenStore;

/// Repository for single-use reset tokens.
#[derive(Debug, Clone)]
pub struct ResetTokenRepository {
    pool: PgPool,
}

impl ResetTokenRepository {
    /// Create a new reset token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for ResetTokenRepository {
    async fn create(&self, data: &CreateResetToken) -> AppResult<PasswordResetToken> {
        sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_reset_tokens (user_id, token, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.token)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store reset token", e))
    }

    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> AppResult<Option<UserId>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Concurrent redeemers block here; after the winner commits the
        // row is gone and they see nothing.
        let record = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT * FROM password_reset_tokens \
             WHERE token = $1 AND expires_at > $2 FOR UPDATE",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up reset token", e))?;

        let Some(record) = record else {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back", e)
            })?;
            return Ok(None);
        };

        let updated =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(record.user_id)
                .bind(password_hash)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
            .bind(record.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to consume reset token", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit password reset", e)
        })?;

        Ok((updated.rows_affected() > 0).then_some(record.user_id))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to sweep reset tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
