//! User repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_core::types::pagination::PageResponse;
use warden_entity::user::{
    CreateUser, DailySignups, UpdateUser, User, UserQuery, UserWithRole,
};

use super::role::RoleRepository;
use crate::store::UserStore;

/// Repository for account CRUD and lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_where_active(&self, active: bool) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = $1")
            .bind(active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(total as u64)
    }
}

/// Maps a write failure, turning unique violations into `Conflict`.
fn write_error(e: sqlx::Error, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict("User with this email or username already exists")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

fn uuids(ids: &[UserId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users \
             WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($2))",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check identity uniqueness", e)
        })
    }

    async fn find_with_role(&self, id: UserId) -> AppResult<Option<UserWithRole>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let role = RoleRepository::load_with_permissions(&self.pool, user.role_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("User {} references missing role {}", user.id, user.role_id))
            })?;
        Ok(Some(UserWithRole { user, role }))
    }

    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<UserWithRole>> {
        // `$1` is NULL when there is no search term.
        const FILTER: &str = "$1::TEXT IS NULL \
             OR LOWER(first_name) LIKE $1 OR LOWER(last_name) LIKE $1 \
             OR LOWER(email) LIKE $1 OR LOWER(username) LIKE $1";

        let pattern = query.search_term().map(|term| format!("%{term}%"));
        let page = &query.page;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {FILTER}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        // The ORDER BY column comes from a closed enum, never from input.
        let sql = format!(
            "SELECT * FROM users WHERE {FILTER} ORDER BY {column} {order}, id {order} \
             LIMIT $2 OFFSET $3",
            column = query.sort_by.column(),
            order = query.sort_order.as_sql(),
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(&pattern)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        let mut roles = HashMap::new();
        let mut items = Vec::with_capacity(users.len());
        for user in users {
            if !roles.contains_key(&user.role_id) {
                let role = RoleRepository::load_with_permissions(&self.pool, user.role_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal(format!(
                            "User {} references missing role {}",
                            user.id, user.role_id
                        ))
                    })?;
                roles.insert(user.role_id, role);
            }
            if let Some(role) = roles.get(&user.role_id) {
                items.push(UserWithRole {
                    role: role.clone(),
                    user,
                });
            }
        }

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash, first_name, last_name, role_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to create user"))
    }

    async fn update(&self, id: UserId, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), \
                              username = COALESCE($3, username), \
                              first_name = COALESCE($4, first_name), \
                              last_name = COALESCE($5, last_name), \
                              role_id = COALESCE($6, role_id), \
                              is_active = COALESCE($7, is_active), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role_id)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to update user"))
    }

    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn set_active(&self, id: UserId, active: bool) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user status", e))
    }

    async fn set_active_many(&self, ids: &[UserId], active: bool) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(uuids(ids))
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user status", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[UserId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(uuids(ids))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete users", e))?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(total as u64)
    }

    async fn count_by_active(&self, active: bool) -> AppResult<u64> {
        self.count_where_active(active).await
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(total as u64)
    }

    async fn signups_per_day(&self, since: DateTime<Utc>) -> AppResult<Vec<DailySignups>> {
        sqlx::query_as::<_, DailySignups>(
            "SELECT (created_at AT TIME ZONE 'UTC')::DATE AS date, COUNT(*) AS user_count \
             FROM users WHERE created_at >= $1 \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to group signups", e))
    }
}
