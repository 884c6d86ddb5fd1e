//! Role repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{PermissionId, RoleId};
use warden_entity::role::{
    CreateRole, Permission, Role, RoleUserCount, RoleWithPermissions, UpdateRole,
};

use crate::store::RoleStore;

/// Repository for roles and their permissions.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Permissions granted to one role.
    pub(crate) async fn permissions_for(pool: &PgPool, role_id: RoleId) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.* FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.name",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load role permissions", e)
        })
    }

    pub(crate) async fn load_with_permissions(
        pool: &PgPool,
        id: RoleId,
    ) -> AppResult<Option<RoleWithPermissions>> {
        let Some(role) = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))?
        else {
            return Ok(None);
        };
        let permissions = Self::permissions_for(pool, role.id).await?;
        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    /// Replaces every grant of `role_id` inside `tx`.
    async fn replace_grants(
        tx: &mut Transaction<'_, Postgres>,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear grants", e))?;

        let ids: Vec<Uuid> = permission_ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1, UNNEST($2::UUID[]) ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant permissions", e))?;
        Ok(())
    }
}

fn write_error(e: sqlx::Error, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict("Role with this name already exists")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by id", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })
    }

    async fn find_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleWithPermissions>> {
        Self::load_with_permissions(&self.pool, id).await
    }

    async fn list_with_permissions(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        let mut out = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = Self::permissions_for(&self.pool, role.id).await?;
            out.push(RoleWithPermissions { role, permissions });
        }
        Ok(out)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list permissions", e)
            })
    }

    async fn find_permissions(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = ANY($1) ORDER BY name")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find permissions", e))
    }

    async fn create(&self, data: &CreateRole) -> AppResult<RoleWithPermissions> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Failed to create role"))?;

        Self::replace_grants(&mut tx, role.id, &data.permission_ids).await?;
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit role", e)
        })?;

        let permissions = Self::permissions_for(&self.pool, role.id).await?;
        Ok(RoleWithPermissions { role, permissions })
    }

    async fn update(
        &self,
        id: RoleId,
        data: &UpdateRole,
    ) -> AppResult<Option<RoleWithPermissions>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = COALESCE($2, name), \
                              description = COALESCE($3, description), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Failed to update role"))?;

        let Some(role) = updated else {
            return Ok(None);
        };
        if let Some(permission_ids) = &data.permission_ids {
            Self::replace_grants(&mut tx, id, permission_ids).await?;
        }
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit role", e)
        })?;

        let permissions = Self::permissions_for(&self.pool, role.id).await?;
        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    async fn delete(&self, id: RoleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::conflict("Role is assigned to users")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete role", e),
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count roles", e))?;
        Ok(total as u64)
    }

    async fn user_counts(&self) -> AppResult<Vec<RoleUserCount>> {
        sqlx::query_as::<_, RoleUserCount>(
            "SELECT r.id AS role_id, r.name AS role_name, COUNT(u.id) AS user_count \
             FROM roles r LEFT JOIN users u ON u.role_id = r.id \
             GROUP BY r.id, r.name ORDER BY r.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count role users", e))
    }
}
