//! Repository for the RBAC tables (`users`, `roles`, `user_roles`,
//! `role_permissions`, `permissions`).

use jobs2go_core::types::DbId;
use sqlx::PgPool;

use crate::models::permission::{Role, User};

/// Column list for users queries.
const USER_COLUMNS: &str = "id, email, is_active, created_at, updated_at";

/// Provides user, role and permission lookups.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Flattened permission names granted to a user through their roles.
    ///
    /// Returns `None` if the user does not exist or is inactive.
    pub async fn load_user_permissions(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Vec<String>>, sqlx::Error> {
        let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        if !matches!(active, Some((true,))) {
            return Ok(None);
        }

        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT p.name \
             FROM user_roles ur \
             JOIN role_permissions rp ON rp.role_id = ur.role_id \
             JOIN permissions p ON p.id = rp.permission_id \
             WHERE ur.user_id = $1 \
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(rows.into_iter().map(|(name,)| name).collect()))
    }

    /// Insert a user.
    pub async fn create_user(pool: &PgPool, email: &str) -> Result<User, sqlx::Error> {
        let query = format!("INSERT INTO users (email) VALUES ($1) RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Activate or deactivate a user. Returns `None` if the user does not exist.
    pub async fn set_user_active(
        pool: &PgPool,
        user_id: DbId,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name.
    pub async fn find_role_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name, created_at FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Grant a role to a user. Granting an already-held role is a no-op.
    pub async fn assign_role(pool: &PgPool, user_id: DbId, role_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
