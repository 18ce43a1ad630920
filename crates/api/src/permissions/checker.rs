//! Permission checks backed by the cache and the RBAC tables.

use std::sync::Arc;

use async_trait::async_trait;
use jobs2go_core::permissions::Permission;
use jobs2go_core::types::DbId;
use jobs2go_db::repositories::PermissionRepo;
use jobs2go_db::DbPool;

use super::cache::{PermissionCache, PermissionSet};

/// Loads a user's permissions from storage.
#[async_trait]
pub trait PermissionLoader: Send + Sync {
    /// The user's flattened permission set, or `None` if the user does not
    /// exist or is inactive.
    async fn load(&self, user_id: DbId) -> Result<Option<PermissionSet>, sqlx::Error>;
}

/// Loads permissions through `user_roles` → `role_permissions`.
pub struct DbPermissionLoader {
    pool: DbPool,
}

impl DbPermissionLoader {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionLoader for DbPermissionLoader {
    async fn load(&self, user_id: DbId) -> Result<Option<PermissionSet>, sqlx::Error> {
        let Some(names) = PermissionRepo::load_user_permissions(&self.pool, user_id).await? else {
            return Ok(None);
        };

        let set = names
            .iter()
            .filter_map(|name| match name.parse::<Permission>() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Ignoring unknown permission");
                    None
                }
            })
            .collect();
        Ok(Some(set))
    }
}

/// Answers permission questions for the acting user.
///
/// Every check fails closed: no user, an unknown or inactive user, or a
/// storage error all answer "no".
pub struct PermissionChecker {
    cache: Arc<dyn PermissionCache>,
    loader: Arc<dyn PermissionLoader>,
}

impl PermissionChecker {
    pub fn new(cache: Arc<dyn PermissionCache>, loader: Arc<dyn PermissionLoader>) -> Self {
        Self { cache, loader }
    }

    /// Whether `user_id` holds `permission`. `None` means no authenticated
    /// user and always answers `false`.
    pub async fn has_permission(&self, permission: Permission, user_id: Option<DbId>) -> bool {
        let Some(user_id) = user_id else {
            return false;
        };

        match self.permissions_for(user_id).await {
            Ok(Some(set)) => set.contains(&permission),
            Ok(None) => false,
            Err(e) => {
                tracing::error!(user_id, permission = %permission, error = %e, "Permission check failed");
                false
            }
        }
    }

    /// The user's permissions, sorted. Empty on any error.
    pub async fn user_permissions(&self, user_id: DbId) -> Vec<Permission> {
        match self.permissions_for(user_id).await {
            Ok(Some(set)) => {
                let mut list: Vec<Permission> = set.into_iter().collect();
                list.sort();
                list
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load user permissions");
                Vec::new()
            }
        }
    }

    /// Forget the cached set for a user, e.g. after a role change.
    pub async fn clear_permission_cache(&self, user_id: DbId) {
        self.cache.invalidate(user_id).await;
        tracing::debug!(user_id, "Permission cache cleared");
    }

    async fn permissions_for(&self, user_id: DbId) -> Result<Option<PermissionSet>, sqlx::Error> {
        if let Some(set) = self.cache.get(user_id).await {
            return Ok(Some(set));
        }

        let loaded = self.loader.load(user_id).await?;
        if let Some(set) = &loaded {
            self.cache.set(user_id, set.clone()).await;
        }
        Ok(loaded)
    }
}
