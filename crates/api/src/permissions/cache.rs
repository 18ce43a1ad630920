//! Permission cache.
//!
//! Entries expire lazily: an entry older than the TTL is treated as absent
//! on read and replaced on the next load. There is no background sweep.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use jobs2go_core::permissions::Permission;
use jobs2go_core::types::DbId;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// The flattened permissions a user holds through their roles.
pub type PermissionSet = HashSet<Permission>;

/// Storage for per-user permission sets.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// The cached set, if present and not expired.
    async fn get(&self, user_id: DbId) -> Option<PermissionSet>;

    /// Store a freshly loaded set, replacing any previous entry.
    async fn set(&self, user_id: DbId, permissions: PermissionSet);

    /// Drop the entry for a user.
    async fn invalidate(&self, user_id: DbId);
}

struct CacheEntry {
    permissions: PermissionSet,
    inserted_at: Instant,
}

/// In-process cache keyed by user id.
pub struct InMemoryPermissionCache {
    ttl: Duration,
    entries: RwLock<HashMap<DbId, CacheEntry>>,
}

impl InMemoryPermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, user_id: DbId) -> Option<PermissionSet> {
        let entries = self.entries.read().await;
        entries
            .get(&user_id)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.permissions.clone())
    }

    async fn set(&self, user_id: DbId, permissions: PermissionSet) {
        self.entries.write().await.insert(
            user_id,
            CacheEntry {
                permissions,
                inserted_at: Instant::now(),
            },
        );
    }

    async fn invalidate(&self, user_id: DbId) {
        self.entries.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_only() -> PermissionSet {
        [Permission::TemplatesRead].into_iter().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_ttl() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(300));
        cache.set(1, read_only()).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(1).await, Some(read_only()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(1).await, None);
        // Expired entries stay until replaced.
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(300));
        cache.set(1, read_only()).await;
        cache.set(2, read_only()).await;

        cache.invalidate(1).await;

        assert_eq!(cache.get(1).await, None);
        assert!(cache.get(2).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn set_refreshes_insertion_time() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(10));
        cache.set(1, read_only()).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set(1, PermissionSet::new()).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get(1).await, Some(PermissionSet::new()));
    }
}
