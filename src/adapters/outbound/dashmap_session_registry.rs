//! DashMap Session Registry
//!
//! Implements SessionRegistry using DashMap for lock-free concurrent access.

use crate::domain::entities::Binding;
use crate::domain::ports::SessionRegistry;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// DashMap-backed session registry.
///
/// Dispatcher reads and provisioning writes proceed without a global lock.
/// Bindings outlive their provisioning session; the background GC task is
/// the only eviction path.
pub struct DashMapSessionRegistry {
    bindings: Arc<DashMap<String, Binding>>,
}

impl DashMapSessionRegistry {
    /// Create a new registry.
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(DashMap::new()),
        }
    }

    /// Start the background garbage collection task.
    ///
    /// Removes bindings that have not been resolved within the TTL.
    pub fn start_gc(&self, ttl: Duration, interval: Duration) {
        let bindings = self.bindings.clone();

        tokio::spawn(async move {
            loop {
                let now = Instant::now();
                let mut to_remove = Vec::new();

                for entry in bindings.iter() {
                    if now.duration_since(entry.value().last_seen) > ttl {
                        to_remove.push(entry.key().clone());
                    }
                }

                let removed_count = to_remove.len();
                for id in to_remove {
                    bindings.remove(&id);
                }

                if removed_count > 0 {
                    tracing::debug!("registry GC removed {} expired bindings", removed_count);
                }

                tokio::time::sleep(interval).await;
            }
        });
    }
}

impl Default for DashMapSessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for DashMapSessionRegistry {
    async fn put(&self, id: String, binding: Binding) {
        self.bindings.insert(id, binding);
    }

    async fn get(&self, id: &str) -> Option<Binding> {
        self.bindings.get(id).map(|e| e.value().clone())
    }

    async fn remove(&self, id: &str) {
        self.bindings.remove(id);
    }

    async fn touch(&self, id: &str) {
        if let Some(mut entry) = self.bindings.get_mut(id) {
            entry.last_seen = Instant::now();
        }
    }

    async fn cleanup_expired(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut to_remove = Vec::new();

        for entry in self.bindings.iter() {
            if now.duration_since(entry.value().last_seen) > ttl {
                to_remove.push(entry.key().clone());
            }
        }

        let count = to_remove.len();
        for id in to_remove {
            self.bindings.remove(&id);
        }

        count
    }

    async fn count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SessionHandle;
    use crate::domain::value_objects::Destination;

    fn binding(id: &str, dest: &str) -> Binding {
        Binding::new(
            id.to_string(),
            Destination::parse(dest).unwrap(),
            SessionHandle::detached(),
        )
    }

    // ===== Put and Get Tests =====

    #[tokio::test]
    async fn test_put_and_get() {
        let registry = DashMapSessionRegistry::new();
        registry
            .put("abc123".to_string(), binding("abc123", "http://127.0.0.1:9000/hook"))
            .await;

        let result = registry.get("abc123").await;
        assert!(result.is_some());
        assert_eq!(
            result.unwrap().destination.as_str(),
            "http://127.0.0.1:9000/hook"
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let registry = DashMapSessionRegistry::new();
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_put_is_visible_immediately() {
        let registry = Arc::new(DashMapSessionRegistry::new());

        let writer = registry.clone();
        tokio::spawn(async move {
            writer
                .put("id-1".to_string(), binding("id-1", "http://localhost:9000/a"))
                .await;
        })
        .await
        .unwrap();

        assert!(registry.get("id-1").await.is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let registry = DashMapSessionRegistry::new();

        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/a"))
            .await;
        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/b"))
            .await;

        let result = registry.get("id-1").await.unwrap();
        assert_eq!(result.destination.as_str(), "http://localhost:9000/b");
    }

    #[tokio::test]
    async fn test_same_destination_two_ids() {
        let registry = DashMapSessionRegistry::new();

        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/hook"))
            .await;
        registry
            .put("id-2".to_string(), binding("id-2", "http://localhost:9000/hook"))
            .await;

        assert!(registry.get("id-1").await.is_some());
        assert!(registry.get("id-2").await.is_some());
        assert_eq!(registry.count().await, 2);
    }

    // ===== Remove Tests =====

    #[tokio::test]
    async fn test_remove() {
        let registry = DashMapSessionRegistry::new();

        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/a"))
            .await;
        assert!(registry.get("id-1").await.is_some());

        registry.remove("id-1").await;
        assert!(registry.get("id-1").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_nonexistent_does_not_panic() {
        let registry = DashMapSessionRegistry::new();
        registry.remove("missing").await;
    }

    // ===== Touch Tests =====

    #[tokio::test]
    async fn test_touch_updates_last_seen() {
        let registry = DashMapSessionRegistry::new();

        let mut b = binding("id-1", "http://localhost:9000/a");
        let old_last_seen = Instant::now() - Duration::from_secs(100);
        b.last_seen = old_last_seen;
        registry.put("id-1".to_string(), b).await;

        registry.touch("id-1").await;

        let result = registry.get("id-1").await.unwrap();
        assert!(result.last_seen > old_last_seen);
    }

    #[tokio::test]
    async fn test_touch_nonexistent_does_not_panic() {
        let registry = DashMapSessionRegistry::new();
        registry.touch("missing").await;
    }

    // ===== Cleanup Expired Tests =====

    #[tokio::test]
    async fn test_cleanup_expired() {
        let registry = DashMapSessionRegistry::new();

        let mut b = binding("id-1", "http://localhost:9000/a");
        b.last_seen = Instant::now() - Duration::from_secs(100);
        registry.put("id-1".to_string(), b).await;

        let removed = registry.cleanup_expired(Duration::from_secs(50)).await;
        assert_eq!(removed, 1);
        assert!(registry.get("id-1").await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_bindings() {
        let registry = DashMapSessionRegistry::new();

        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/a"))
            .await;

        let removed = registry.cleanup_expired(Duration::from_secs(100)).await;
        assert_eq!(removed, 0);
        assert!(registry.get("id-1").await.is_some());
    }

    #[tokio::test]
    async fn test_cleanup_mixed_bindings() {
        let registry = DashMapSessionRegistry::new();

        let mut old = binding("old", "http://localhost:9000/a");
        old.last_seen = Instant::now() - Duration::from_secs(100);
        registry.put("old".to_string(), old).await;

        registry
            .put("fresh".to_string(), binding("fresh", "http://localhost:9000/b"))
            .await;

        let removed = registry.cleanup_expired(Duration::from_secs(50)).await;

        assert_eq!(removed, 1);
        assert!(registry.get("old").await.is_none());
        assert!(registry.get("fresh").await.is_some());
    }

    // ===== Count Tests =====

    #[tokio::test]
    async fn test_count() {
        let registry = DashMapSessionRegistry::new();
        assert_eq!(registry.count().await, 0);

        for i in 0..5 {
            let id = format!("id-{}", i);
            registry
                .put(id.clone(), binding(&id, "http://localhost:9000/hook"))
                .await;
        }
        assert_eq!(registry.count().await, 5);
    }

    // ===== GC Task Tests =====

    #[tokio::test]
    async fn test_start_gc_removes_expired_bindings() {
        let registry = DashMapSessionRegistry::new();

        let mut b = binding("id-1", "http://localhost:9000/a");
        b.last_seen = Instant::now() - Duration::from_millis(200);
        registry.put("id-1".to_string(), b).await;

        registry.start_gc(Duration::from_millis(100), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(registry.get("id-1").await.is_none());
    }

    #[tokio::test]
    async fn test_start_gc_keeps_fresh_bindings() {
        let registry = DashMapSessionRegistry::new();

        registry
            .put("id-1".to_string(), binding("id-1", "http://localhost:9000/a"))
            .await;

        registry.start_gc(Duration::from_secs(10), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(registry.get("id-1").await.is_some());
    }
}
