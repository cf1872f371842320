use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::types::PushSubscriptionRecord;

/// Subject used when no identity layer supplies one.
pub const DEFAULT_SUBJECT: &str = "default";

/// Keyed storage of one subscription per subject.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace the record for `subject`
    async fn put(&self, subject: &str, record: PushSubscriptionRecord);

    /// Remove the record for `subject`, no-op when absent
    async fn remove(&self, subject: &str);

    /// Remove the record for `subject` only while it still points at
    /// `endpoint`. The check and the delete are one step.
    async fn remove_if(&self, subject: &str, endpoint: &str) -> bool;

    async fn get(&self, subject: &str) -> Option<PushSubscriptionRecord>;

    async fn len(&self) -> usize;
}

/// Process-local store. Entries do not survive a restart and are not shared
/// between instances.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, PushSubscriptionRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemoryRegistry {
    async fn put(&self, subject: &str, record: PushSubscriptionRecord) {
        let mut entries = self.entries.write().await;
        entries.insert(subject.to_string(), record);
    }

    async fn remove(&self, subject: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(subject);
    }

    async fn remove_if(&self, subject: &str, endpoint: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(subject) {
            Some(record) if record.endpoint == endpoint => {
                entries.remove(subject);
                true
            },
            _ => false,
        }
    }

    async fn get(&self, subject: &str) -> Option<PushSubscriptionRecord> {
        let entries = self.entries.read().await;
        entries.get(subject).cloned()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl std::fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegistry").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(endpoint: &str) -> PushSubscriptionRecord {
        PushSubscriptionRecord::new(endpoint.to_string(), None)
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let registry = MemoryRegistry::new();

        registry.put("alice", record("https://push/1")).await;
        registry.put("alice", record("https://push/2")).await;

        assert_eq!(registry.get("alice").await, Some(record("https://push/2")));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let registry = MemoryRegistry::new();

        registry.remove("nobody").await;

        assert_eq!(registry.get("nobody").await, None);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_only_touches_subject() {
        let registry = MemoryRegistry::new();
        registry.put("alice", record("https://push/a")).await;
        registry.put("bob", record("https://push/b")).await;

        registry.remove("alice").await;

        assert_eq!(registry.get("alice").await, None);
        assert_eq!(registry.get("bob").await, Some(record("https://push/b")));
    }

    #[tokio::test]
    async fn test_remove_if_matches_endpoint() {
        let registry = MemoryRegistry::new();
        registry.put("alice", record("https://push/new")).await;

        assert!(!registry.remove_if("alice", "https://push/old").await);
        assert!(!registry.remove_if("nobody", "https://push/new").await);
        assert_eq!(registry.get("alice").await, Some(record("https://push/new")));

        assert!(registry.remove_if("alice", "https://push/new").await);
        assert_eq!(registry.get("alice").await, None);
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let registry = Arc::new(MemoryRegistry::new());

        let mut handles = vec![];
        for i in 0..20 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let subject = format!("subject-{}", i % 4);
                registry
                    .put(&subject, record(&format!("https://push/{}", i)))
                    .await;
                registry.get(&subject).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        assert_eq!(registry.len().await, 4);
    }
}
