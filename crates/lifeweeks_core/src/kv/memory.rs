//! In-memory key-value backend.

use super::{BackendResult, KeyValueBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile backend; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryKvBackend {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKvBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryKvBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> BackendResult<()> {
        let mut items = self.items.write().await;
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvBackend;
    use crate::kv::KeyValueBackend;

    #[tokio::test]
    async fn len_follows_sets_and_removes() {
        let backend = MemoryKvBackend::new();
        assert!(backend.is_empty().await);

        backend.set_item("a", "1".to_string()).await.unwrap();
        backend.set_item("a", "2".to_string()).await.unwrap();
        backend.set_item("b", "3".to_string()).await.unwrap();
        assert_eq!(backend.len().await, 2);

        backend.remove_items(&["a", "missing"]).await.unwrap();
        assert_eq!(backend.len().await, 1);
        assert_eq!(backend.get_item("b").await.unwrap().as_deref(), Some("3"));
    }
}
