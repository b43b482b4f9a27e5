use super::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store, lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.inner.lock().await;
        let value = store.get(key).cloned();
        debug!(hit = value.is_some(), "Store GET for key: {:?}", key);
        Ok(value)
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut store = self.inner.lock().await;
        debug!("Store PUT for key: {:?}", key);
        store.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
