pub mod disk;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Byte-blob storage keyed by string, used to persist the tracked portfolio.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

pub use disk::DiskStore;
pub use memory::MemoryStore;
