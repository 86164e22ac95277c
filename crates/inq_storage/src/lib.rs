use async_trait::async_trait;
use std::sync::Arc;
use inq_core::{ChunkStorage, Result};

pub mod backends;

pub use backends::*;

/// Connection settings shared by every backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub collection: String,
    pub vector_size: u64,
}

impl BackendConfig {
    pub fn new(url: String, collection: String, vector_size: u64) -> Self {
        Self {
            url,
            collection,
            vector_size,
        }
    }

    pub fn with_url(&mut self, url: &str) -> &mut Self {
        self.url = url.to_string();
        self
    }
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Hint printed when the backend cannot be reached.
    fn get_error_message() -> &'static str;

    async fn new() -> Result<Self>
    where
        Self: Sized;

    fn get_config(&mut self) -> Option<&mut BackendConfig>;
}

/// Instantiate a storage backend by CLI name.
#[cfg_attr(not(feature = "qdrant"), allow(unused_variables))]
pub async fn create_storage(name: &str, backend_url: Option<&str>) -> Result<Arc<dyn ChunkStorage>> {
    match name {
        "memory" => {
            let storage = backends::memory::MemoryStorage::new().await?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "qdrant")]
        "qdrant" => {
            let storage = backends::qdrant::QdrantStorage::connect(backend_url).await?;
            Ok(Arc::new(storage))
        }
        other => Err(inq_core::Error::Storage(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig, StorageBackend};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_storage_memory() {
        assert!(create_storage("memory", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_storage_unknown() {
        let result = create_storage("cassette-tape", None).await;
        assert!(result.is_err());
    }
}
