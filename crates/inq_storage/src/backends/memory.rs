use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use inq_core::{cosine_similarity, ChunkStorage, EmbeddedChunk, Result, RetrievedChunk, EMBEDDING_DIM};
use crate::{BackendConfig, StorageBackend};

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub config: BackendConfig,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self {
            config: BackendConfig::new(
                "memory://".to_string(),
                "articles".to_string(),
                EMBEDDING_DIM as u64,
            ),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryStore {
    chunks: Vec<EmbeddedChunk>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn upsert_chunks(&mut self, chunks: &[EmbeddedChunk]) {
        for chunk in chunks {
            let id = chunk.chunk.id();
            if let Some(existing) = self.chunks.iter_mut().find(|c| c.chunk.id() == id) {
                *existing = chunk.clone();
            } else {
                self.chunks.push(chunk.clone());
            }
        }
    }

    pub fn query(&self, embedding: &[f32], limit: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<RetrievedChunk> = self
            .chunks
            .iter()
            .map(|c| RetrievedChunk {
                url: c.chunk.url.clone(),
                title: c.chunk.title.clone(),
                text: c.chunk.text.clone(),
                score: cosine_similarity(embedding, &c.embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process index. The default backend; also what the offline tests run
/// against.
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    config: MemoryConfig,
}

impl MemoryStorage {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
            config: MemoryConfig::new(),
        })
    }

    pub async fn chunk_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should always be available"
    }

    async fn new() -> Result<Self> {
        Self::new().await
    }

    fn get_config(&mut self) -> Option<&mut BackendConfig> {
        Some(&mut self.config.config)
    }
}

#[async_trait]
impl ChunkStorage for MemoryStorage {
    async fn upsert_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<()> {
        let mut store = self.store.write().await;
        store.upsert_chunks(chunks);
        Ok(())
    }

    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>> {
        let store = self.store.read().await;
        Ok(store.query(embedding, limit))
    }
}
