use async_trait::async_trait;
use crate::types::{EmbeddedChunk, RetrievedChunk};
use crate::Result;

/// Dimensionality of the hosted embedding model's vectors.
pub const EMBEDDING_DIM: usize = 1536;

/// Seam to the remote vector index. Implementations own the connection and
/// create the index on first use.
#[async_trait]
pub trait ChunkStorage: Send + Sync {
    /// Upsert embedded chunks. Chunk ids are stable, so re-ingesting an
    /// article overwrites its previous vectors instead of duplicating them.
    async fn upsert_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<()>;

    /// Nearest-neighbor query, best match first.
    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedChunk>>;
}
