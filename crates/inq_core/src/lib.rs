pub mod chunk;
pub mod error;
pub mod inference;
pub mod storage;
pub mod types;

pub use error::Error;
pub use error::Result;

pub use chunk::TextSplitter;
pub use inference::{ChatMessage, ChatRole, InferenceModel};
pub use storage::{ChunkStorage, EMBEDDING_DIM};
pub use types::{
    Answer, Article, ChatHistory, ChatTurn, Chunk, EmbeddedChunk, RetrievedChunk, SourceRef,
    cosine_similarity,
};
