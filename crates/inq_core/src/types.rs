use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scraped provider article. Produced once per scrape, immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

/// A bounded span of an article's text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub url: String,
    pub title: String,
    pub source: String,
    pub text: String,
    pub index: usize,
    pub total: usize,
}

impl Chunk {
    /// Identifier of the chunk in the remote index. Stable across
    /// re-ingestion so upserts overwrite rather than duplicate.
    pub fn id(&self) -> String {
        format!("{}#{}", self.url, self.index)
    }

    /// Short text preview carried alongside the vector as metadata.
    pub fn preview(&self) -> String {
        self.text.chars().take(160).collect()
    }
}

/// A chunk paired with its embedding, ready for upsert.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a similarity query against the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub url: String,
    pub title: String,
    pub text: String,
    pub score: f32,
}

/// Citation pointing back at the article a retrieved chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

/// One question/answer exchange in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Ordered session transcript, held only in process memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, question: String, answer: &Answer) {
        self.turns.push(ChatTurn {
            question,
            answer: answer.text.clone(),
            sources: answer.sources.clone(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Cosine similarity between two vectors. Returns 0.0 when either vector is
/// all zeros or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
