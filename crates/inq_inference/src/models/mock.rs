use std::fmt;
use async_trait::async_trait;
use inq_core::{ChatMessage, ChatRole, InferenceModel, Result, EMBEDDING_DIM};

/// Deterministic offline model. Embeddings come from character frequencies,
/// which is enough to make related texts land near each other; chat replies
/// echo the question so tests can assert on the flow.
pub struct MockModel;

impl fmt::Debug for MockModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockModel").finish()
    }
}

impl MockModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceModel for MockModel {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0; EMBEDDING_DIM];
        let total = text.chars().count().max(1) as f32;
        for c in text.chars().filter(|c| c.is_alphanumeric()) {
            let slot = (c.to_ascii_lowercase() as usize) % EMBEDDING_DIM;
            embedding[slot] += 1.0 / total;
        }
        Ok(embedding)
    }

    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        Ok(format!("Mock answer to: {}", question))
    }
}
