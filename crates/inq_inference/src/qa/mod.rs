use std::sync::Arc;
use tracing::{debug, info};
use inq_core::{
    Answer, ChatHistory, ChatMessage, ChunkStorage, InferenceModel, Result, RetrievedChunk,
    SourceRef,
};

pub const DEFAULT_TOP_K: usize = 3;

const SYSTEM_PROMPT: &str = "You are an insurance advisor assistant answering questions \
from a knowledge base of scraped provider articles. Provide accurate, helpful information \
about insurance topics based on the context below. If the context does not cover the \
question, say so rather than making assumptions, and cite the articles you used.";

/// Formats retrieved chunks into the numbered context block of the prompt.
fn build_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return "(no matching articles in the index)".to_string();
    }
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {} ({})\n{}", i + 1, chunk.title, chunk.url, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assembles the fixed prompt: system message with context, prior turns as
/// alternating user/assistant messages, then the current question.
pub fn build_messages(
    question: &str,
    chunks: &[RetrievedChunk],
    history: &ChatHistory,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(format!(
        "{}\n\nContext:\n{}",
        SYSTEM_PROMPT,
        build_context(chunks)
    )));
    for turn in history.turns() {
        messages.push(ChatMessage::user(turn.question.clone()));
        messages.push(ChatMessage::assistant(turn.answer.clone()));
    }
    messages.push(ChatMessage::user(question.to_string()));
    messages
}

/// Deduplicates retrieved chunks into per-article citations, retrieval order
/// preserved.
fn collect_sources(chunks: &[RetrievedChunk]) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = Vec::new();
    for chunk in chunks {
        if !sources.iter().any(|s| s.url == chunk.url) {
            sources.push(SourceRef {
                url: chunk.url.clone(),
                title: chunk.title.clone(),
            });
        }
    }
    sources
}

/// Retrieval-augmented answering: embed the question, pull the nearest
/// chunks, prompt the chat model with them, return the reply plus citations.
pub struct QaEngine {
    storage: Arc<dyn ChunkStorage>,
    model: Arc<dyn InferenceModel>,
    top_k: usize,
}

impl QaEngine {
    pub fn new(storage: Arc<dyn ChunkStorage>, model: Arc<dyn InferenceModel>) -> Self {
        Self {
            storage,
            model,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn ask(&self, question: &str, history: &ChatHistory) -> Result<Answer> {
        debug!("Embedding question");
        let query_embedding = self.model.generate_embeddings(question).await?;

        let retrieved = self.storage.query(&query_embedding, self.top_k).await?;
        info!("🔍 Retrieved {} chunks for question", retrieved.len());
        for chunk in &retrieved {
            debug!("  {} (score {:.3})", chunk.url, chunk.score);
        }

        let messages = build_messages(question, &retrieved, history);
        let text = self.model.complete_chat(&messages).await?;

        Ok(Answer {
            text,
            sources: collect_sources(&retrieved),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MockModel;
    use inq_core::{EmbeddedChunk, TextSplitter};
    use inq_storage::backends::memory::MemoryStorage;

    fn retrieved(url: &str, title: &str, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            url: url.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_build_messages_shape() {
        let mut history = ChatHistory::new();
        history.push(
            "first question".to_string(),
            &Answer {
                text: "first answer".to_string(),
                sources: vec![],
            },
        );
        let chunks = vec![retrieved("https://a.com/1", "Deductibles", "about deductibles")];
        let messages = build_messages("second question", &chunks, &history);

        assert_eq!(messages.len(), 4);
        assert!(messages[0].content.contains("[1] Deductibles (https://a.com/1)"));
        assert!(messages[0].content.contains("about deductibles"));
        assert_eq!(messages[1].content, "first question");
        assert_eq!(messages[2].content, "first answer");
        assert_eq!(messages[3].content, "second question");
    }

    #[test]
    fn test_build_messages_empty_context() {
        let messages = build_messages("q", &[], &ChatHistory::new());
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("no matching articles"));
    }

    #[test]
    fn test_sources_deduplicated_in_order() {
        let chunks = vec![
            retrieved("https://a.com/1", "One", "x"),
            retrieved("https://a.com/2", "Two", "y"),
            retrieved("https://a.com/1", "One", "z"),
        ];
        let sources = collect_sources(&chunks);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].url, "https://a.com/1");
        assert_eq!(sources[1].url, "https://a.com/2");
    }

    #[tokio::test]
    async fn test_ask_end_to_end_over_memory_storage() {
        let storage = Arc::new(MemoryStorage::new().await.unwrap());
        let model = Arc::new(MockModel::new());

        // Ingest two articles the way the pipeline would.
        let splitter = TextSplitter::default();
        let article = inq_core::Article {
            url: "https://provider.test/deductibles".to_string(),
            title: "Understanding deductibles".to_string(),
            content: "A deductible is the amount you pay before coverage applies.".to_string(),
            source: "provider".to_string(),
            scraped_at: chrono_now(),
        };
        let mut embedded = Vec::new();
        for chunk in splitter.chunk_article(&article) {
            let embedding = model.generate_embeddings(&chunk.text).await.unwrap();
            embedded.push(EmbeddedChunk { chunk, embedding });
        }
        storage.upsert_chunks(&embedded).await.unwrap();

        let engine = QaEngine::new(storage, model).with_top_k(2);
        let answer = engine
            .ask("what is a deductible?", &ChatHistory::new())
            .await
            .unwrap();

        assert!(answer.text.contains("what is a deductible?"));
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].url, "https://provider.test/deductibles");
    }

    #[tokio::test]
    async fn test_ask_with_empty_index() {
        let storage = Arc::new(MemoryStorage::new().await.unwrap());
        let model = Arc::new(MockModel::new());
        let engine = QaEngine::new(storage, model);

        let answer = engine.ask("anything", &ChatHistory::new()).await.unwrap();
        assert!(answer.sources.is_empty());
        assert!(!answer.text.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_never_zero() {
        let storage = Arc::new(MemoryStorage::new().await.unwrap());
        let model = Arc::new(MockModel::new());
        let engine = QaEngine::new(storage, model).with_top_k(0);
        assert_eq!(engine.top_k, 1);
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
