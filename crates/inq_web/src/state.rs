use std::collections::HashMap;
use tokio::sync::RwLock;
use inq_core::ChatHistory;
use inq_inference::QaEngine;

/// Shared application state: the QA engine plus per-session transcripts.
/// Transcripts live only in process memory.
pub struct AppState {
    pub engine: QaEngine,
    pub sessions: RwLock<HashMap<String, ChatHistory>>,
}

impl AppState {
    pub fn new(engine: QaEngine) -> Self {
        Self {
            engine,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}
