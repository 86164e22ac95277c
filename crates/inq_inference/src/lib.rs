pub mod models;
pub mod qa;

pub use models::create_model;
pub use qa::QaEngine;

/// Settings for hosted-model clients. Unset fields fall back to environment
/// variables and built-in defaults in the model constructors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::qa::QaEngine;
    pub use super::Config;
    pub use inq_core::{Answer, ChatHistory, ChatMessage, InferenceModel, Result};
}
