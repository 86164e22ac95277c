use std::sync::Arc;
use inq_core::{InferenceModel, Result};
use crate::Config;

pub mod mock;
pub mod openai;

pub use mock::MockModel;
pub use openai::OpenAiModel;

/// Instantiate an inference model by CLI name.
pub async fn create_model(name: &str, config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    match name {
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "mock" => Ok(Arc::new(MockModel::new())),
        other => Err(inq_core::Error::Inference(format!(
            "Unknown inference model: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_model_mock() {
        let model = create_model("mock", None).await.unwrap();
        assert_eq!(model.name(), "Mock");
    }

    #[tokio::test]
    async fn test_create_model_unknown() {
        assert!(create_model("clippy", None).await.is_err());
    }
}
