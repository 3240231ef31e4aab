use super::AiError;
use async_trait::async_trait;

/// Text-completion backend used by the normalizer and interpreter
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// Get the name of the model backend
    fn model_name(&self) -> &str;
}
