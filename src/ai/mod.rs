pub mod gemini;
pub mod interpreter;
pub mod normalizer;
pub mod regions;
pub mod traits;
pub mod util;

pub use gemini::GeminiClient;
pub use interpreter::{InterpretedPreferences, PreferenceInterpreter};
pub use normalizer::TextNormalizer;
pub use regions::RegionTable;
pub use traits::LanguageModel;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    /// Network failure, error status, or an empty completion envelope
    #[error("Service error: {0}")]
    Service(String),

    /// The completion text could not be read as the expected structure
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Service(err.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Parse(err.to_string())
    }
}
