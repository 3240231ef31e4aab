use super::{AiError, LanguageModel};
use std::sync::Arc;
use tracing::{debug, info};

/// Fixes spelling and grammar in free-text preferences before interpretation
pub struct TextNormalizer {
    model: Arc<dyn LanguageModel>,
}

impl TextNormalizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Return the corrected text. An empty completion yields `raw` unchanged;
    /// service failures are returned for the caller to decide on.
    pub async fn normalize(&self, raw: &str) -> Result<String, AiError> {
        let completion = self.model.complete(&correction_prompt(raw)).await?;
        let corrected = clean(&completion);

        if corrected.is_empty() {
            debug!("Empty correction, keeping original input");
            return Ok(raw.to_string());
        }

        info!(
            model = self.model.model_name(),
            original = %raw,
            corrected = %corrected,
            "Normalized input"
        );
        Ok(corrected.to_string())
    }
}

fn correction_prompt(text: &str) -> String {
    format!(
        "You are a grammar and spelling corrector. Correct any spelling mistakes and grammar \
         errors in the following text. Keep the meaning exactly the same, just fix typos and grammar.\n\n\
         Text: \"{text}\"\n\n\
         Respond with ONLY the corrected text, nothing else. If there are no mistakes, \
         respond with the same text."
    )
}

/// Models sometimes echo the quoting from the prompt
fn clean(completion: &str) -> &str {
    let trimmed = completion.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn returns_corrected_text() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("\"Beach house in Italy\"\n".into())]));
        let normalizer = TextNormalizer::new(model.clone());

        let corrected = normalizer.normalize("beech hose in itly").await.unwrap();
        assert_eq!(corrected, "Beach house in Italy");
        assert!(model.prompts()[0].contains("beech hose in itly"));
    }

    #[tokio::test]
    async fn empty_completion_keeps_raw_input() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("   ".into())]));
        let normalizer = TextNormalizer::new(model);
        assert_eq!(normalizer.normalize("castle").await.unwrap(), "castle");
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![Err(AiError::Service(
            "connection reset".into(),
        ))]));
        let normalizer = TextNormalizer::new(model);
        assert!(matches!(
            normalizer.normalize("castle").await,
            Err(AiError::Service(_))
        ));
    }
}
