use super::util::extract_json_object;
use super::{AiError, LanguageModel, RegionTable};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Structured search intent extracted from free text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretedPreferences {
    pub query: String,
    pub category: Option<Category>,
    pub countries: Vec<String>,
    pub fallback_queries: Vec<String>,
}

/// Payload shape requested from the model. Everything is optional so that
/// partially filled answers still parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreferences {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    countries: Value,
    #[serde(default)]
    fallback_queries: Value,
}

/// Turns corrected free text into [`InterpretedPreferences`] via the language model
pub struct PreferenceInterpreter {
    model: Arc<dyn LanguageModel>,
    regions: RegionTable,
}

impl PreferenceInterpreter {
    pub fn new(model: Arc<dyn LanguageModel>, regions: RegionTable) -> Self {
        Self { model, regions }
    }

    pub async fn interpret(&self, text: &str) -> Result<InterpretedPreferences, AiError> {
        let completion = self.model.complete(&self.search_prompt(text)).await?;
        let preferences = self.parse(&completion)?;

        info!(
            model = self.model.model_name(),
            query = %preferences.query,
            category = ?preferences.category,
            countries = ?preferences.countries,
            fallback_queries = ?preferences.fallback_queries,
            "Interpreted preferences"
        );
        Ok(preferences)
    }

    /// Parse a completion into preferences, stripping any wrapping around the JSON object
    pub fn parse(&self, completion: &str) -> Result<InterpretedPreferences, AiError> {
        let json = extract_json_object(completion).ok_or_else(|| {
            AiError::Parse(format!(
                "no JSON object in model response: {}",
                crate::ai::util::strip_code_blocks(completion)
            ))
        })?;
        let raw: RawPreferences = serde_json::from_str(json)?;

        let category = match raw.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => match name.parse::<Category>() {
                Ok(category) => Some(category),
                Err(e) => {
                    warn!(error = %e, "Model suggested an unknown category, ignoring it");
                    None
                }
            },
        };

        Ok(InterpretedPreferences {
            query: raw.query.unwrap_or_default().trim().to_string(),
            category,
            countries: self.regions.expand(&string_list(raw.countries)),
            fallback_queries: string_list(raw.fallback_queries),
        })
    }

    fn search_prompt(&self, text: &str) -> String {
        format!(
            r#"You are an expert travel search assistant. Based on the user's travel preferences, generate intelligent search parameters that will find the most relevant listings.

User's Travel Preferences:
"{text}"

Available categories: {categories}

Your task is to INTELLIGENTLY interpret the user's request and extract:
1. "query" (string): A search query (1-4 words) that captures what they're looking for. Include amenities, features, activities, locations, and types of stays mentioned.
2. "category" (string or null): ONLY if the user is specifically looking for a TYPE of stay/experience (pool, mountain, castle, etc). Otherwise null.
3. "countries" (array of strings): ALL countries the user might be interested in based on their description. If they mention a region, expand it to its countries:
{regions}
   - If they mention specific countries, include those
4. "fallbackQueries" (array of strings): 2-3 alternative, semantically similar searches to try if the exact search finds nothing. For example for "fortress in africa" suggest ["ancient ruins africa", "historic sites africa", "desert palace africa"].

Example:
- "Fortress in Africa" -> {{"query": "fortress", "category": null, "countries": ["egypt", "south africa", "morocco", "kenya", "tanzania"], "fallbackQueries": ["ancient palace africa", "historic ruins africa", "castle africa"]}}

IMPORTANT: Respond ONLY with a JSON object, nothing else. No markdown, no code blocks, just plain JSON."#,
            categories = Category::names(),
            regions = self.regions.prompt_lines(),
        )
    }
}

/// Strings from a JSON array; anything else is an empty list
fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn interpreter(responses: Vec<Result<String, AiError>>) -> PreferenceInterpreter {
        PreferenceInterpreter::new(
            Arc::new(ScriptedModel::new(responses)),
            RegionTable::default(),
        )
    }

    #[tokio::test]
    async fn parses_fenced_json() {
        let interpreter = interpreter(vec![Ok(r#"```json
{"query": "beach house", "category": "Pools", "countries": ["italy", "spain"], "fallbackQueries": ["coastal villa", "seaside cottage"]}
```"#
            .into())]);

        let prefs = interpreter.interpret("Beach house in Europe").await.unwrap();
        assert_eq!(prefs.query, "beach house");
        assert_eq!(prefs.category, Some(Category::Pools));
        assert_eq!(prefs.countries, vec!["italy", "spain"]);
        assert_eq!(prefs.fallback_queries, vec!["coastal villa", "seaside cottage"]);
    }

    #[test]
    fn missing_or_null_lists_become_empty() {
        let prefs = interpreter(vec![])
            .parse(r#"Here it is: {"query": "castle", "category": null, "countries": null}"#)
            .unwrap();
        assert_eq!(prefs.category, None);
        assert!(prefs.countries.is_empty());
        assert!(prefs.fallback_queries.is_empty());
    }

    #[test]
    fn region_names_are_expanded_locally() {
        let prefs = interpreter(vec![])
            .parse(r#"{"query": "resort", "countries": ["Asia"], "fallbackQueries": []}"#)
            .unwrap();
        assert!(prefs.countries.contains(&"japan".to_string()));
        assert!(prefs.countries.contains(&"philippines".to_string()));
        assert!(!prefs.countries.contains(&"asia".to_string()));
    }

    #[test]
    fn unknown_category_is_dropped() {
        let prefs = interpreter(vec![])
            .parse(r#"{"query": "resort", "category": "beaches"}"#)
            .unwrap();
        assert_eq!(prefs.category, None);
    }

    #[tokio::test]
    async fn unparseable_response_is_a_parse_error() {
        let interpreter = interpreter(vec![Ok("I think you'd love Bali!".into())]);
        let err = interpreter.interpret("somewhere warm").await.unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[tokio::test]
    async fn prompt_lists_categories_and_regions() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("{}".into())]));
        let interpreter = PreferenceInterpreter::new(model.clone(), RegionTable::default());
        interpreter.interpret("cabin").await.unwrap();

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("iconic cities"));
        assert!(prompt.contains("\"asia\" include: japan"));
        assert!(prompt.contains("\"cabin\""));
    }
}
