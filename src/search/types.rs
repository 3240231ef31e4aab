use crate::ai::InterpretedPreferences;
use crate::models::{Category, ValidationError};
use serde::{Deserialize, Serialize};

/// Raw search-box parameters, as they arrive on the query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    /// Comma-separated country names or fragments
    pub countries: Option<String>,
    /// Comma-separated alternative queries
    pub fallback_queries: Option<String>,
}

/// Typed search request consumed by the filter builder and orchestrator
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category: Option<Category>,
    pub countries: Vec<String>,
    pub fallback_queries: Vec<String>,
}

impl SearchRequest {
    /// Parse and validate search-box parameters
    pub fn from_params(params: SearchParams) -> Result<Self, ValidationError> {
        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|e| ValidationError::single(e.to_string()))?,
            ),
        };

        Ok(Self {
            query: non_blank(params.query),
            category,
            countries: split_list(params.countries.as_deref()),
            fallback_queries: split_list(params.fallback_queries.as_deref()),
        })
    }

    /// Redirect target for the search page carrying this request
    pub fn to_query_string(&self) -> String {
        let mut url = format!(
            "/listings/search?query={}",
            urlencoding::encode(self.query.as_deref().unwrap_or(""))
        );
        if !self.countries.is_empty() {
            url.push_str("&countries=");
            url.push_str(&urlencoding::encode(&self.countries.join(",")));
        }
        if !self.fallback_queries.is_empty() {
            url.push_str("&fallbackQueries=");
            url.push_str(&urlencoding::encode(&self.fallback_queries.join(",")));
        }
        if let Some(category) = self.category {
            url.push_str("&category=");
            url.push_str(&urlencoding::encode(category.as_str()));
        }
        url
    }
}

impl From<InterpretedPreferences> for SearchRequest {
    fn from(prefs: InterpretedPreferences) -> Self {
        Self {
            query: non_blank(Some(prefs.query)),
            category: prefs.category,
            countries: prefs.countries,
            fallback_queries: prefs.fallback_queries,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated parameter, dropping blank entries
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| {
        r.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
