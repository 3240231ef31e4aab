use crate::ai::gemini::DEFAULT_GEMINI_MODEL;
use crate::geocoding::nominatim::{DEFAULT_USER_AGENT, NOMINATIM_URL};
use crate::service::DEFAULT_BACKFILL_DELAY;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file backing the listing store
    pub data_path: PathBuf,

    // Language model
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    // Geocoding
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub backfill_delay: Duration,

    /// Optional JSON file replacing the built-in region table
    pub regions_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    /// Only malformed values are errors.
    pub fn from_env() -> Result<Self> {
        let backfill_delay = match optional_env("GEOCODE_BACKFILL_DELAY_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .with_context(|| format!("GEOCODE_BACKFILL_DELAY_MS must be a number, got '{ms}'"))?,
            ),
            None => DEFAULT_BACKFILL_DELAY,
        };

        Ok(Self {
            data_path: optional_env("WANDERLUST_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("listings.json")),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            geocoder_url: optional_env("GEOCODER_URL").unwrap_or_else(|| NOMINATIM_URL.to_string()),
            geocoder_user_agent: optional_env("GEOCODER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            backfill_delay,
            regions_path: optional_env("WANDERLUST_REGIONS").map(PathBuf::from),
        })
    }
}

/// Unset and blank variables both count as absent
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
