use super::{GeocodeError, GeocodeHit, Geocoder};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "Wanderlust-Geocoding-Service";

/// OpenStreetMap Nominatim search client
pub struct NominatimGeocoder {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| GeocodeError::Rejected(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, GeocodeError> {
        debug!(address, "Nominatim lookup");

        let response = self
            .client
            .get(&self.url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(GeocodeError::Transient(format!("Nominatim returned {status}")));
        }
        if !status.is_success() {
            return Err(GeocodeError::Rejected(format!("Nominatim returned {status}")));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Transient(format!("Unreadable Nominatim response: {e}")))?;

        Ok(results
            .into_iter()
            .map(|r| GeocodeHit {
                latitude: r.lat.and_then(|v| v.parse().ok()),
                longitude: r.lon.and_then(|v| v.parse().ok()),
                display_name: r.display_name,
            })
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "openstreetmap"
    }
}
