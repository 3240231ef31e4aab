use super::GeocodeError;
use async_trait::async_trait;

/// One candidate returned by a geocoding service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeHit {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub display_name: Option<String>,
}

/// Address-to-coordinates lookup. An empty list means the address is unknown.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, GeocodeError>;

    /// Get the name of the geocoding provider
    fn provider_name(&self) -> &'static str;
}
