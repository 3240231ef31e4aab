use super::{GeocodeError, Geocoder, RetryError, RetryPolicy};
use crate::models::Point;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Three attempts, one second apart
pub const DEFAULT_RETRY: RetryPolicy = RetryPolicy::fixed(3, Duration::from_secs(1));

/// Resolves a location and country to a point, retrying transient failures
pub struct GeocodingResolver {
    geocoder: Arc<dyn Geocoder>,
    retry: RetryPolicy,
}

impl GeocodingResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_policy(geocoder, DEFAULT_RETRY)
    }

    pub fn with_policy(geocoder: Arc<dyn Geocoder>, retry: RetryPolicy) -> Self {
        Self { geocoder, retry }
    }

    pub async fn resolve(&self, location: &str, country: &str) -> Result<Point, GeocodeError> {
        let address = format!("{}, {}", location.trim(), country.trim());

        let geocoder = &self.geocoder;
        let query = address.as_str();
        let hits = self
            .retry
            .run(move |_| geocoder.geocode(query), GeocodeError::is_transient)
            .await
            .map_err(|e| match e {
                RetryError::Exhausted { attempts, last } => {
                    warn!(address = %address, attempts, error = %last, "Geocoding gave up");
                    GeocodeError::Unavailable {
                        attempts,
                        last: last.to_string(),
                    }
                }
                RetryError::Rejected(e) => e,
            })?;

        let point = hits.first().and_then(|hit| match (hit.longitude, hit.latitude) {
            (Some(longitude), Some(latitude)) => Some(Point {
                longitude,
                latitude,
            }),
            _ => None,
        });

        match point {
            Some(point) => {
                info!(
                    address = %address,
                    provider = self.geocoder.provider_name(),
                    longitude = point.longitude,
                    latitude = point.latitude,
                    "Geocoded address"
                );
                Ok(point)
            }
            None => {
                warn!(address = %address, "No coordinates found");
                Err(GeocodeError::NotFound { address })
            }
        }
    }
}
