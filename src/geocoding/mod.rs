pub mod nominatim;
pub mod resolver;
pub mod retry;
pub mod traits;

pub use nominatim::NominatimGeocoder;
pub use resolver::GeocodingResolver;
pub use retry::{Backoff, RetryError, RetryPolicy};
pub use traits::{GeocodeHit, Geocoder};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    /// Network failure, timeout or server-side error; worth retrying
    #[error("Transient geocoding failure: {0}")]
    Transient(String),

    /// The service refused the request (bad request, forbidden); not retried
    #[error("Geocoding request rejected: {0}")]
    Rejected(String),

    /// The service answered but had no usable coordinates
    #[error("No coordinates found for '{address}'")]
    NotFound { address: String },

    /// Retries exhausted on transient failures
    #[error("Geocoding service is not responding after {attempts} attempts: {last}")]
    Unavailable { attempts: u32, last: String },
}

impl GeocodeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GeocodeError::Transient(_))
    }
}
