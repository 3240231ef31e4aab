use crate::ai::AiError;
use crate::geocoding::GeocodeError;
use crate::models::ValidationError;
use crate::store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

const GENERIC_MESSAGE: &str = "There was an error on our side";

/// Failures surfaced by listing, review and search operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{principal} may not modify {kind} {id}")]
    PermissionDenied {
        kind: &'static str,
        id: String,
        principal: String,
    },

    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("language model failed: {0}")]
    Ai(#[from] AiError),

    #[error("AI search is not configured (set GEMINI_API_KEY)")]
    AiUnavailable,

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn listing_not_found(id: impl ToString) -> Self {
        AppError::NotFound {
            kind: "Listing",
            id: id.to_string(),
        }
    }

    pub fn review_not_found(id: impl ToString) -> Self {
        AppError::NotFound {
            kind: "Review",
            id: id.to_string(),
        }
    }

    /// Message safe to show the user. Internal detail never leaks from here.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::NotFound { kind, .. } => format!("{kind} not found!"),
            AppError::PermissionDenied { .. } => "You don't have permission to do that!".into(),
            AppError::Geocode(GeocodeError::NotFound { .. }) => {
                "We couldn't find that location. Please check the location and country.".into()
            }
            AppError::Geocode(GeocodeError::Unavailable { .. }) => {
                "The geocoding service is not responding. Please try again later.".into()
            }
            AppError::Geocode(_) => "We couldn't look up that location right now.".into(),
            AppError::Ai(AiError::Parse(_)) => {
                "We couldn't understand the AI response. Please rephrase your preferences.".into()
            }
            AppError::Ai(_) | AppError::AiUnavailable => {
                "Error processing your preferences".into()
            }
            AppError::Store(_) => GENERIC_MESSAGE.into(),
        }
    }

    /// Rough HTTP status class, for front ends that need one
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::NotFound { .. } => 404,
            AppError::PermissionDenied { .. } => 403,
            AppError::Geocode(GeocodeError::NotFound { .. }) => 422,
            AppError::Geocode(_) | AppError::Ai(_) | AppError::AiUnavailable => 503,
            AppError::Store(_) => 500,
        }
    }
}
