use super::{Category, Image, Listing};
use serde::Deserialize;

const MAX_TITLE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_COMMENT_CHARS: usize = 500;

/// Every problem found while checking a submitted payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    fn check(messages: Vec<String>) -> Result<(), Self> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self { messages })
        }
    }
}

/// Listing payload as submitted by a user, before any checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub image: Option<Image>,
}

/// Typed listing payload accepted by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub category: Category,
    /// Freshly uploaded image, if any
    pub image: Option<Image>,
}

impl ListingForm {
    /// Trim, parse and validate the form into a [`ListingInput`]
    pub fn into_input(self) -> Result<ListingInput, ValidationError> {
        let mut messages = Vec::new();

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => Category::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                messages.push("Invalid category".to_string());
                Category::default()
            }),
        };
        let price = self.price.unwrap_or_else(|| {
            messages.push("Price must be a number".to_string());
            0.0
        });

        let input = ListingInput {
            title: trimmed(self.title),
            description: trimmed(self.description),
            price,
            location: trimmed(self.location),
            country: trimmed(self.country),
            category,
            image: self.image,
        };

        if let Err(err) = input.validate() {
            messages.extend(err.messages);
        }
        ValidationError::check(messages)?;
        Ok(input)
    }
}

impl ListingInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();

        if self.title.trim().is_empty() {
            messages.push("Title is required".to_string());
        } else if self.title.chars().count() > MAX_TITLE_CHARS {
            messages.push(format!(
                "Title must be less than {MAX_TITLE_CHARS} characters"
            ));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            messages.push(format!(
                "Description must be less than {MAX_DESCRIPTION_CHARS} characters"
            ));
        }
        if !self.price.is_finite() {
            messages.push("Price must be a number".to_string());
        } else if self.price < 0.0 {
            messages.push("Price cannot be negative".to_string());
        }
        if self.location.trim().is_empty() {
            messages.push("Location is required".to_string());
        }
        if self.country.trim().is_empty() {
            messages.push("Country is required".to_string());
        }

        ValidationError::check(messages)
    }

    /// Current state of a listing as an editable payload, without a new image
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            location: listing.location.clone(),
            country: listing.country.clone(),
            category: listing.category,
            image: None,
        }
    }
}

/// Review payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: String,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();

        if !(1..=5).contains(&self.rating) {
            messages.push("Rating must be between 1 and 5".to_string());
        }
        if self.comment.trim().is_empty() {
            messages.push("Comment is required".to_string());
        } else if self.comment.chars().count() > MAX_COMMENT_CHARS {
            messages.push(format!(
                "Comment must be less than {MAX_COMMENT_CHARS} characters"
            ));
        }

        ValidationError::check(messages)
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
