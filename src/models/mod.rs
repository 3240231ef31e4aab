mod category;
mod input;

pub use category::{Category, UnknownCategory};
pub use input::{ListingForm, ListingInput, ReviewInput, ValidationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type ListingId = Uuid;
pub type ReviewId = Uuid;

pub const DEFAULT_IMAGE_URL: &str = "https://images.unsplash.com/photo-1618005182384-a79c56be0d88";
pub const DEFAULT_IMAGE_FILENAME: &str = "default-image";

/// Authenticated user identity, as handed over by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uploaded image reference returned by the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub filename: String,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            url: DEFAULT_IMAGE_URL.to_string(),
            filename: DEFAULT_IMAGE_FILENAME.to_string(),
        }
    }
}

/// Geographic point, longitude first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl Serialize for Point {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJsonPoint {
            kind: "Point".to_string(),
            coordinates: [self.longitude, self.latitude],
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = GeoJsonPoint::deserialize(deserializer)?;
        if raw.kind != "Point" {
            return Err(serde::de::Error::custom(format!(
                "unsupported geometry type '{}'",
                raw.kind
            )));
        }
        Ok(Point {
            longitude: raw.coordinates[0],
            latitude: raw.coordinates[1],
        })
    }
}

/// A rentable property record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub image: Image,
    #[serde(default)]
    pub geometry: Option<Point>,
    pub owner: PrincipalId,
    #[serde(default)]
    pub reviews: Vec<ReviewId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build a new listing from validated input, owned by `owner`
    pub fn new(input: ListingInput, owner: PrincipalId, geometry: Option<Point>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            price: input.price,
            location: input.location,
            country: input.country,
            category: input.category,
            image: input.image.unwrap_or_default(),
            geometry,
            owner,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, principal: &PrincipalId) -> bool {
        &self.owner == principal
    }
}

/// A rating and comment left on a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    pub comment: String,
    pub author: PrincipalId,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(input: ReviewInput, author: PrincipalId) -> Self {
        Self {
            id: Uuid::new_v4(),
            rating: input.rating,
            comment: input.comment,
            author,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_serializes_longitude_first() {
        let point = Point {
            longitude: 12.5,
            latitude: 41.9,
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 12.5);
        assert_eq!(json["coordinates"][1], 41.9);
    }

    #[test]
    fn listing_without_image_gets_placeholder() {
        let input = ListingInput {
            title: "Loft".into(),
            description: String::new(),
            price: 90.0,
            location: "Lisbon".into(),
            country: "Portugal".into(),
            category: Category::Rooms,
            image: None,
        };
        let listing = Listing::new(input, PrincipalId::new("ana"), None);
        assert_eq!(listing.image.url, DEFAULT_IMAGE_URL);
        assert_eq!(listing.image.filename, DEFAULT_IMAGE_FILENAME);
    }
}
