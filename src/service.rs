use crate::ai::{
    InterpretedPreferences, LanguageModel, PreferenceInterpreter, RegionTable, TextNormalizer,
};
use crate::error::{AppError, Result};
use crate::geocoding::{GeocodeError, GeocodingResolver};
use crate::models::{
    Listing, ListingForm, ListingId, ListingInput, Point, PrincipalId, Review, ReviewId,
    ReviewInput, ValidationError,
};
use crate::search::{FallbackSearch, Filter, SearchOutcome, SearchRequest};
use crate::store::ListingStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fixed pause between geocoding calls during a backfill
pub const DEFAULT_BACKFILL_DELAY: Duration = Duration::from_secs(2);

const SAMPLE_LISTINGS: &str = include_str!("../data/sample_listings.json");

/// Result of the AI-assisted search
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub corrected_input: String,
    pub preferences: InterpretedPreferences,
    pub redirect: String,
    pub outcome: SearchOutcome,
}

/// Titles of listings touched by a geometry backfill, by outcome
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub updated: Vec<String>,
    pub unresolved: Vec<String>,
    pub failed: Vec<String>,
}

/// A listing with its reviews loaded
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub reviews: Vec<Review>,
}

/// Listing and review operations plus the two search entry points.
/// All external collaborators are injected.
pub struct ListingService {
    store: Arc<dyn ListingStore>,
    geocoding: GeocodingResolver,
    search: FallbackSearch,
    normalizer: Option<TextNormalizer>,
    interpreter: Option<PreferenceInterpreter>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>, geocoding: GeocodingResolver) -> Self {
        Self {
            search: FallbackSearch::new(store.clone()),
            store,
            geocoding,
            normalizer: None,
            interpreter: None,
        }
    }

    /// Enable the AI recommendation path
    pub fn with_language_model(mut self, model: Arc<dyn LanguageModel>, regions: RegionTable) -> Self {
        self.normalizer = Some(TextNormalizer::new(model.clone()));
        self.interpreter = Some(PreferenceInterpreter::new(model, regions));
        self
    }

    pub async fn index(&self) -> Result<Vec<Listing>> {
        Ok(self.store.find(&Filter::All, None).await?)
    }

    pub async fn show(&self, id: ListingId) -> Result<ListingDetail> {
        let listing = self.load(id).await?;
        let reviews = self.store.reviews_for(&listing).await?;
        Ok(ListingDetail { listing, reviews })
    }

    pub async fn create(&self, principal: &PrincipalId, input: ListingInput) -> Result<Listing> {
        input.validate()?;

        let geometry = Some(self.geocoding.resolve(&input.location, &input.country).await?);
        let listing = Listing::new(input, principal.clone(), geometry);
        self.store.insert(listing.clone()).await?;

        info!(id = %listing.id, owner = %principal, title = %listing.title, "Listing created");
        Ok(listing)
    }

    /// Create from a raw form, validating it first
    pub async fn create_from_form(&self, principal: &PrincipalId, form: ListingForm) -> Result<Listing> {
        self.create(principal, form.into_input()?).await
    }

    /// Replace a listing's fields. Coordinates are looked up again only when the
    /// location or country changed; a failed lookup leaves the listing untouched.
    pub async fn update(
        &self,
        principal: &PrincipalId,
        id: ListingId,
        input: ListingInput,
    ) -> Result<Listing> {
        let mut listing = self.load_owned(principal, id).await?;
        input.validate()?;

        let moved = listing.location.trim() != input.location.trim()
            || listing.country.trim() != input.country.trim();
        if moved {
            listing.geometry = Some(self.geocoding.resolve(&input.location, &input.country).await?);
        } else {
            debug!(id = %id, "Location unchanged, keeping coordinates");
        }

        listing.title = input.title;
        listing.description = input.description;
        listing.price = input.price;
        listing.location = input.location;
        listing.country = input.country;
        listing.category = input.category;
        if let Some(image) = input.image {
            listing.image = image;
        }
        listing.updated_at = Utc::now();

        if !self.store.update(listing.clone()).await? {
            return Err(AppError::listing_not_found(id));
        }
        info!(id = %id, regeocoded = moved, "Listing updated");
        Ok(listing)
    }

    /// Delete a listing together with every review it owns
    pub async fn delete(&self, principal: &PrincipalId, id: ListingId) -> Result<Listing> {
        let listing = self.load_owned(principal, id).await?;

        let removed = self.store.delete_reviews(&listing.reviews).await?;
        let deleted = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::listing_not_found(id))?;

        info!(id = %id, reviews = removed, "Listing deleted");
        Ok(deleted)
    }

    pub async fn add_review(
        &self,
        principal: &PrincipalId,
        listing_id: ListingId,
        input: ReviewInput,
    ) -> Result<Review> {
        input.validate()?;
        let mut listing = self.load(listing_id).await?;

        let review = Review::new(input, principal.clone());
        self.store.insert_review(review.clone()).await?;
        listing.reviews.push(review.id);
        if !self.store.update(listing).await? {
            // Listing vanished between load and update; don't leave an orphan behind
            self.store.delete_review(review.id).await?;
            return Err(AppError::listing_not_found(listing_id));
        }

        info!(listing = %listing_id, review = %review.id, rating = review.rating, "Review added");
        Ok(review)
    }

    pub async fn delete_review(
        &self,
        principal: &PrincipalId,
        listing_id: ListingId,
        review_id: ReviewId,
    ) -> Result<Review> {
        let review = self
            .store
            .find_review(review_id)
            .await?
            .ok_or_else(|| AppError::review_not_found(review_id))?;
        let mut listing = self.load(listing_id).await?;
        if !listing.reviews.contains(&review_id) {
            return Err(AppError::review_not_found(review_id));
        }
        if review.author != *principal {
            return Err(AppError::PermissionDenied {
                kind: "review",
                id: review_id.to_string(),
                principal: principal.to_string(),
            });
        }

        listing.reviews.retain(|r| *r != review_id);
        if !self.store.update(listing).await? {
            return Err(AppError::listing_not_found(listing_id));
        }
        self.store.delete_review(review_id).await?;

        info!(listing = %listing_id, review = %review_id, "Review deleted");
        Ok(review)
    }

    /// Direct search-box entry point
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        Ok(self.search.search(request).await?)
    }

    /// Free-text entry point: correct, interpret, then search
    pub async fn recommend(&self, text: &str) -> Result<Recommendation> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::single("Please describe your travel preferences").into());
        }
        let (Some(normalizer), Some(interpreter)) = (&self.normalizer, &self.interpreter) else {
            return Err(AppError::AiUnavailable);
        };

        let corrected_input = match normalizer.normalize(text).await {
            Ok(corrected) => corrected,
            Err(e) => {
                warn!(error = %e, "Spelling correction failed, using input as typed");
                text.to_string()
            }
        };

        let preferences = interpreter.interpret(&corrected_input).await.map_err(|e| {
            error!(error = %e, "Could not interpret preferences");
            AppError::Ai(e)
        })?;

        let request = SearchRequest::from(preferences.clone());
        let redirect = request.to_query_string();
        let outcome = self.search(&request).await?;

        Ok(Recommendation {
            corrected_input,
            preferences,
            redirect,
            outcome,
        })
    }

    /// Geocode every listing that has no coordinates yet, one at a time with
    /// `delay` before each call. Individual failures are logged and skipped.
    pub async fn backfill_geometry(&self, delay: Duration) -> Result<BackfillReport> {
        let pending: Vec<Listing> = self
            .index()
            .await?
            .into_iter()
            .filter(|l| l.geometry.is_none())
            .collect();

        let mut report = BackfillReport::default();
        if pending.is_empty() {
            info!("All listings already have coordinates");
            return Ok(report);
        }
        info!(count = pending.len(), "Backfilling listing coordinates");

        for mut listing in pending {
            tokio::time::sleep(delay).await;

            match self.geocoding.resolve(&listing.location, &listing.country).await {
                Ok(point) => {
                    listing.geometry = Some(point);
                    listing.updated_at = Utc::now();
                    match self.store.update(listing.clone()).await {
                        Ok(true) => {
                            info!(title = %listing.title, "Updated coordinates");
                            report.updated.push(listing.title);
                        }
                        Ok(false) => {
                            warn!(title = %listing.title, "Listing disappeared during backfill");
                            report.failed.push(listing.title);
                        }
                        Err(e) => {
                            error!(title = %listing.title, error = %e, "Could not save coordinates");
                            report.failed.push(listing.title);
                        }
                    }
                }
                Err(GeocodeError::NotFound { .. }) => {
                    warn!(title = %listing.title, "Could not geocode address");
                    report.unresolved.push(listing.title);
                }
                Err(e) => {
                    error!(title = %listing.title, error = %e, "Geocoding failed");
                    report.failed.push(listing.title);
                }
            }
        }

        info!(
            updated = report.updated.len(),
            unresolved = report.unresolved.len(),
            failed = report.failed.len(),
            "Backfill finished"
        );
        Ok(report)
    }

    /// Load the bundled sample listings, owned by `owner`, when the store holds
    /// fewer listings than the sample set. Returns how many were inserted.
    pub async fn seed(&self, owner: &PrincipalId) -> Result<usize> {
        let samples = sample_listings(owner)?;
        let existing = self.store.count().await?;
        if existing >= samples.len() {
            info!(existing, "Store already seeded");
            return Ok(0);
        }

        if existing > 0 {
            info!(existing, expected = samples.len(), "Reseeding store");
            for listing in self.index().await? {
                self.store.delete_reviews(&listing.reviews).await?;
                self.store.delete(listing.id).await?;
            }
        }

        let count = samples.len();
        for listing in samples {
            self.store.insert(listing).await?;
        }
        info!(count, owner = %owner, "Seeded store");
        Ok(count)
    }

    async fn load(&self, id: ListingId) -> Result<Listing> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::listing_not_found(id))
    }

    async fn load_owned(&self, principal: &PrincipalId, id: ListingId) -> Result<Listing> {
        let listing = self.load(id).await?;
        if !listing.is_owned_by(principal) {
            warn!(id = %id, principal = %principal, "Refused change by non-owner");
            return Err(AppError::PermissionDenied {
                kind: "listing",
                id: id.to_string(),
                principal: principal.to_string(),
            });
        }
        Ok(listing)
    }
}

#[derive(Deserialize)]
struct SampleListing {
    #[serde(flatten)]
    form: ListingForm,
    #[serde(default)]
    geometry: Option<Point>,
}

/// Bundled sample data as listings owned by `owner`
pub fn sample_listings(owner: &PrincipalId) -> Result<Vec<Listing>> {
    let samples: Vec<SampleListing> = serde_json::from_str(SAMPLE_LISTINGS)
        .map_err(|e| AppError::Store(e.into()))?;

    samples
        .into_iter()
        .map(|s| -> Result<Listing> {
            Ok(Listing::new(s.form.into_input()?, owner.clone(), s.geometry))
        })
        .collect()
}
