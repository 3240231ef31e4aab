use super::StoreError;
use crate::models::{Listing, ListingId, Review, ReviewId};
use crate::search::Filter;
use async_trait::async_trait;

/// Persistence seam for listings and their reviews.
/// Implementations only execute filters; they never build them.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Listings matching `filter`, in insertion order, at most `limit` of them
    async fn find(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<Listing>, StoreError>;

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;

    async fn insert(&self, listing: Listing) -> Result<(), StoreError>;

    /// Replace the stored listing with the same id. Returns false when absent.
    async fn update(&self, listing: Listing) -> Result<bool, StoreError>;

    /// Remove a listing, returning it if it existed
    async fn delete(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;

    async fn insert_review(&self, review: Review) -> Result<(), StoreError>;

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;

    async fn delete_review(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;

    /// Delete every review in `ids`, returning how many were removed
    async fn delete_reviews(&self, ids: &[ReviewId]) -> Result<usize, StoreError>;

    /// Reviews referenced by a listing, in the listing's order
    async fn reviews_for(&self, listing: &Listing) -> Result<Vec<Review>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.find(&Filter::All, None).await?.len())
    }
}
