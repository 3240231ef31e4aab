use super::{ListingStore, StoreError};
use crate::models::{Listing, ListingId, Review, ReviewId};
use crate::search::Filter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// On-disk layout of the store file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    listings: Vec<Listing>,
    #[serde(default)]
    reviews: Vec<Review>,
}

/// In-memory listing store, optionally backed by a JSON file.
/// With a backing file every write is flushed before returning, and a write
/// whose flush fails is not applied.
pub struct MemoryStore {
    data: RwLock<StoreSnapshot>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreSnapshot::default()),
            path: None,
        }
    }

    /// Open a store file, starting empty when it does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Store file not found, starting empty");
                StoreSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(
            path = %path.display(),
            listings = snapshot.listings.len(),
            reviews = snapshot.reviews.len(),
            "Loaded store"
        );

        Ok(Self {
            data: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    /// Apply `change` to a copy of the data, flush the copy, then publish it
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut data = self.data.write().await;
        if self.path.is_none() {
            return change(&mut data);
        }
        let mut next = data.clone();
        let out = change(&mut next)?;
        self.flush(&next).await?;
        *data = next;
        Ok(out)
    }

    async fn flush(&self, data: &StoreSnapshot) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<Listing>, StoreError> {
        let data = self.data.read().await;
        let matches = data.listings.iter().filter(|l| filter.matches(l)).cloned();
        Ok(match limit {
            Some(n) => matches.take(n).collect(),
            None => matches.collect(),
        })
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        let data = self.data.read().await;
        Ok(data.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, listing: Listing) -> Result<(), StoreError> {
        self.commit(|data| {
            if data.listings.iter().any(|l| l.id == listing.id) {
                return Err(StoreError::Conflict(format!(
                    "listing {} already exists",
                    listing.id
                )));
            }
            data.listings.push(listing);
            Ok(())
        })
        .await
    }

    async fn update(&self, listing: Listing) -> Result<bool, StoreError> {
        if self.find_by_id(listing.id).await?.is_none() {
            return Ok(false);
        }
        self.commit(|data| {
            let Some(slot) = data.listings.iter_mut().find(|l| l.id == listing.id) else {
                return Ok(false);
            };
            *slot = listing;
            Ok(true)
        })
        .await
    }

    async fn delete(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }
        self.commit(|data| {
            Ok(data
                .listings
                .iter()
                .position(|l| l.id == id)
                .map(|pos| data.listings.remove(pos)))
        })
        .await
    }

    async fn insert_review(&self, review: Review) -> Result<(), StoreError> {
        self.commit(|data| {
            if data.reviews.iter().any(|r| r.id == review.id) {
                return Err(StoreError::Conflict(format!(
                    "review {} already exists",
                    review.id
                )));
            }
            data.reviews.push(review);
            Ok(())
        })
        .await
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        let data = self.data.read().await;
        Ok(data.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_review(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        if self.find_review(id).await?.is_none() {
            return Ok(None);
        }
        self.commit(|data| {
            Ok(data
                .reviews
                .iter()
                .position(|r| r.id == id)
                .map(|pos| data.reviews.remove(pos)))
        })
        .await
    }

    async fn delete_reviews(&self, ids: &[ReviewId]) -> Result<usize, StoreError> {
        let present = {
            let data = self.data.read().await;
            data.reviews.iter().filter(|r| ids.contains(&r.id)).count()
        };
        if present == 0 {
            return Ok(0);
        }
        self.commit(|data| {
            let before = data.reviews.len();
            data.reviews.retain(|r| !ids.contains(&r.id));
            Ok(before - data.reviews.len())
        })
        .await
    }

    async fn reviews_for(&self, listing: &Listing) -> Result<Vec<Review>, StoreError> {
        let data = self.data.read().await;
        Ok(listing
            .reviews
            .iter()
            .filter_map(|id| data.reviews.iter().find(|r| r.id == *id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ListingInput, PrincipalId, ReviewInput};

    fn listing(title: &str, category: Category) -> Listing {
        Listing::new(
            ListingInput {
                title: title.into(),
                description: String::new(),
                price: 50.0,
                location: "Oslo".into(),
                country: "Norway".into(),
                category,
                image: None,
            },
            PrincipalId::new("kari"),
            None,
        )
    }

    #[tokio::test]
    async fn find_respects_filter_order_and_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert(listing(&format!("Trending {i}"), Category::Trending))
                .await
                .unwrap();
        }
        store.insert(listing("Quiet room", Category::Rooms)).await.unwrap();

        let found = store
            .find(&Filter::category(Category::Trending), Some(3))
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Trending 0", "Trending 1", "Trending 2"]);
        assert_eq!(store.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = MemoryStore::new();
        let l = listing("Cabin", Category::Forests);
        store.insert(l.clone()).await.unwrap();
        assert!(matches!(
            store.insert(l).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn persists_to_and_reloads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let mut l = listing("Igloo", Category::Arctic);
        let review = Review::new(
            ReviewInput {
                rating: 5,
                comment: "Cold but cosy".into(),
            },
            PrincipalId::new("guest"),
        );
        l.reviews.push(review.id);
        store.insert(l.clone()).await.unwrap();
        store.insert_review(review.clone()).await.unwrap();

        let reopened = MemoryStore::open(&path).await.unwrap();
        let loaded = reopened.find_by_id(l.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Igloo");
        assert_eq!(reopened.reviews_for(&loaded).await.unwrap(), vec![review]);
    }

    #[tokio::test]
    async fn failed_flush_leaves_data_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data");
        tokio::fs::create_dir(&nested).await.unwrap();

        let store = MemoryStore::open(nested.join("listings.json")).await.unwrap();
        let kept = listing("Cabin", Category::Forests);
        store.insert(kept.clone()).await.unwrap();

        tokio::fs::remove_dir_all(&nested).await.unwrap();

        let fresh = listing("Igloo", Category::Arctic);
        assert!(matches!(
            store.insert(fresh.clone()).await,
            Err(StoreError::Io(_))
        ));
        assert_eq!(store.find_by_id(fresh.id).await.unwrap(), None);

        let mut renamed = kept.clone();
        renamed.title = "Renamed".into();
        assert!(store.update(renamed).await.is_err());
        assert!(store.delete(kept.id).await.is_err());

        assert_eq!(store.find_by_id(kept.id).await.unwrap(), Some(kept));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
