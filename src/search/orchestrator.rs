use super::{Filter, SearchRequest};
use crate::models::{Category, Listing};
use crate::store::{ListingStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of listings returned by the trending fallback
pub const TRENDING_LIMIT: usize = 12;

/// Which stage of the cascade produced the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Resolution {
    /// The request as given matched
    Primary,
    /// A fallback query matched after `attempted` tries
    Fallback {
        term: String,
        attempted: usize,
        unused: Vec<String>,
    },
    /// Only the country clause matched
    CountryOnly,
    /// Nothing matched; trending listings (possibly none) are returned
    Trending,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    pub resolution: Resolution,
}

/// Runs a search request through primary, fallback-query, country-only and
/// trending stages, stopping at the first stage with results.
pub struct FallbackSearch {
    store: Arc<dyn ListingStore>,
}

impl FallbackSearch {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, StoreError> {
        let primary = Filter::build(
            request.query.as_deref(),
            request.category,
            &request.countries,
        );
        debug!(filter = ?primary, "Primary search");
        let listings = self.store.find(&primary, None).await?;
        if !listings.is_empty() {
            info!(count = listings.len(), "Search resolved by primary query");
            return Ok(SearchOutcome {
                listings,
                resolution: Resolution::Primary,
            });
        }

        // A blank term would leave only the country clause
        let terms: Vec<&str> = request
            .fallback_queries
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        for (i, &term) in terms.iter().enumerate() {
            let filter = Filter::build(Some(term), request.category, &request.countries);
            debug!(term = %term, filter = ?filter, "Fallback search");
            let listings = self.store.find(&filter, None).await?;
            if !listings.is_empty() {
                let unused: Vec<String> =
                    terms[i + 1..].iter().map(|t| t.to_string()).collect();
                info!(
                    term = %term,
                    attempted = i + 1,
                    unused = ?unused,
                    count = listings.len(),
                    "Search resolved by fallback query"
                );
                return Ok(SearchOutcome {
                    listings,
                    resolution: Resolution::Fallback {
                        term: term.to_string(),
                        attempted: i + 1,
                        unused,
                    },
                });
            }
        }

        let countries = Filter::country_only(&request.countries);
        if countries != Filter::All {
            let listings = self.store.find(&countries, None).await?;
            if !listings.is_empty() {
                info!(count = listings.len(), "Search resolved by country only");
                return Ok(SearchOutcome {
                    listings,
                    resolution: Resolution::CountryOnly,
                });
            }
        }

        let listings = self
            .store
            .find(&Filter::category(Category::Trending), Some(TRENDING_LIMIT))
            .await?;
        info!(count = listings.len(), "No matches, showing trending listings");
        Ok(SearchOutcome {
            listings,
            resolution: Resolution::Trending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingInput, PrincipalId};
    use crate::store::MemoryStore;

    fn listing(title: &str, description: &str, country: &str, category: Category) -> Listing {
        Listing::new(
            ListingInput {
                title: title.into(),
                description: description.into(),
                price: 80.0,
                location: "Town".into(),
                country: country.into(),
                category,
                image: None,
            },
            PrincipalId::new("host"),
            None,
        )
    }

    async fn store_with(listings: Vec<Listing>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for l in listings {
            store.insert(l).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn primary_match_wins() {
        let store = store_with(vec![listing("Beach hut", "", "Fiji", Category::Rooms)]).await;
        let search = FallbackSearch::new(store);
        let outcome = search
            .search(&SearchRequest {
                query: Some("beach".into()),
                fallback_queries: vec!["hut".into()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.resolution, Resolution::Primary);
        assert_eq!(outcome.listings.len(), 1);
    }

    #[tokio::test]
    async fn first_matching_fallback_term_is_reported() {
        let ruins = listing("Old stones", "Walk among ancient ruins", "Narnia", Category::Castles);
        let store = store_with(vec![
            ruins.clone(),
            listing("Historic site tour", "", "Narnia", Category::Castles),
            listing("Trending loft", "", "France", Category::Trending),
        ])
        .await;
        let search = FallbackSearch::new(store);

        let outcome = search
            .search(&SearchRequest {
                query: Some("fortress".into()),
                category: None,
                countries: vec!["narnia".into()],
                fallback_queries: vec!["ancient ruins".into(), "historic site".into()],
            })
            .await
            .unwrap();

        assert_eq!(outcome.listings, vec![ruins]);
        assert_eq!(
            outcome.resolution,
            Resolution::Fallback {
                term: "ancient ruins".into(),
                attempted: 1,
                unused: vec!["historic site".into()],
            }
        );
    }

    #[tokio::test]
    async fn fallback_keeps_country_constraint() {
        let store = store_with(vec![
            listing("Ruins", "ancient ruins", "Greece", Category::Castles),
            listing("Cottage", "", "Narnia", Category::Forests),
        ])
        .await;
        let outcome = FallbackSearch::new(store)
            .search(&SearchRequest {
                query: Some("fortress".into()),
                countries: vec!["narnia".into()],
                fallback_queries: vec!["ancient ruins".into()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.resolution, Resolution::CountryOnly);
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.listings[0].title, "Cottage");
    }

    #[tokio::test]
    async fn blank_fallback_terms_are_skipped() {
        let store = store_with(vec![
            listing("Cottage", "", "Narnia", Category::Forests),
            listing("Ruins", "ancient ruins", "Narnia", Category::Castles),
        ])
        .await;
        let outcome = FallbackSearch::new(store)
            .search(&SearchRequest {
                query: Some("fortress".into()),
                countries: vec!["narnia".into()],
                fallback_queries: vec!["  ".into(), "ancient ruins".into(), "".into()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.resolution,
            Resolution::Fallback {
                term: "ancient ruins".into(),
                attempted: 1,
                unused: vec![],
            }
        );
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.listings[0].title, "Ruins");
    }

    #[tokio::test]
    async fn only_blank_fallback_terms_reach_country_only() {
        let store = store_with(vec![listing("Cottage", "", "Narnia", Category::Forests)]).await;
        let outcome = FallbackSearch::new(store)
            .search(&SearchRequest {
                query: Some("fortress".into()),
                countries: vec!["narnia".into()],
                fallback_queries: vec![" ".into()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.resolution, Resolution::CountryOnly);
    }

    #[tokio::test]
    async fn falls_back_to_capped_trending() {
        let mut listings: Vec<_> = (0..15)
            .map(|i| listing(&format!("Hot {i}"), "", "Peru", Category::Trending))
            .collect();
        listings.push(listing("Cabin", "", "Norway", Category::Forests));
        let store = store_with(listings).await;

        let outcome = FallbackSearch::new(store)
            .search(&SearchRequest {
                query: Some("submarine".into()),
                countries: vec!["atlantis".into()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.resolution, Resolution::Trending);
        assert_eq!(outcome.listings.len(), TRENDING_LIMIT);
        assert!(outcome
            .listings
            .iter()
            .all(|l| l.category == Category::Trending));
    }

    #[tokio::test]
    async fn empty_store_returns_empty_trending() {
        let outcome = FallbackSearch::new(Arc::new(MemoryStore::new()))
            .search(&SearchRequest::default())
            .await
            .unwrap();
        assert_eq!(outcome.resolution, Resolution::Trending);
        assert!(outcome.listings.is_empty());
    }
}
