//! Search entry points end to end: direct search-box parameters, and free
//! text going through correction, interpretation and the fallback cascade.

use std::sync::Arc;

use wanderlust::ai::{AiError, RegionTable};
use wanderlust::geocoding::GeocodingResolver;
use wanderlust::models::{Category, Listing, ListingInput, PrincipalId};
use wanderlust::search::{Resolution, SearchParams, SearchRequest};
use wanderlust::store::{ListingStore, MemoryStore};
use wanderlust::testing::{ScriptedGeocoder, ScriptedModel};
use wanderlust::{AppError, ListingService};

fn listing(title: &str, description: &str, country: &str, category: Category) -> Listing {
    Listing::new(
        ListingInput {
            title: title.into(),
            description: description.into(),
            price: 200.0,
            location: "Old town".into(),
            country: country.into(),
            category,
            image: None,
        },
        PrincipalId::new("host"),
        None,
    )
}

async fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for l in [
        listing("Desert camp", "Sleep under the stars", "Morocco", Category::Camping),
        listing("Kasbah stay", "Restored ancient ruins with a courtyard", "Morocco", Category::Castles),
        listing("Pool villa", "Private pool near the beach", "Thailand", Category::Pools),
        listing("Beach hut", "Steps from the sand", "Thailand", Category::Rooms),
        listing("City loft", "Rooftop views", "France", Category::Trending),
    ] {
        store.insert(l).await.unwrap();
    }
    store
}

fn service(store: Arc<MemoryStore>) -> ListingService {
    ListingService::new(
        store,
        GeocodingResolver::new(Arc::new(ScriptedGeocoder::unused())),
    )
}

fn titles(listings: &[Listing]) -> Vec<&str> {
    listings.iter().map(|l| l.title.as_str()).collect()
}

#[tokio::test]
async fn search_box_combines_category_and_query() {
    let service = service(store().await);
    let request = SearchRequest::from_params(SearchParams {
        query: Some("beach".into()),
        category: Some("Pools".into()),
        ..Default::default()
    })
    .unwrap();

    let outcome = service.search(&request).await.unwrap();
    assert_eq!(outcome.resolution, Resolution::Primary);
    assert_eq!(titles(&outcome.listings), vec!["Pool villa"]);
}

#[tokio::test]
async fn empty_search_returns_everything() {
    let service = service(store().await);
    let outcome = service.search(&SearchRequest::default()).await.unwrap();
    assert_eq!(outcome.resolution, Resolution::Primary);
    assert_eq!(outcome.listings.len(), 5);
}

#[tokio::test]
async fn country_only_stage_runs_after_fallbacks() {
    let service = service(store().await);
    let request = SearchRequest::from_params(SearchParams {
        query: Some("igloo".into()),
        countries: Some("morocco".into()),
        fallback_queries: Some("ice hotel,snow".into()),
        ..Default::default()
    })
    .unwrap();

    let outcome = service.search(&request).await.unwrap();
    assert_eq!(outcome.resolution, Resolution::CountryOnly);
    assert_eq!(titles(&outcome.listings), vec!["Desert camp", "Kasbah stay"]);
}

#[tokio::test]
async fn recommendation_runs_the_whole_pipeline() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok("Fortress in Africa".into()),
        Ok(r#"```json
{"query": "fortress", "category": null, "countries": ["Africa"], "fallbackQueries": ["ancient ruins", "historic site"]}
```"#
            .into()),
    ]));
    let service = service(store().await).with_language_model(model.clone(), RegionTable::default());

    let rec = service.recommend("fortres in afrika").await.unwrap();

    assert_eq!(rec.corrected_input, "Fortress in Africa");
    assert_eq!(rec.preferences.query, "fortress");
    assert!(rec.preferences.countries.contains(&"morocco".to_string()));
    assert_eq!(titles(&rec.outcome.listings), vec!["Kasbah stay"]);
    assert_eq!(
        rec.outcome.resolution,
        Resolution::Fallback {
            term: "ancient ruins".into(),
            attempted: 1,
            unused: vec!["historic site".into()],
        }
    );
    assert!(rec.redirect.starts_with("/listings/search?query=fortress&countries="));
    assert!(model.prompts()[1].contains("Fortress in Africa"));
}

#[tokio::test]
async fn failed_correction_falls_back_to_raw_text() {
    let model = Arc::new(ScriptedModel::new(vec![
        Err(AiError::Service("503".into())),
        Ok(r#"{"query": "pool villa", "category": "pools", "countries": ["thailand"], "fallbackQueries": []}"#.into()),
    ]));
    let service = service(store().await).with_language_model(model.clone(), RegionTable::default());

    let rec = service.recommend("pool villa in thailand").await.unwrap();
    assert_eq!(rec.corrected_input, "pool villa in thailand");
    assert_eq!(rec.outcome.resolution, Resolution::Primary);
    assert_eq!(titles(&rec.outcome.listings), vec!["Pool villa"]);
}

#[tokio::test]
async fn unparseable_interpretation_is_recoverable() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok("somewhere sunny".into()),
        Ok("Sorry, I can't help with that.".into()),
    ]));
    let service = service(store().await).with_language_model(model, RegionTable::default());

    let err = service.recommend("somewhere suny").await.unwrap_err();
    assert!(matches!(err, AppError::Ai(AiError::Parse(_))));
    assert!(!err.user_message().contains("Sorry"));
}

#[tokio::test]
async fn blank_preferences_are_rejected() {
    let model = Arc::new(ScriptedModel::new(vec![]));
    let service = service(store().await).with_language_model(model.clone(), RegionTable::default());

    let err = service.recommend("   ").await.unwrap_err();
    assert_eq!(err.user_message(), "Please describe your travel preferences");
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn recommendation_without_model_is_unavailable() {
    let service = service(store().await);
    assert!(matches!(
        service.recommend("castle").await,
        Err(AppError::AiUnavailable)
    ));
}

#[tokio::test]
async fn nothing_matches_shows_trending() {
    let store = store().await;
    let service = service(store.clone());
    let outcome = service
        .search(&SearchRequest {
            query: Some("submarine".into()),
            fallback_queries: vec!["underwater".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.resolution, Resolution::Trending);
    assert_eq!(titles(&outcome.listings), vec!["City loft"]);
    assert_eq!(store.count().await.unwrap(), 5);
}
