//! Wanderlust - listing marketplace core.
//!
//! Listings and reviews with owner checks, coordinates looked up on create
//! and edit, and a search that degrades gracefully: direct filters, AI
//! interpreted free text, fallback queries, country-only, then trending.

pub mod ai;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod models;
pub mod search;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{AppError, Result};
pub use service::ListingService;
