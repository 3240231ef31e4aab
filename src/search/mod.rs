pub mod filter;
pub mod orchestrator;
pub mod types;

pub use filter::{Field, Filter};
pub use orchestrator::{FallbackSearch, Resolution, SearchOutcome, TRENDING_LIMIT};
pub use types::{SearchParams, SearchRequest};
