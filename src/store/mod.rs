pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::ListingStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}
