use thiserror::Error;

use crate::collection::Collection;

/// Result type for snapshot loading
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised at the entity store boundary
#[derive(Error, Debug)]
pub enum ModelError {
    /// Payload was not valid JSON
    #[error("Invalid JSON for {collection}: {source}")]
    InvalidJson {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    /// Payload was neither an array nor a `{data: [...]}` envelope
    #[error("Unexpected payload for {collection}: expected an array or {{data: [...]}} envelope")]
    UnexpectedPayload { collection: Collection },

    /// A record did not match the expected shape
    #[error("Invalid record #{index} in {collection}: {source}")]
    InvalidRecord {
        collection: Collection,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record is missing its required id
    #[error("Record #{index} in {collection} has no id")]
    MissingId { collection: Collection, index: usize },

    /// The backing source failed to deliver a collection
    #[error("Failed to fetch {collection}: {message}")]
    Fetch {
        collection: Collection,
        message: String,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ModelError {
    /// Create a fetch error
    pub fn fetch(collection: Collection, message: impl Into<String>) -> Self {
        Self::Fetch {
            collection,
            message: message.into(),
        }
    }
}
