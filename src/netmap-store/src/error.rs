use thiserror::Error;

/// Errors a [`crate::Store`] backend can raise.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// The backend's `limit` of distinct ids was reached on insert of a new
    /// id. Updates of existing ids never raise this.
    #[error("limit exceeded")]
    LimitExceeded,

    /// An opaque backend failure (connection, serialization, etc).
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for netmap_types::NetmapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LimitExceeded => netmap_types::NetmapError::LimitExceeded,
            StoreError::Backend(msg) => netmap_types::NetmapError::Backend(msg),
        }
    }
}
