use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given id. `entity` is the capitalized record kind
    /// ("Task", "Workspace", ...), ready for user-facing messages.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record kind.
        entity: &'static str,
        /// Id that missed.
        id: String,
    },

    /// Backend fault (I/O, SQL, corruption).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Not-found constructor.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
