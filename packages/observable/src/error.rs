use thiserror::Error;

/// Errors that can occur when accessing or mutating an observable collection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The index or key does not address an item of the collection.
    #[error("{what} not found")]
    NotFound {
        /// Describes what was looked up, e.g. `index 7 of 3 items` or `key "x"`.
        what: String,
    },
}

impl Error {
    pub(crate) fn index(index: usize, len: usize) -> Self {
        Self::NotFound {
            what: format!("index {index} of {len} items"),
        }
    }

    pub(crate) fn key(key: &impl std::fmt::Debug) -> Self {
        Self::NotFound {
            what: format!("key {key:?}"),
        }
    }

    pub(crate) fn item() -> Self {
        Self::NotFound {
            what: "item".to_string(),
        }
    }
}

/// A specialized `Result` type for collection operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
