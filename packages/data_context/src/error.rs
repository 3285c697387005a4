use thiserror::Error;

/// Errors that can occur when tracking, loading or saving models.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Every identifier the generator produced was already in use.
    #[error("could not generate an unused identifier in {attempts} attempts")]
    IdentifierCollision {
        /// How many identifiers were generated before giving up.
        attempts: usize,
    },

    /// No model with the identifier is tracked.
    #[error("no model with identifier '{id}' is tracked")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// A stored record could not be turned back into a model.
    #[error("record '{id}' is invalid: {problem}")]
    InvalidRecord {
        /// The key of the record in the store.
        id: String,

        /// What is wrong with the record.
        problem: String,
    },
}

impl Error {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

/// A specialized `Result` type for data context operations, returning the crate's [`Error`]
/// type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
