use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The target collection cannot perform an edit that reconciliation requires.
    #[error("the reconcile target does not support {capability}")]
    InvariantViolation {
        /// The missing capability, e.g. `swap` or `push_front`.
        capability: &'static str,
    },

    /// The target collection rejected an edit.
    #[error(transparent)]
    Collection(#[from] observable::Error),
}

/// A specialized `Result` type for reconciliation, returning the crate's [`Error`] type as the
/// error value.
pub type Result<T> = std::result::Result<T, Error>;
