use thiserror::Error;

/// Errors that can occur when making or recycling pooled objects.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The type was never registered with the pool, so the pool does not know how to
    /// construct it or how many released instances to keep.
    #[error("type '{type_name}' is not registered with the pool")]
    UnregisteredType {
        /// Name of the type that was requested.
        type_name: &'static str,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
