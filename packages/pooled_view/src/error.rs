use thiserror::Error;

/// Errors that can occur when attaching or detaching a view.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The widget pool could not make or take back a widget.
    #[error(transparent)]
    Pool(#[from] recycle_pool::Error),
}

/// A specialized `Result` type for view operations, returning the crate's [`Error`] type as the
/// error value.
pub type Result<T> = std::result::Result<T, Error>;
