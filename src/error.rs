use thiserror::Error;

/// Library error type for gallery operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The photo manifest could not be fetched.
    #[error("fetching photo manifest: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The photo manifest was fetched but is unusable.
    #[error("malformed photo manifest: {0}")]
    Manifest(String),
}
