//! Unified error types for overcast.

use tokio_rusqlite::rusqlite;

/// Unified error types for the overcast cache proxy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty manifest).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Store backend unreachable or failed mid-operation.
    #[error("STORAGE_UNAVAILABLE: {0}")]
    StorageUnavailable(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// One or more core-asset fetches failed during installation.
    #[error("SEED_INCOMPLETE: {0}")]
    SeedIncomplete(String),

    /// Network fetch failed with no cached fallback.
    #[error("UNREACHABLE: {0}")]
    Unreachable(String),

    /// No generation with the given name. Internal signal, not a
    /// caller-visible lookup failure.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Response body exceeded the configured size cap.
    #[error("RESPONSE_TOO_LARGE: {0}")]
    TooLarge(String),

    /// Operation attempted in the wrong proxy lifecycle state.
    #[error("LIFECYCLE: {0}")]
    Lifecycle(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => {
                Error::StorageUnavailable(tokio_rusqlite::Error::ConnectionClosed)
            }
            tokio_rusqlite::Error::Close(c) => Error::StorageUnavailable(tokio_rusqlite::Error::Close(c)),
            _ => Error::StorageUnavailable(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::StorageUnavailable(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::StorageUnavailable(tokio_rusqlite::Error::Error(err))
    }
}
