//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionInvariantError;
use storage::store::StorageError;

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("provider rejected the request (response_code {code})")]
    Api { code: u8 },
    #[error("provider returned no questions")]
    Empty,
    #[error("invalid provider base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors decoding a persisted session snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invariant(#[from] SessionInvariantError),
}

/// Errors emitted by the session driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by runtime handles once the event loop has ended.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("quiz runtime has shut down")]
    Closed,
}
