//! Error handling for catalog API operations.

use http::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Every failed request is reported as [`CatalogClientError::FetchFailed`],
/// whether the transport failed, the server answered with a non-success
/// status, or the body could not be decoded.
/// Callers should not branch on the cause; it is kept as a source
/// for logging only.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("failed to fetch {endpoint}")]
    FetchFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}", .0)]
    Other(String),
}

impl CatalogClientError {
    /// Whether the remote reported that the requested entity or page does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            CatalogClientError::FetchFailed { source, .. } => {
                source.status() == Some(StatusCode::NOT_FOUND)
            },
            CatalogClientError::Other(_) => false,
        }
    }

    /// The endpoint that failed, if the error came from a request.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            CatalogClientError::FetchFailed { endpoint, .. } => Some(endpoint),
            CatalogClientError::Other(_) => None,
        }
    }
}
