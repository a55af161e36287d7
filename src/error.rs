use reqwest::StatusCode;
use thiserror::Error;

/// Rejections raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The term was empty once surrounding whitespace was removed.
    #[error("search term is empty")]
    EmptyTerm,

    /// The media selector named something outside the supported set.
    #[error("unknown media type: {0}")]
    UnknownMedia(String),
}

/// Failures of a single search request against the media API.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The configured endpoint could not be combined with the query parameters.
    #[error("invalid search endpoint: {0}")]
    Endpoint(String),

    /// Connection, TLS or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(StatusCode),

    /// The body was not the expected JSON document.
    #[error("malformed search response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Precondition violations on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("slot index {index} out of range (grid has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },
}
