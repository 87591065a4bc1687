use geotrace_core::SubjectError;
use thiserror::Error;

/// Errors surfaced by geo-locators.
#[derive(Debug, Error)]
pub enum LocateError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider answered, but reported a failure in its response body.
    #[error("{provider} API error: {message}")]
    ApiError {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} requires an API key but none is configured")]
    MissingApiKey { provider: &'static str },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The local geo database could not be opened or read.
    #[error("geo database {path}: {reason}")]
    Database { path: String, reason: String },

    /// Every candidate of a delegating locator reported itself unavailable.
    #[error("no geo-locator is available")]
    NoLocatorAvailable,

    #[error("failed to persist location cache to {target}: {source}")]
    CachePersist {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode location cache: {0}")]
    CacheEncode(#[source] serde_json::Error),
}

/// Reasons a persisted cache could not be read. Never surfaced from `locate`.
#[derive(Debug, Error)]
pub enum CacheLoadError {
    #[error("I/O error reading cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid cached subject: {0}")]
    Subject(#[from] SubjectError),
}
