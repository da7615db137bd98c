use thiserror::Error;

/// Errors returned by the optimizer and path clients.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered 429; callers should back off rather than retry
    /// immediately.
    #[error("rate limited by routing service (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The service answered 2xx but reported an application-level error
    /// (e.g. an OSRM `code` other than `Ok`, or no routes).
    #[error("routing service error: {0}")]
    Api(String),

    /// The optimizer's `order` was not a permutation of the input indices.
    #[error("invalid optimizer order: {reason}")]
    InvalidOrder { reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
