use thiserror::Error;

/// Errors returned by geocoding and routing providers.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response with no usable result.
    #[error("{provider} found no match for {query}")]
    NoMatch {
        provider: &'static str,
        query: String,
    },

    /// Every provider in the chain failed for this text.
    #[error("geocoding failed for \"{0}\"")]
    GeocodingFailed(String),

    #[error("routing failed: {0}")]
    RoutingFailed(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
