use thiserror::Error;

/// Failures surfaced to callers of the search pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("geocoding failed: {0}")]
    GeocodingFailed(String),

    #[error("routing failed: {0}")]
    RoutingFailed(String),

    #[error("listing fetch failed: {0}")]
    FetchFailed(String),

    /// A required credential (e.g. `ORS_API_KEY`) is not configured.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

/// Who is at fault for a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ClientInput,
    Upstream,
    Configuration,
}

impl SearchError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRequest(_) => ErrorClass::ClientInput,
            Self::GeocodingFailed(_) | Self::RoutingFailed(_) | Self::FetchFailed(_) => {
                ErrorClass::Upstream
            }
            Self::ConfigurationMissing(_) => ErrorClass::Configuration,
        }
    }

    /// Stable machine-readable code, e.g. `"geocoding_failed"`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "validation_error",
            Self::GeocodingFailed(_) => "geocoding_failed",
            Self::RoutingFailed(_) => "routing_failed",
            Self::FetchFailed(_) => "fetch_failed",
            Self::ConfigurationMissing(_) => "configuration_missing",
        }
    }
}
