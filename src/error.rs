use crate::domain::SourceType;
use thiserror::Error;

/// A single source retrieval failed. Carries the source it came from as `origin`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceUnavailable {
    #[error("{origin} source request failed: {message}")]
    Network { origin: SourceType, message: String },

    #[error("{origin} source returned HTTP status {status}")]
    Status { origin: SourceType, status: u16 },

    #[error("{origin} source returned a malformed body: {message}")]
    Malformed { origin: SourceType, message: String },
}

impl SourceUnavailable {
    pub fn origin(&self) -> SourceType {
        match self {
            SourceUnavailable::Network { origin, .. }
            | SourceUnavailable::Status { origin, .. }
            | SourceUnavailable::Malformed { origin, .. } => *origin,
        }
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            SourceUnavailable::Network { .. } => "network",
            SourceUnavailable::Status { .. } => "status",
            SourceUnavailable::Malformed { .. } => "malformed",
        }
    }
}

/// Failure of a whole aggregation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("aggregation failed: {0}")]
    Source(#[from] SourceUnavailable),
}

impl AggregationError {
    pub fn source_unavailable(&self) -> &SourceUnavailable {
        match self {
            AggregationError::Source(inner) => inner,
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_error_exposes_first_failure() {
        let err: AggregationError = SourceUnavailable::Status {
            origin: SourceType::Whatsapp,
            status: 503,
        }
        .into();

        assert_eq!(err.source_unavailable().origin(), SourceType::Whatsapp);
        assert_eq!(err.source_unavailable().kind(), "status");
        assert_eq!(
            err.to_string(),
            "aggregation failed: whatsapp source returned HTTP status 503"
        );
    }

    #[test]
    fn test_feed_error_wraps_toml_failures() {
        let err: FeedError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, FeedError::Toml(_)));
    }
}
