//! Source clients: one network retrieval per call, no retry.

mod http_client;

pub use http_client::HttpSourceClient;

use crate::domain::{RawRecord, SourceType};
use crate::error::SourceUnavailable;
use async_trait::async_trait;
use std::collections::HashMap;

/// Port every source backend is reached through.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Perform exactly one retrieval for `source`.
    async fn fetch(&self, source: SourceType) -> Result<Vec<RawRecord>, SourceUnavailable>;
}

/// Where each source lives: a base URL plus a path per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    base_url: String,
    paths: HashMap<SourceType, String>,
}

impl SourceEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            paths: HashMap::new(),
        }
    }

    pub fn with_path(mut self, source: SourceType, path: impl Into<String>) -> Self {
        self.paths.insert(source, path.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `source`, with exactly one `/` between base and path.
    pub fn url_for(&self, source: SourceType) -> String {
        let path = self
            .paths
            .get(&source)
            .cloned()
            .unwrap_or_else(|| source.default_path());
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let endpoints = SourceEndpoints::new("http://10.0.0.2:8081");
        assert_eq!(endpoints.url_for(SourceType::Email), "http://10.0.0.2:8081/email");
        assert_eq!(endpoints.url_for(SourceType::Whatsapp), "http://10.0.0.2:8081/whatsapp");
        assert_eq!(endpoints.url_for(SourceType::Meeting), "http://10.0.0.2:8081/meeting");
    }

    #[test]
    fn test_slashes_are_normalized() {
        let endpoints = SourceEndpoints::new("http://localhost:8081/api/")
            .with_path(SourceType::Meeting, "/v2/meetings")
            .with_path(SourceType::Email, "inbox");

        assert_eq!(
            endpoints.url_for(SourceType::Meeting),
            "http://localhost:8081/api/v2/meetings"
        );
        assert_eq!(endpoints.url_for(SourceType::Email), "http://localhost:8081/api/inbox");
        assert_eq!(
            endpoints.url_for(SourceType::Whatsapp),
            "http://localhost:8081/api/whatsapp"
        );
    }
}
