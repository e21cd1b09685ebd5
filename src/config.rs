use crate::domain::SourceType;
use crate::error::{FeedError, Result};
use crate::sources::SourceEndpoints;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "activity_feed.toml";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const BASE_URL_ENV: &str = "ACTIVITY_FEED_BASE_URL";
pub const TIMEOUT_ENV: &str = "ACTIVITY_FEED_TIMEOUT_SECONDS";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EndpointsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// `0` leaves the HTTP client without a request timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Per-source path overrides, keyed by source name
    #[serde(default)]
    pub paths: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Merge order of the feed
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceType>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_sources() -> Vec<SourceType> {
    SourceType::ALL.to_vec()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            paths: HashMap::new(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

impl Config {
    /// Load configuration, then apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one, `activity_feed.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FeedError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// `lookup` resolves an environment variable name to its value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoints.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            let seconds = raw.trim().parse::<u64>().map_err(|_| {
                FeedError::Config(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, raw))
            })?;
            self.endpoints.timeout_seconds = seconds;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.endpoints.base_url.trim();
        if base_url.is_empty() {
            return Err(FeedError::Config("endpoints.base_url must not be empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FeedError::Config(format!(
                "endpoints.base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        self.path_overrides()?;

        if self.feed.sources.is_empty() {
            return Err(FeedError::Config("feed.sources must list at least one source".to_string()));
        }
        let mut seen = HashSet::new();
        for source in &self.feed.sources {
            if !seen.insert(source) {
                return Err(FeedError::Config(format!("feed.sources lists '{}' more than once", source)));
            }
        }
        Ok(())
    }

    fn path_overrides(&self) -> Result<Vec<(SourceType, &str)>> {
        self.endpoints
            .paths
            .iter()
            .map(|(key, path)| {
                let source = key.parse::<SourceType>().map_err(|_| {
                    FeedError::Config(format!("endpoints.paths has unknown source '{}'", key))
                })?;
                Ok((source, path.as_str()))
            })
            .collect()
    }

    pub fn endpoints(&self) -> Result<SourceEndpoints> {
        let endpoints = self
            .path_overrides()?
            .into_iter()
            .fold(SourceEndpoints::new(self.endpoints.base_url.trim()), |endpoints, (source, path)| {
                endpoints.with_path(source, path)
            });
        Ok(endpoints)
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.endpoints.timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoints.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.feed.sources, SourceType::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml(
            r#"
            [endpoints]
            base_url = "https://feed.example.com/api/"
            timeout_seconds = 5

            [endpoints.paths]
            meeting = "/calendar/meetings"

            [feed]
            sources = ["meeting", "email"]
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.feed.sources, vec![SourceType::Meeting, SourceType::Email]);
        let endpoints = config.endpoints().unwrap();
        assert_eq!(
            endpoints.url_for(SourceType::Meeting),
            "https://feed.example.com/api/calendar/meetings"
        );
        assert_eq!(
            endpoints.url_for(SourceType::Email),
            "https://feed.example.com/api/email"
        );
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = Config::from_toml("[feed]\nsources = [\"sms\"]\n").unwrap_err();
        assert!(matches!(err, FeedError::Toml(_)));

        let config = Config::from_toml("[endpoints.paths]\nsms = \"/sms\"\n").unwrap();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));
        assert!(config.endpoints().is_err());
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = Config::from_toml("[endpoints]\ntimeout_seconds = 0\n").unwrap();
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.endpoints.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));

        let mut config = Config::default();
        config.feed.sources.clear();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));

        let mut config = Config::default();
        config.feed.sources = vec![SourceType::Email, SourceType::Email];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| match key {
                BASE_URL_ENV => Some(" http://10.76.35.117:8081 ".to_string()),
                TIMEOUT_ENV => Some("12".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.endpoints.base_url, "http://10.76.35.117:8081");
        assert_eq!(config.timeout(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_bad_timeout_override_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }
}
