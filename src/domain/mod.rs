//! Record model shared by the source clients, the aggregator and the search engine.

mod record;

pub use record::{ActivityRecord, RawRecord};

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one backend that provides raw activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Email,
    Whatsapp,
    Meeting,
}

impl SourceType {
    /// Every source, in the default merge order.
    pub const ALL: [SourceType; 3] = [SourceType::Email, SourceType::Whatsapp, SourceType::Meeting];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Email => "email",
            SourceType::Whatsapp => "whatsapp",
            SourceType::Meeting => "meeting",
        }
    }

    /// Default endpoint path, relative to the configured base URL
    pub fn default_path(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SourceType::ALL
            .into_iter()
            .find(|source| source.as_str() == wanted)
            .ok_or_else(|| FeedError::UnknownSource(s.to_string()))
    }
}

/// The active category selector: either everything or a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Source(SourceType),
}

impl Category {
    /// Selector choices in filter-bar order.
    pub const CHOICES: [Category; 4] = [
        Category::All,
        Category::Source(SourceType::Email),
        Category::Source(SourceType::Whatsapp),
        Category::Source(SourceType::Meeting),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Source(source) => source.as_str(),
        }
    }

    pub fn includes(&self, source: SourceType) -> bool {
        match self {
            Category::All => true,
            Category::Source(selected) => *selected == source,
        }
    }
}

impl From<SourceType> for Category {
    fn from(source: SourceType) -> Self {
        Category::Source(source)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Category::All);
        }
        s.parse::<SourceType>()
            .map(Category::Source)
            .map_err(|_| FeedError::UnknownCategory(s.to_string()))
    }
}
