pub mod aggregator;
pub mod config;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod metrics;
pub mod search;
pub mod sources;

pub use aggregator::Aggregator;
pub use domain::{ActivityRecord, Category, RawRecord, SourceType};
pub use error::{AggregationError, FeedError, SourceUnavailable};
pub use search::{visible, Filter};
pub use sources::{HttpSourceClient, SourceClient, SourceEndpoints};
