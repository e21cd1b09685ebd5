//! Source and aggregation metrics

use super::feed_metric;
use crate::domain::SourceType;

pub struct FeedMetrics;

impl FeedMetrics {
    /// Record a successful source retrieval
    pub fn record_request_success(source: SourceType, duration_secs: f64, records: usize) {
        ::metrics::counter!(
            feed_metric!(counter, "source", "requests"),
            "source" => source.as_str(),
            "outcome" => "success"
        )
        .increment(1);
        ::metrics::counter!(feed_metric!(counter, "source", "records"), "source" => source.as_str())
            .increment(records as u64);
        Self::record_request_duration(source, duration_secs);
    }

    /// Record a failed source retrieval; `kind` is the failure label
    pub fn record_request_error(source: SourceType, kind: &'static str, duration_secs: f64) {
        ::metrics::counter!(
            feed_metric!(counter, "source", "requests"),
            "source" => source.as_str(),
            "outcome" => kind
        )
        .increment(1);
        Self::record_request_duration(source, duration_secs);
    }

    fn record_request_duration(source: SourceType, duration_secs: f64) {
        ::metrics::histogram!(
            feed_metric!(histogram, "source", "request_duration_seconds"),
            "source" => source.as_str()
        )
        .record(duration_secs);
    }

    pub fn record_run_success(records: usize, duration_secs: f64) {
        ::metrics::counter!(feed_metric!(counter, "aggregation", "runs"), "outcome" => "success")
            .increment(1);
        ::metrics::histogram!(feed_metric!(histogram, "aggregation", "records")).record(records as f64);
        ::metrics::histogram!(feed_metric!(histogram, "aggregation", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_run_failure(duration_secs: f64) {
        ::metrics::counter!(feed_metric!(counter, "aggregation", "runs"), "outcome" => "failure")
            .increment(1);
        ::metrics::histogram!(feed_metric!(histogram, "aggregation", "duration_seconds"))
            .record(duration_secs);
    }

    /// Attach help text so the exporter shows it before first use
    pub(crate) fn describe() {
        ::metrics::describe_counter!(
            feed_metric!(counter, "source", "requests"),
            "Source retrievals by source and outcome"
        );
        ::metrics::describe_counter!(
            feed_metric!(counter, "source", "records"),
            "Raw records returned per source"
        );
        ::metrics::describe_histogram!(
            feed_metric!(histogram, "source", "request_duration_seconds"),
            ::metrics::Unit::Seconds,
            "Wall time of one source retrieval"
        );
        ::metrics::describe_counter!(
            feed_metric!(counter, "aggregation", "runs"),
            "Aggregation runs by outcome"
        );
        ::metrics::describe_histogram!(
            feed_metric!(histogram, "aggregation", "records"),
            "Merged records per successful run"
        );
        ::metrics::describe_histogram!(
            feed_metric!(histogram, "aggregation", "duration_seconds"),
            ::metrics::Unit::Seconds,
            "Wall time of one aggregation run"
        );
    }
}
