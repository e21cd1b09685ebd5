//! Fan-out / fan-in over every configured source.
//!
//! One `load_all` call is one aggregation run: all retrievals start together,
//! the run waits for every one of them, and any single failure fails the whole
//! run. Records are published only after the run settles.
//!
//! Overlapping runs are not coordinated here. Both execute, the one that
//! completes last publishes last, and the shared `loading` cell is cleared by
//! whichever finishes first.

use crate::domain::{ActivityRecord, RawRecord, SourceType};
use crate::error::{AggregationError, SourceUnavailable};
use crate::metrics::FeedMetrics;
use crate::sources::SourceClient;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub struct Aggregator {
    client: Arc<dyn SourceClient>,
    sources: Vec<SourceType>,
    loading: watch::Sender<bool>,
    records: RwLock<Vec<ActivityRecord>>,
    last_error: RwLock<Option<String>>,
}

impl Aggregator {
    /// `sources` is the merge order of the feed.
    pub fn new(client: Arc<dyn SourceClient>, sources: Vec<SourceType>) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            client,
            sources,
            loading,
            records: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
        }
    }

    /// Email, then WhatsApp, then meetings.
    pub fn with_default_sources(client: Arc<dyn SourceClient>) -> Self {
        Self::new(client, SourceType::ALL.to_vec())
    }

    pub fn sources(&self) -> &[SourceType] {
        &self.sources
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Every change of the loading flag is visible to subscribers.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Records published by the last settled run; empty after a failure.
    pub async fn records(&self) -> Vec<ActivityRecord> {
        self.records.read().await.clone()
    }

    /// Message of the last failed run, cleared by a successful one.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn load_all(&self) -> Result<Vec<ActivityRecord>, AggregationError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("aggregation_run", run_id = %run_id);
        self.run().instrument(span).await
    }

    async fn run(&self) -> Result<Vec<ActivityRecord>, AggregationError> {
        let _loading = LoadingGuard::raise(&self.loading);
        let started = Instant::now();
        info!("Fetching {} sources", self.sources.len());

        let fetches = self.sources.iter().map(|&source| {
            let client = Arc::clone(&self.client);
            async move { (source, client.fetch(source).await) }
        });
        let settled = join_all(fetches).await;
        let elapsed = started.elapsed().as_secs_f64();

        match merge(settled) {
            Ok(merged) => {
                info!("Merged {} records in {:.3}s", merged.len(), elapsed);
                FeedMetrics::record_run_success(merged.len(), elapsed);
                *self.records.write().await = merged.clone();
                *self.last_error.write().await = None;
                Ok(merged)
            }
            Err(e) => {
                error!("Error fetching data: {}", e);
                FeedMetrics::record_run_failure(elapsed);
                self.records.write().await.clear();
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Tag and concatenate settled retrievals in the order given. The first
/// failure in that order fails the whole merge.
fn merge(
    settled: Vec<(SourceType, Result<Vec<RawRecord>, SourceUnavailable>)>,
) -> Result<Vec<ActivityRecord>, AggregationError> {
    let mut merged = Vec::new();
    for (source, result) in settled {
        let raw = result?;
        merged.extend(raw.into_iter().map(|r| ActivityRecord::from_raw(source, r)));
    }
    Ok(merged)
}

/// Holds `loading` high for its lifetime.
struct LoadingGuard<'a> {
    loading: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    fn raise(loading: &'a watch::Sender<bool>) -> Self {
        loading.send_replace(true);
        Self { loading }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.send_replace(false);
    }
}
