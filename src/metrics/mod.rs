//! Metrics for the activity feed
//!
//! Recording goes through the `metrics` facade, so every call is a no-op until
//! a recorder is installed. `init_metrics` installs the Prometheus exporter when
//! the binary is given a listen address.

pub mod sources;

pub use sources::FeedMetrics;

use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Metric names follow `feed_{area}_{name}` (counters get a `_total` suffix).
macro_rules! feed_metric {
    (counter, $area:literal, $name:literal) => {
        concat!("feed_", $area, "_", $name, "_total")
    };
    (histogram, $area:literal, $name:literal) => {
        concat!("feed_", $area, "_", $name)
    };
}

pub(crate) use feed_metric;

/// Install the Prometheus recorder and spawn its HTTP listener on `addr`.
///
/// Must run inside a tokio runtime. Idempotent; later calls return `false`
/// without touching the recorder.
pub fn init_metrics(addr: SocketAddr) -> bool {
    if HANDLE.get().is_some() {
        return false;
    }

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    let (recorder, exporter) = match builder.build() {
        Ok(parts) => parts,
        Err(e) => {
            warn!("Failed to build Prometheus exporter: {}", e);
            return false;
        }
    };

    let handle = recorder.handle();
    if let Err(e) = ::metrics::set_global_recorder(recorder) {
        warn!("Failed to install Prometheus recorder: {}", e);
        return false;
    }
    if HANDLE.set(handle).is_err() {
        warn!("Prometheus handle already stored");
        return false;
    }

    tokio::spawn(async move {
        if exporter.await.is_err() {
            warn!("Prometheus exporter stopped");
        }
    });

    FeedMetrics::describe();
    info!("Prometheus exporter listening at http://{}/metrics", addr);
    true
}
