use super::{SourceClient, SourceEndpoints};
use crate::domain::{RawRecord, SourceType};
use crate::error::{Result, SourceUnavailable};
use crate::metrics::FeedMetrics;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Source client backed by a single shared reqwest client.
pub struct HttpSourceClient {
    client: reqwest::Client,
    endpoints: SourceEndpoints,
}

impl HttpSourceClient {
    pub fn new(endpoints: SourceEndpoints, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &SourceEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    #[instrument(skip(self))]
    async fn fetch(&self, source: SourceType) -> std::result::Result<Vec<RawRecord>, SourceUnavailable> {
        let url = self.endpoints.url_for(source);
        debug!("HTTP GET request to: {}", url);
        let started = Instant::now();

        let result = get_records(&self.client, source, &url).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(records) => {
                info!("Fetched {} records from {} in {:.3}s", records.len(), url, elapsed);
                FeedMetrics::record_request_success(source, elapsed, records.len());
            }
            Err(e) => {
                warn!("Source {} unavailable: {}", source, e);
                FeedMetrics::record_request_error(source, e.kind(), elapsed);
            }
        }
        result
    }
}

async fn get_records(
    client: &reqwest::Client,
    source: SourceType,
    url: &str,
) -> std::result::Result<Vec<RawRecord>, SourceUnavailable> {
    let resp = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| SourceUnavailable::Network {
            origin: source,
            message: e.to_string(),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SourceUnavailable::Status {
            origin: source,
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| SourceUnavailable::Network {
        origin: source,
        message: e.to_string(),
    })?;

    parse_records(source, &bytes)
}

/// The body must be a JSON array whose every element is an object.
pub(crate) fn parse_records(
    source: SourceType,
    bytes: &[u8],
) -> std::result::Result<Vec<RawRecord>, SourceUnavailable> {
    let malformed = |message: String| SourceUnavailable::Malformed {
        origin: source,
        message,
    };

    let body: Value = serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
    let Value::Array(items) = body else {
        return Err(malformed("expected a JSON array of records".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(malformed(format!("record {} is not a JSON object", index))),
        })
        .collect()
}
