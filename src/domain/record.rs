use super::SourceType;
use crate::error::FeedError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One JSON object exactly as a source returned it.
pub type RawRecord = Map<String, Value>;

const NAME_KEY: &str = "name";
const DETAILS_KEY: &str = "details";
const TIMESTAMP_KEY: &str = "timestamp";
const SOURCE_TYPE_KEY: &str = "source_type";

/// Unified record shape produced by the aggregator.
///
/// `source_type` is assigned from the client that produced the record and is
/// never read from the payload. Fields other than the four known ones are kept
/// in `extra` untouched.
///
/// Deserializing reads the flat serialized shape back through the same
/// extraction as `from_raw`, with `source_type` taken from the object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActivityRecord {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            name: None,
            details: None,
            timestamp: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Tag a raw payload object with the source that produced it.
    pub fn from_raw(source_type: SourceType, mut raw: RawRecord) -> Self {
        if raw.remove(SOURCE_TYPE_KEY).is_some() {
            debug!(source = %source_type, "Discarding payload-supplied source_type");
        }

        let name = take_string(&mut raw, NAME_KEY);
        let details = take_string(&mut raw, DETAILS_KEY);
        let timestamp = match raw.get(TIMESTAMP_KEY).and_then(parse_timestamp) {
            Some(ts) => {
                raw.remove(TIMESTAMP_KEY);
                Some(ts)
            }
            None => None,
        };

        Self {
            source_type,
            name,
            details,
            timestamp,
            extra: raw,
        }
    }
}

impl TryFrom<RawRecord> for ActivityRecord {
    type Error = FeedError;

    /// Rebuild a record from its flat form; `source_type` must be present.
    fn try_from(mut raw: RawRecord) -> Result<Self, Self::Error> {
        let source_type = match raw.remove(SOURCE_TYPE_KEY) {
            Some(Value::String(name)) => name.parse::<SourceType>()?,
            Some(other) => return Err(FeedError::UnknownSource(other.to_string())),
            None => return Err(FeedError::UnknownSource("missing source_type".to_string())),
        };
        Ok(Self::from_raw(source_type, raw))
    }
}

impl<'de> Deserialize<'de> for ActivityRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRecord::deserialize(deserializer)?;
        ActivityRecord::try_from(raw).map_err(de::Error::custom)
    }
}

/// Move `key` out of the map only when it holds a string.
fn take_string(raw: &mut RawRecord, key: &str) -> Option<String> {
    match raw.get(key) {
        Some(Value::String(_)) => match raw.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Epoch milliseconds (number or integer string) or an RFC 3339 string.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(millis) = s.parse::<i64>() {
                return Utc.timestamp_millis_opt(millis).single();
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}
