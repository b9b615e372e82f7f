//! Structured records produced by extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::identity::gen_id;

/// One article surfaced on a listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    /// Content id derived from the URL, if it has a parsable query.
    pub identifier: Option<String>,
    /// Absolute article URL.
    pub url: String,
}

impl LinkRecord {
    /// Creates a link record and derives its identifier.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            identifier: gen_id(&url).ok(),
            url,
        }
    }
}

/// Reads a counter, treating `null` like a missing field.
fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Engagement statistics of one article.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metric {
    /// Number of reads.
    #[serde(rename = "read_num", default, deserialize_with = "null_as_zero")]
    pub read_count: i64,
    /// Number of likes.
    #[serde(rename = "like_num", default, deserialize_with = "null_as_zero")]
    pub like_count: i64,
    /// Number of verified reads.
    #[serde(rename = "real_read_num", default, deserialize_with = "null_as_zero")]
    pub verified_read_count: i64,
}

impl Metric {
    /// Whether every counter is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of a metric beacon response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricEnvelope {
    /// The statistics block; missing means all zero.
    #[serde(default)]
    pub appmsgstat: Option<Metric>,
}

impl MetricEnvelope {
    /// Decodes a metric beacon body.
    pub fn decode(body: &[u8]) -> Result<Metric, serde_json::Error> {
        let envelope: Self = serde_json::from_slice(body)?;
        Ok(envelope.appmsgstat.unwrap_or_default())
    }
}

/// One article's content plus, once known, its metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailRecord {
    /// Content id, `gen_id(url)`.
    pub id: String,
    /// Article URL.
    pub url: String,
    /// Raw response body of the detail page; empty for metric-only records.
    #[serde(default)]
    pub body: Vec<u8>,
    /// Engagement metrics, filled in by a metric response.
    #[serde(default)]
    pub metrics: Option<Metric>,
    /// When the record was captured.
    pub captured_at: DateTime<Utc>,
}

impl DetailRecord {
    /// Creates a detail record without metrics.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            body,
            metrics: None,
            captured_at: Utc::now(),
        }
    }

    /// Sets the metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metric) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("id".to_string(), serde_json::json!(self.id));
        dict.insert("url".to_string(), serde_json::json!(self.url));
        dict.insert("body_len".to_string(), serde_json::json!(self.body.len()));
        if let Some(ref m) = self.metrics {
            dict.insert("metrics".to_string(), serde_json::json!(m));
        }
        dict.insert(
            "captured_at".to_string(),
            serde_json::json!(self.captured_at.to_rfc3339()),
        );
        dict
    }
}
