//! Error types for the wxspider engine.
//!
//! Every variant carries a short stage label ("Failed parse main",
//! "Failed get page url", ...) so callers can tell where extraction stopped
//! without looking at internals.

use std::collections::HashMap;
use thiserror::Error;

/// Stage label for a listing body without any message-list line.
pub const STAGE_PARSE_MAIN: &str = "Failed parse main";
/// Stage label for a listing payload without article URLs.
pub const STAGE_MAIN_URL: &str = "Failed find url in main";
/// Stage label for a listing payload without cursor ids.
pub const STAGE_MAIN_ID: &str = "Failed find id in main";
/// Stage label for a follow-up request that could not be built.
pub const STAGE_PAGE_REQUEST: &str = "Failed new page request";
/// Stage label for a follow-up request that failed in transport.
pub const STAGE_PAGE_RESPONSE: &str = "Failed get page response";
/// Stage label for a follow-up page without article URLs.
pub const STAGE_PAGE_URL: &str = "Failed get page url";
/// Stage label for a follow-up page without cursor ids.
pub const STAGE_PAGE_ID: &str = "Failed get page id";
/// Stage label for a URL that could not be parsed as a request URI.
pub const STAGE_PARSE_URL: &str = "Failed parse url";
/// Stage label for a metric id that could not be derived.
pub const STAGE_METRIC_ID: &str = "Failed derive metric id";
/// Stage label for a metric body that could not be decoded.
pub const STAGE_METRIC_DECODE: &str = "Failed decode metrics";
/// Stage label for a configuration value the engine cannot use.
pub const STAGE_CONFIG: &str = "Failed apply config";

/// The main error type for wxspider operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpiderError {
    /// The message-list marker line never appeared in a listing body.
    #[error("{stage}: MsgLists not found")]
    NoPayloadFound {
        /// The stage label.
        stage: String,
    },

    /// Normalization succeeded but no article URL matched.
    #[error("{stage}: MsgLists not found (no article url)")]
    NoUrlMatch {
        /// The stage label.
        stage: String,
    },

    /// Normalization succeeded but no cursor id matched.
    #[error("{stage}: MsgLists not found (no cursor id)")]
    NoIdMatch {
        /// The stage label.
        stage: String,
    },

    /// A follow-up HTTP call failed.
    #[error("{stage}: {reason}")]
    Transport {
        /// The stage label.
        stage: String,
        /// The underlying transport error.
        reason: String,
    },

    /// A request or referer URL could not be parsed.
    #[error("{stage}: invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The stage label.
        stage: String,
        /// The offending URL.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A metric body could not be decoded.
    #[error("{stage}: {reason}")]
    Decode {
        /// The stage label.
        stage: String,
        /// The decoder error.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("{stage}: invalid '{field}': {reason}")]
    InvalidConfig {
        /// The stage label.
        stage: String,
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl SpiderError {
    /// Creates a payload-not-found error.
    #[must_use]
    pub fn no_payload(stage: impl Into<String>) -> Self {
        Self::NoPayloadFound {
            stage: stage.into(),
        }
    }

    /// Creates a no-url-match error.
    #[must_use]
    pub fn no_url(stage: impl Into<String>) -> Self {
        Self::NoUrlMatch {
            stage: stage.into(),
        }
    }

    /// Creates a no-id-match error.
    #[must_use]
    pub fn no_id(stage: impl Into<String>) -> Self {
        Self::NoIdMatch {
            stage: stage.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(stage: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(
        stage: impl Into<String>,
        url: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidUrl {
            stage: stage.into(),
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(stage: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidConfig {
            stage: STAGE_CONFIG.to_string(),
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the stage label.
    #[must_use]
    pub fn stage(&self) -> &str {
        match self {
            Self::NoPayloadFound { stage }
            | Self::NoUrlMatch { stage }
            | Self::NoIdMatch { stage }
            | Self::Transport { stage, .. }
            | Self::InvalidUrl { stage, .. }
            | Self::Decode { stage, .. }
            | Self::InvalidConfig { stage, .. } => stage,
        }
    }

    /// Replaces the stage label, keeping the root cause.
    #[must_use]
    pub fn with_stage(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        match &mut self {
            Self::NoPayloadFound { stage }
            | Self::NoUrlMatch { stage }
            | Self::NoIdMatch { stage }
            | Self::Transport { stage, .. }
            | Self::InvalidUrl { stage, .. }
            | Self::Decode { stage, .. }
            | Self::InvalidConfig { stage, .. } => *stage = label,
        }
        self
    }

    /// Whether the error means "the message list had nothing to extract".
    #[must_use]
    pub fn is_msg_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoPayloadFound { .. } | Self::NoUrlMatch { .. } | Self::NoIdMatch { .. }
        )
    }

    /// Returns a short machine-readable kind name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoPayloadFound { .. } => "NoPayloadFound",
            Self::NoUrlMatch { .. } => "NoUrlMatch",
            Self::NoIdMatch { .. } => "NoIdMatch",
            Self::Transport { .. } => "TransportFailure",
            Self::InvalidUrl { .. } => "InvalidUrl",
            Self::Decode { .. } => "DecodeFailure",
            Self::InvalidConfig { .. } => "InvalidConfig",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("stage".to_string(), serde_json::json!(self.stage()));

        match self {
            Self::Transport { reason, .. } | Self::Decode { reason, .. } => {
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::InvalidUrl { url, reason, .. } => {
                map.insert("url".to_string(), serde_json::json!(url));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::InvalidConfig { field, reason, .. } => {
                map.insert("field".to_string(), serde_json::json!(field));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::NoPayloadFound { .. } | Self::NoUrlMatch { .. } | Self::NoIdMatch { .. } => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}
