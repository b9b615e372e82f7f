//! Configuration for the extraction and pagination engine.
//!
//! The host owns loading (file, flags, env); the engine only consumes a
//! [`SpiderConfig`] handed to it at construction time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::SpiderError;

/// Listing endpoint the follow-up page requests are sent to.
pub const DEFAULT_PAGE_ENDPOINT: &str = "http://mp.weixin.qq.com/mp/profile_ext";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpiderConfig {
    /// Emit milestone logs through the logging observer.
    #[serde(default)]
    pub verbose: bool,
    /// Run the pagination driver after a listing page is parsed.
    #[serde(default)]
    pub auto_scroll: bool,
    /// Upstream response filtering hint; carried for the host, unused here.
    #[serde(default)]
    pub compress: bool,
    /// Delay between follow-up page requests in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// The `count` sent with each follow-up request.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Ceiling on follow-up page fetches per listing response.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Endpoint for follow-up page requests.
    #[serde(default = "default_page_endpoint")]
    pub page_endpoint: String,
    /// Treat a follow-up page with no urls and no ids as the end of the feed.
    #[serde(default)]
    pub empty_page_ends_pagination: bool,
    /// Optional timeout for follow-up requests in seconds.
    #[serde(default)]
    pub request_timeout_seconds: Option<f64>,
}

fn default_page_delay_ms() -> u64 {
    50
}

fn default_page_size() -> usize {
    10
}

fn default_max_pages() -> usize {
    500
}

fn default_page_endpoint() -> String {
    DEFAULT_PAGE_ENDPOINT.to_string()
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            auto_scroll: false,
            compress: false,
            page_delay_ms: default_page_delay_ms(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            page_endpoint: default_page_endpoint(),
            empty_page_ends_pagination: false,
            request_timeout_seconds: None,
        }
    }
}

impl SpiderConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON, filling in defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets verbose logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables or disables automatic pagination.
    #[must_use]
    pub fn with_auto_scroll(mut self, auto_scroll: bool) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    /// Sets the compress hint.
    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Sets the delay between follow-up pages.
    #[must_use]
    pub fn with_page_delay_ms(mut self, delay_ms: u64) -> Self {
        self.page_delay_ms = delay_ms;
        self
    }

    /// Sets the follow-up page ceiling.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the follow-up page endpoint.
    #[must_use]
    pub fn with_page_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.page_endpoint = endpoint.into();
        self
    }

    /// Lets an empty follow-up page end pagination instead of failing.
    #[must_use]
    pub fn with_empty_page_ends_pagination(mut self, enabled: bool) -> Self {
        self.empty_page_ends_pagination = enabled;
        self
    }

    /// Sets the follow-up request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, seconds: f64) -> Self {
        self.request_timeout_seconds = Some(seconds);
        self
    }

    /// Gets the page delay as Duration.
    #[must_use]
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Gets the request timeout as Duration, if one is configured.
    ///
    /// Negative, NaN and overflowing values are rejected.
    pub fn request_timeout(&self) -> Result<Option<Duration>, SpiderError> {
        self.request_timeout_seconds
            .map(|seconds| {
                Duration::try_from_secs_f64(seconds)
                    .map_err(|err| SpiderError::invalid_config("request_timeout_seconds", err))
            })
            .transpose()
    }
}
