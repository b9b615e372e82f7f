//! Transport seam for follow-up page requests.

use async_trait::async_trait;

use crate::errors::SpiderError;
use crate::models::PageRequest;

#[cfg(feature = "http")]
use crate::config::SpiderConfig;
#[cfg(feature = "http")]
use crate::errors::{STAGE_PAGE_REQUEST, STAGE_PAGE_RESPONSE};

/// Protocol for issuing follow-up page requests outside the proxy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Sends the request and returns the full response body.
    async fn fetch(&self, request: &PageRequest) -> Result<String, SpiderError>;
}

/// `reqwest`-backed fetcher.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpPageFetcher {
    /// Creates a fetcher honoring the configured timeout, if any.
    pub fn new(config: &SpiderConfig) -> Result<Self, SpiderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout()? {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| SpiderError::transport(STAGE_PAGE_REQUEST, err))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<String, SpiderError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| SpiderError::transport(STAGE_PAGE_RESPONSE, err))?;

        // Status codes are not inspected; an error page simply yields no matches.
        response
            .text()
            .await
            .map_err(|err| SpiderError::transport(STAGE_PAGE_RESPONSE, err))
    }
}
