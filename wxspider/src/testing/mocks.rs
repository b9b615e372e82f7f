//! Page fetchers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::errors::{SpiderError, STAGE_PAGE_RESPONSE};
use crate::models::PageRequest;
use crate::pagination::PageFetcher;

/// A fetcher that replays a script of responses and records every request.
///
/// Once the script runs out, every further fetch fails with a transport
/// error, unless the fetcher was built with [`ScriptedFetcher::repeating`].
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<String, SpiderError>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedFetcher {
    /// Creates a fetcher that returns `script` in order.
    #[must_use]
    pub fn new(script: Vec<Result<String, SpiderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a fetcher that answers every request with `body`.
    #[must_use]
    pub fn repeating(body: impl Into<String>) -> Self {
        Self {
            fallback: Some(body.into()),
            ..Self::default()
        }
    }

    /// Queues another response.
    pub fn push(&self, response: Result<String, SpiderError>) {
        self.script.lock().push_back(response);
    }

    /// Returns the requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of fetches.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<String, SpiderError> {
        self.requests.lock().push(request.clone());

        if let Some(response) = self.script.lock().pop_front() {
            return response;
        }
        self.fallback
            .clone()
            .ok_or_else(|| SpiderError::transport(STAGE_PAGE_RESPONSE, "script exhausted"))
    }
}

/// A fetcher that always fails with a transport error.
#[derive(Debug, Clone)]
pub struct FailingFetcher {
    reason: String,
}

impl FailingFetcher {
    /// Creates a failing fetcher.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch(&self, _request: &PageRequest) -> Result<String, SpiderError> {
        Err(SpiderError::transport(STAGE_PAGE_RESPONSE, &self.reason))
    }
}
