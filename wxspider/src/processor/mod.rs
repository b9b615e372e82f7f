//! The processor trait and its default implementation.
//!
//! A proxy host owns one processor per intercepted session and hands it every
//! response it classified as a listing page, an article page or a metric
//! beacon. The processor extracts what it needs, updates its session, and
//! returns the original bytes for the host to forward.

mod base;

use async_trait::async_trait;

use crate::errors::SpiderError;
use crate::models::{InterceptedRequest, InterceptedResponse};

pub use base::BaseProcessor;

/// Response classifier and extractor.
///
/// Entry points take `&mut self`; a host drives one processor sequentially.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Handles a listing page and, if enabled, every follow-up page.
    ///
    /// Returns the response body unchanged.
    async fn process_list(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError>;

    /// Handles an article page.
    async fn process_detail(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError>;

    /// Handles a metric beacon for the article named by the `Referer` header.
    async fn process_metrics(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError>;

    /// The account to visit after `current_biz`; empty means none.
    fn next_biz(&self, _current_biz: &str) -> String {
        String::new()
    }

    /// The article to visit after `current_url`; empty means none.
    fn next_url(&self, _current_url: &str) -> String {
        String::new()
    }

    /// URL of the listing page that started the session.
    fn history_url(&self) -> &str;

    /// Prints a diagnostic dump of the collected links.
    fn output(&self);
}
