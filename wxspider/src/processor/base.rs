//! Default processor.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::Processor;
use crate::config::SpiderConfig;
use crate::errors::{SpiderError, STAGE_METRIC_DECODE, STAGE_METRIC_ID};
use crate::extract::{ListingScan, ParsedPage};
use crate::identity::{gen_id, gen_id_from};
use crate::models::{
    DetailRecord, InterceptedRequest, InterceptedResponse, LinkRecord, Metric, MetricEnvelope,
    ResponseKind, SessionState,
};
use crate::observability::{LoggingSpiderObserver, NoOpSpiderObserver, SpiderObserver};
use crate::pagination::{PageFetcher, PaginationDriver};

#[cfg(feature = "http")]
use crate::pagination::HttpPageFetcher;

/// Processor that keeps link records and the last detail record in memory.
pub struct BaseProcessor {
    config: SpiderConfig,
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn SpiderObserver>,
    session: SessionState,
}

impl BaseProcessor {
    /// Creates a processor that fetches follow-up pages over HTTP.
    #[cfg(feature = "http")]
    pub fn new(config: SpiderConfig) -> Result<Self, SpiderError> {
        let fetcher = HttpPageFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a processor with an explicit page fetcher.
    ///
    /// The observer logs through `tracing` when `config.verbose` is set and
    /// discards everything otherwise.
    #[must_use]
    pub fn with_fetcher(config: SpiderConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let observer: Arc<dyn SpiderObserver> = if config.verbose {
            Arc::new(LoggingSpiderObserver)
        } else {
            Arc::new(NoOpSpiderObserver)
        };
        Self {
            config,
            fetcher,
            observer,
            session: SessionState::new(),
        }
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SpiderObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SpiderConfig {
        &self.config
    }

    /// Returns the session state.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns the links collected for the current listing.
    #[must_use]
    pub fn link_records(&self) -> &[LinkRecord] {
        &self.session.link_records
    }

    /// Returns the last detail or metric record.
    #[must_use]
    pub fn detail_record(&self) -> Option<&DetailRecord> {
        self.session.detail_record.as_ref()
    }

    /// Renders the text printed by [`Processor::output`].
    #[must_use]
    pub fn report(&self) -> String {
        let mut report = format!("result => [\n{}\n]", self.session.link_urls().join(","));
        if let Some(record) = &self.session.detail_record {
            let metric = record.metrics.unwrap_or_default();
            report.push_str(&format!(
                "\ndetail => {} {} read={} like={} real_read={}",
                record.id,
                record.url,
                metric.read_count,
                metric.like_count,
                metric.verified_read_count
            ));
        }
        report
    }

    fn fail(&self, error: SpiderError) -> SpiderError {
        self.observer.on_error(self.session.session_id, &error);
        error
    }

    fn decode_metric(&self, body: &[u8]) -> Metric {
        MetricEnvelope::decode(body).unwrap_or_else(|err| {
            let error = SpiderError::decode(STAGE_METRIC_DECODE, err);
            self.observer
                .on_metric_decode_error(self.session.session_id, &error, body);
            Metric::default()
        })
    }
}

impl fmt::Debug for BaseProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseProcessor")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Processor for BaseProcessor {
    async fn process_list(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError> {
        self.session.begin_listing(request);
        debug!(
            session_id = %self.session.session_id,
            biz = %self.session.biz,
            status = response.status,
            "Running a new wechat processor"
        );

        let text = response.text();
        let scan = ListingScan::scan(&text);
        if let Some(token) = scan.token() {
            self.session.pagination_token = token.to_string();
        }

        let ParsedPage {
            links, cursor_ids, ..
        } = ParsedPage::try_from(&scan).map_err(|err| self.fail(err))?;

        let found = links.len();
        self.session.apply_page(&cursor_ids, links);
        self.observer.on_list_parsed(
            self.session.session_id,
            &self.session.biz,
            found,
            &self.session.last_cursor_id,
            self.session.offset,
        );

        if self.config.auto_scroll {
            let driver =
                PaginationDriver::new(&self.config, self.fetcher.as_ref(), self.observer.as_ref());
            if let Err(err) = driver.run(&mut self.session).await {
                return Err(self.fail(err));
            }
        }

        Ok(response.body.clone())
    }

    async fn process_detail(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError> {
        self.session.kind = Some(ResponseKind::Detail);
        self.session.current_request = Some(request.clone());
        self.session.detail_index += 1;

        let url = request.url.to_string();
        let id = gen_id_from(&request.url);
        self.observer.on_detail_captured(
            self.session.session_id,
            &id,
            &url,
            self.session.detail_index,
        );
        self.session.detail_record = Some(DetailRecord::new(id, url, response.body.clone()));

        Ok(response.body.clone())
    }

    async fn process_metrics(
        &mut self,
        request: &InterceptedRequest,
        response: &InterceptedResponse,
    ) -> Result<Vec<u8>, SpiderError> {
        self.session.kind = Some(ResponseKind::Metric);
        self.session.current_request = Some(request.clone());

        let metric = self.decode_metric(&response.body);

        let referer = request
            .referer()
            .ok_or_else(|| SpiderError::invalid_url(STAGE_METRIC_ID, "", "missing Referer header"))
            .map_err(|err| self.fail(err))?;
        let id = gen_id(referer).map_err(|err| self.fail(err.with_stage(STAGE_METRIC_ID)))?;

        let record = match self.session.detail_record.take() {
            Some(record) if record.id == id => record.with_metrics(metric),
            _ => DetailRecord::new(id, referer, Vec::new()).with_metrics(metric),
        };
        self.observer
            .on_metrics_captured(self.session.session_id, &record.id, &metric);
        self.session.detail_record = Some(record);

        Ok(response.body.clone())
    }

    fn history_url(&self) -> &str {
        &self.session.origin_url
    }

    fn output(&self) {
        println!("{}", self.report());
    }
}
