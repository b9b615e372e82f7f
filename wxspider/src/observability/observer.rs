//! Milestone callbacks for extraction and pagination.

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::SpiderError;
use crate::models::Metric;

/// Why the pagination loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationOutcome {
    /// A page came back without a cursor.
    Exhausted,
    /// The configured page ceiling was reached.
    LimitReached,
}

impl PaginationOutcome {
    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::LimitReached => "limit_reached",
        }
    }
}

/// Summary of one pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    /// Follow-up pages fetched and parsed.
    pub pages: usize,
    /// Link records appended across those pages.
    pub links_added: usize,
    /// Why the loop stopped.
    pub outcome: PaginationOutcome,
}

/// Observability callbacks, invoked at well-defined milestones only.
pub trait SpiderObserver: Send + Sync {
    /// A listing page was parsed.
    fn on_list_parsed(
        &self,
        session_id: Uuid,
        biz: &str,
        links: usize,
        cursor: &str,
        offset: usize,
    );

    /// A follow-up page was fetched and parsed.
    fn on_page_fetched(
        &self,
        session_id: Uuid,
        page: usize,
        links: usize,
        cursor: &str,
        offset: usize,
    );

    /// The pagination loop finished without error.
    fn on_pagination_finished(&self, session_id: Uuid, summary: &PaginationSummary);

    /// A detail page was captured.
    fn on_detail_captured(&self, session_id: Uuid, id: &str, url: &str, index: i64);

    /// Metrics were captured for an article.
    fn on_metrics_captured(&self, session_id: Uuid, id: &str, metric: &Metric);

    /// A metric body could not be decoded; a zero metric is used instead.
    fn on_metric_decode_error(&self, session_id: Uuid, error: &SpiderError, body: &[u8]);

    /// An entry point failed.
    fn on_error(&self, session_id: Uuid, error: &SpiderError);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSpiderObserver;

impl SpiderObserver for NoOpSpiderObserver {
    fn on_list_parsed(
        &self,
        _session_id: Uuid,
        _biz: &str,
        _links: usize,
        _cursor: &str,
        _offset: usize,
    ) {
    }

    fn on_page_fetched(
        &self,
        _session_id: Uuid,
        _page: usize,
        _links: usize,
        _cursor: &str,
        _offset: usize,
    ) {
    }
    fn on_pagination_finished(&self, _session_id: Uuid, _summary: &PaginationSummary) {}
    fn on_detail_captured(&self, _session_id: Uuid, _id: &str, _url: &str, _index: i64) {}
    fn on_metrics_captured(&self, _session_id: Uuid, _id: &str, _metric: &Metric) {}
    fn on_metric_decode_error(&self, _session_id: Uuid, _error: &SpiderError, _body: &[u8]) {}
    fn on_error(&self, _session_id: Uuid, _error: &SpiderError) {}
}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSpiderObserver;

impl SpiderObserver for LoggingSpiderObserver {
    fn on_list_parsed(
        &self,
        session_id: Uuid,
        biz: &str,
        links: usize,
        cursor: &str,
        offset: usize,
    ) {
        info!(%session_id, biz, links, cursor, offset, "Listing page parsed");
    }

    fn on_page_fetched(
        &self,
        session_id: Uuid,
        page: usize,
        links: usize,
        cursor: &str,
        offset: usize,
    ) {
        info!(%session_id, page, links, cursor, offset, "Page Get");
    }

    fn on_pagination_finished(&self, session_id: Uuid, summary: &PaginationSummary) {
        let outcome = summary.outcome.as_str();
        if summary.outcome == PaginationOutcome::LimitReached {
            warn!(
                %session_id,
                pages = summary.pages,
                links = summary.links_added,
                outcome,
                "Pagination stopped at page limit"
            );
        } else {
            info!(
                %session_id,
                pages = summary.pages,
                links = summary.links_added,
                outcome,
                "Pagination finished"
            );
        }
    }

    fn on_detail_captured(&self, session_id: Uuid, id: &str, url: &str, index: i64) {
        debug!(%session_id, id, url, index, "Detail captured");
    }

    fn on_metrics_captured(&self, session_id: Uuid, id: &str, metric: &Metric) {
        debug!(
            %session_id,
            id,
            read = metric.read_count,
            like = metric.like_count,
            real_read = metric.verified_read_count,
            "Metrics captured"
        );
    }

    fn on_metric_decode_error(&self, session_id: Uuid, error: &SpiderError, body: &[u8]) {
        warn!(
            %session_id,
            %error,
            body = %String::from_utf8_lossy(body),
            "Metric body not decodable, using zero metrics"
        );
    }

    fn on_error(&self, session_id: Uuid, error: &SpiderError) {
        warn!(%session_id, stage = error.stage(), kind = error.kind(), %error, "Processing failed");
    }
}

/// A recorded observer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    /// See [`SpiderObserver::on_list_parsed`].
    ListParsed {
        /// Account identifier.
        biz: String,
        /// Links found.
        links: usize,
        /// Cursor after parsing.
        cursor: String,
        /// Offset after parsing.
        offset: usize,
    },
    /// See [`SpiderObserver::on_page_fetched`].
    PageFetched {
        /// 1-based page number.
        page: usize,
        /// Links found.
        links: usize,
        /// Cursor after parsing.
        cursor: String,
        /// Offset after parsing.
        offset: usize,
    },
    /// See [`SpiderObserver::on_pagination_finished`].
    PaginationFinished(PaginationSummary),
    /// See [`SpiderObserver::on_detail_captured`].
    DetailCaptured {
        /// Content id.
        id: String,
        /// Detail index.
        index: i64,
    },
    /// See [`SpiderObserver::on_metrics_captured`].
    MetricsCaptured {
        /// Content id.
        id: String,
        /// Captured metric.
        metric: Metric,
    },
    /// See [`SpiderObserver::on_metric_decode_error`].
    MetricDecodeError(SpiderError),
    /// See [`SpiderObserver::on_error`].
    Error(SpiderError),
}

/// Observer that keeps every callback, for tests.
#[derive(Debug, Default)]
pub struct CollectingSpiderObserver {
    events: RwLock<Vec<ObservedEvent>>,
}

impl CollectingSpiderObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> Vec<SpiderError> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Error(err) => Some(err.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.write().push(event);
    }
}

impl SpiderObserver for CollectingSpiderObserver {
    fn on_list_parsed(
        &self,
        _session_id: Uuid,
        biz: &str,
        links: usize,
        cursor: &str,
        offset: usize,
    ) {
        self.push(ObservedEvent::ListParsed {
            biz: biz.to_string(),
            links,
            cursor: cursor.to_string(),
            offset,
        });
    }

    fn on_page_fetched(
        &self,
        _session_id: Uuid,
        page: usize,
        links: usize,
        cursor: &str,
        offset: usize,
    ) {
        self.push(ObservedEvent::PageFetched {
            page,
            links,
            cursor: cursor.to_string(),
            offset,
        });
    }

    fn on_pagination_finished(&self, _session_id: Uuid, summary: &PaginationSummary) {
        self.push(ObservedEvent::PaginationFinished(*summary));
    }

    fn on_detail_captured(&self, _session_id: Uuid, id: &str, _url: &str, index: i64) {
        self.push(ObservedEvent::DetailCaptured {
            id: id.to_string(),
            index,
        });
    }

    fn on_metrics_captured(&self, _session_id: Uuid, id: &str, metric: &Metric) {
        self.push(ObservedEvent::MetricsCaptured {
            id: id.to_string(),
            metric: *metric,
        });
    }

    fn on_metric_decode_error(&self, _session_id: Uuid, error: &SpiderError, _body: &[u8]) {
        self.push(ObservedEvent::MetricDecodeError(error.clone()));
    }

    fn on_error(&self, _session_id: Uuid, error: &SpiderError) {
        self.push(ObservedEvent::Error(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::STAGE_PARSE_MAIN;

    #[test]
    fn test_noop_and_logging_observers() {
        let id = Uuid::new_v4();
        let summary = PaginationSummary {
            pages: 2,
            links_added: 20,
            outcome: PaginationOutcome::LimitReached,
        };

        for observer in [&NoOpSpiderObserver as &dyn SpiderObserver, &LoggingSpiderObserver] {
            observer.on_list_parsed(id, "MzA=", 10, "1001", 11);
            observer.on_page_fetched(id, 1, 10, "1011", 22);
            observer.on_pagination_finished(id, &summary);
            observer.on_detail_captured(id, "abc", "http://mp.weixin.qq.com/s", 0);
            observer.on_metrics_captured(id, "abc", &Metric::default());
            observer.on_metric_decode_error(id, &SpiderError::decode("x", "eof"), b"{");
            observer.on_error(id, &SpiderError::no_payload(STAGE_PARSE_MAIN));
        }
        // Should not panic
    }

    #[test]
    fn test_collecting_observer() {
        let observer = CollectingSpiderObserver::new();
        assert!(observer.is_empty());

        let id = Uuid::new_v4();
        observer.on_list_parsed(id, "MzA=", 3, "1003", 4);
        observer.on_error(id, &SpiderError::no_payload(STAGE_PARSE_MAIN));

        assert_eq!(observer.len(), 2);
        assert_eq!(
            observer.events()[0],
            ObservedEvent::ListParsed {
                biz: "MzA=".to_string(),
                links: 3,
                cursor: "1003".to_string(),
                offset: 4,
            }
        );
        assert_eq!(observer.errors(), vec![SpiderError::no_payload(STAGE_PARSE_MAIN)]);
    }
}
