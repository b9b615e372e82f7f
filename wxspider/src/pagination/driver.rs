//! The "fetch next page, extract, repeat" loop.

use std::collections::BTreeMap;
use url::Url;

use super::fetcher::PageFetcher;
use crate::config::SpiderConfig;
use crate::errors::{SpiderError, STAGE_PAGE_ID, STAGE_PAGE_REQUEST, STAGE_PAGE_URL};
use crate::extract::ParsedPage;
use crate::models::{PageRequest, SessionState};
use crate::observability::{PaginationOutcome, PaginationSummary, SpiderObserver};

/// Content type forced onto every follow-up request.
pub const PAGE_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Drives follow-up page requests for one session.
pub struct PaginationDriver<'a> {
    config: &'a SpiderConfig,
    fetcher: &'a dyn PageFetcher,
    observer: &'a dyn SpiderObserver,
}

impl<'a> PaginationDriver<'a> {
    /// Creates a driver.
    #[must_use]
    pub fn new(
        config: &'a SpiderConfig,
        fetcher: &'a dyn PageFetcher,
        observer: &'a dyn SpiderObserver,
    ) -> Self {
        Self {
            config,
            fetcher,
            observer,
        }
    }

    /// Builds the next follow-up URL from the session's listing request.
    ///
    /// The listing query is cloned and the paging parameters are overridden;
    /// parameters are emitted sorted by key.
    pub fn build_page_url(&self, session: &SessionState) -> Result<String, SpiderError> {
        let request = session.current_request.as_ref().ok_or_else(|| {
            SpiderError::invalid_url(STAGE_PAGE_REQUEST, "", "no listing request in session")
        })?;

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in request.url.query_pairs() {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        let overrides = [
            ("offset", session.offset.to_string()),
            ("action", "getmsg".to_string()),
            ("count", self.config.page_size.to_string()),
            ("f", "json".to_string()),
            ("is_ok", "1".to_string()),
            ("uin", "777".to_string()),
            ("key", "777".to_string()),
            ("appmsg_token", session.pagination_token.clone()),
            ("x5", "1".to_string()),
        ];
        for (key, value) in overrides {
            params.insert(key.to_string(), vec![value]);
        }

        let mut url = Url::parse(&self.config.page_endpoint).map_err(|err| {
            SpiderError::invalid_url(STAGE_PAGE_REQUEST, self.config.page_endpoint.as_str(), err)
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, values) in &params {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }

        Ok(url.into())
    }

    /// Builds the next follow-up request, headers included.
    pub fn build_page_request(&self, session: &SessionState) -> Result<PageRequest, SpiderError> {
        let url = self.build_page_url(session)?;
        let headers = session
            .current_request
            .as_ref()
            .map(|r| r.headers.clone())
            .unwrap_or_default();

        let mut request = PageRequest { url, headers };
        request.set_header("Content-Type", PAGE_CONTENT_TYPE);
        Ok(request)
    }

    /// Fetches pages until the cursor runs out, the ceiling is hit, or a
    /// page fails.
    ///
    /// Records from pages parsed before a failure stay in the session.
    pub async fn run(&self, session: &mut SessionState) -> Result<PaginationSummary, SpiderError> {
        let mut summary = PaginationSummary {
            pages: 0,
            links_added: 0,
            outcome: PaginationOutcome::Exhausted,
        };

        loop {
            if summary.pages >= self.config.max_pages {
                summary.outcome = PaginationOutcome::LimitReached;
                break;
            }
            if summary.pages > 0 {
                let delay = self.config.page_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let request = self.build_page_request(session)?;
            let body = self.fetcher.fetch(&request).await?;

            let page = ParsedPage::scan(&body);
            if page.is_empty() && self.config.empty_page_ends_pagination {
                session.last_cursor_id.clear();
                break;
            }
            let page = page.require_matches(STAGE_PAGE_URL, STAGE_PAGE_ID)?;

            let links = page.links.len();
            summary.pages += 1;
            summary.links_added += links;
            session.apply_page(&page.cursor_ids, page.links);

            self.observer.on_page_fetched(
                session.session_id,
                summary.pages,
                links,
                &session.last_cursor_id,
                session.offset,
            );

            if session.last_cursor_id.is_empty() {
                break;
            }
        }

        self.observer
            .on_pagination_finished(session.session_id, &summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::STAGE_PAGE_RESPONSE;
    use crate::models::{InterceptedRequest, LinkRecord};
    use crate::observability::{CollectingSpiderObserver, NoOpSpiderObserver, ObservedEvent};
    use crate::pagination::MockPageFetcher;
    use crate::testing::{fixtures, ScriptedFetcher};
    use pretty_assertions::assert_eq;

    fn listing_session() -> SessionState {
        let request = InterceptedRequest::get(
            "http://mp.weixin.qq.com/mp/profile_ext?action=home&__biz=MzA3&scene=124&devicetype=android",
        )
        .unwrap()
        .with_header("Cookie", "wap_sid2=abc")
        .with_header("Content-Type", "text/html")
        .with_header("User-Agent", "MicroMessenger");

        let mut session = SessionState::new();
        session.begin_listing(&request);
        session.pagination_token = "tok123".to_string();
        session.apply_page(
            &["1001".to_string()],
            vec![LinkRecord::new(fixtures::article_url(1))],
        );
        session
    }

    fn config() -> SpiderConfig {
        SpiderConfig::new().with_auto_scroll(true).with_page_delay_ms(0)
    }

    #[test]
    fn test_build_page_url_overrides_params() {
        let config = config();
        let fetcher = ScriptedFetcher::new(Vec::new());
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);

        let url = driver.build_page_url(&listing_session()).unwrap();
        assert_eq!(
            url,
            "http://mp.weixin.qq.com/mp/profile_ext?__biz=MzA3&action=getmsg&appmsg_token=tok123\
             &count=10&devicetype=android&f=json&is_ok=1&key=777&offset=2&scene=124&uin=777&x5=1"
        );
    }

    #[test]
    fn test_build_page_request_copies_headers() {
        let config = config();
        let fetcher = ScriptedFetcher::new(Vec::new());
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);

        let request = driver.build_page_request(&listing_session()).unwrap();
        assert_eq!(request.header("cookie"), Some("wap_sid2=abc"));
        assert_eq!(request.header("user-agent"), Some("MicroMessenger"));
        assert_eq!(request.header("content-type"), Some(PAGE_CONTENT_TYPE));
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn test_build_page_url_requires_listing_request() {
        let config = config();
        let fetcher = ScriptedFetcher::new(Vec::new());
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);

        let err = driver.build_page_url(&SessionState::new()).unwrap_err();
        assert_eq!(err.stage(), STAGE_PAGE_REQUEST);
    }

    #[tokio::test]
    async fn test_run_accumulates_pages_until_failure() {
        let config = config();
        let fetcher = ScriptedFetcher::new(vec![
            Ok(fixtures::page_json(&[(2001, 11), (2002, 12)])),
            Ok(fixtures::page_json(&[(3001, 21), (3002, 22), (3003, 23)])),
            Ok(fixtures::page_json(&[])),
        ]);
        let observer = CollectingSpiderObserver::new();
        let driver = PaginationDriver::new(&config, &fetcher, &observer);
        let mut session = listing_session();

        let err = driver.run(&mut session).await.unwrap_err();

        assert_eq!(err, SpiderError::no_url(STAGE_PAGE_URL));
        assert_eq!(session.link_records.len(), 1 + 2 + 3);
        assert_eq!(session.last_cursor_id, "3003");
        // 2 from the listing page, then (2 + 1) and (3 + 1).
        assert_eq!(session.offset, 2 + 3 + 4);
        assert_eq!(fetcher.requests().len(), 3);
        assert!(fetcher.requests()[1].url.contains("offset=5"));
        assert!(fetcher.requests()[2].url.contains("offset=9"));
        assert_eq!(observer.len(), 2);
    }

    #[tokio::test]
    async fn test_run_empty_page_ends_cleanly_when_enabled() {
        let config = config().with_empty_page_ends_pagination(true);
        let fetcher = ScriptedFetcher::new(vec![
            Ok(fixtures::page_json(&[(2001, 11)])),
            Ok(fixtures::page_json(&[])),
        ]);
        let observer = CollectingSpiderObserver::new();
        let driver = PaginationDriver::new(&config, &fetcher, &observer);
        let mut session = listing_session();

        let summary = driver.run(&mut session).await.unwrap();

        assert_eq!(
            summary,
            PaginationSummary {
                pages: 1,
                links_added: 1,
                outcome: PaginationOutcome::Exhausted,
            }
        );
        assert!(session.last_cursor_id.is_empty());
        assert_eq!(session.link_records.len(), 2);
        assert_eq!(
            observer.events().last(),
            Some(&ObservedEvent::PaginationFinished(summary))
        );
    }

    #[tokio::test]
    async fn test_run_cursorless_pages_terminate() {
        let fetcher = ScriptedFetcher::repeating(fixtures::page_json(&[]));
        let mut session = listing_session();

        let strict = config();
        let driver = PaginationDriver::new(&strict, &fetcher, &NoOpSpiderObserver);
        assert!(driver.run(&mut session).await.unwrap_err().is_msg_not_found());

        let lenient = config().with_empty_page_ends_pagination(true);
        let driver = PaginationDriver::new(&lenient, &fetcher, &NoOpSpiderObserver);
        assert!(driver.run(&mut session).await.is_ok());

        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_run_page_without_ids_fails() {
        let config = config().with_empty_page_ends_pagination(true);
        let body = format!(r#"{{"general_msg_list":"{}"}}"#, fixtures::article_url(7));
        let fetcher = ScriptedFetcher::new(vec![Ok(body)]);
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);
        let mut session = listing_session();

        let err = driver.run(&mut session).await.unwrap_err();
        assert_eq!(err, SpiderError::no_id(STAGE_PAGE_ID));
        assert_eq!(session.link_records.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_at_page_limit() {
        let config = config().with_max_pages(3);
        let fetcher = ScriptedFetcher::repeating(fixtures::page_json(&[(4001, 1)]));
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);
        let mut session = listing_session();

        let summary = driver.run(&mut session).await.unwrap();

        assert_eq!(summary.outcome, PaginationOutcome::LimitReached);
        assert_eq!(summary.pages, 3);
        assert_eq!(fetcher.requests().len(), 3);
        assert_eq!(session.offset, 2 + 3 * 2);
    }

    #[tokio::test]
    async fn test_run_propagates_transport_failure() {
        let config = config();
        let mut fetcher = MockPageFetcher::new();
        let mut seq = mockall::Sequence::new();
        fetcher
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(fixtures::page_json(&[(5001, 31)])));
        fetcher
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(SpiderError::transport(STAGE_PAGE_RESPONSE, "connection reset")));

        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);
        let mut session = listing_session();

        let err = driver.run(&mut session).await.unwrap_err();

        assert_eq!(err.kind(), "TransportFailure");
        assert_eq!(err.stage(), STAGE_PAGE_RESPONSE);
        // The page fetched before the failure is kept.
        assert_eq!(session.link_records.len(), 2);
        assert_eq!(session.last_cursor_id, "5001");
    }

    #[tokio::test]
    async fn test_run_waits_between_pages() {
        let config = config().with_page_delay_ms(20).with_max_pages(3);
        let fetcher = ScriptedFetcher::repeating(fixtures::page_json(&[(6001, 1)]));
        let driver = PaginationDriver::new(&config, &fetcher, &NoOpSpiderObserver);
        let mut session = listing_session();

        let started = std::time::Instant::now();
        driver.run(&mut session).await.unwrap();

        // Two pauses: before the second and the third fetch.
        assert!(started.elapsed() >= std::time::Duration::from_millis(40));
    }
}
