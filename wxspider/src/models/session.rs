//! Per-session mutable state.

use uuid::Uuid;

use super::message::{InterceptedRequest, ResponseKind};
use super::records::{DetailRecord, LinkRecord};

/// State of one intercepted browsing session.
///
/// Owned by exactly one processor; nothing here is shared across sessions.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Correlation id for log lines.
    pub session_id: Uuid,
    /// The request most recently handed to an entry point.
    pub current_request: Option<InterceptedRequest>,
    /// Cursor of the last parsed page; empty before the first parse.
    pub last_cursor_id: String,
    /// Pagination offset. Only ever grows.
    pub offset: usize,
    /// Opaque pagination token from the listing page.
    pub pagination_token: String,
    /// Article links accumulated for the current listing.
    pub link_records: Vec<LinkRecord>,
    /// The last detail or metric record.
    pub detail_record: Option<DetailRecord>,
    /// URL of the listing page that started the session.
    pub origin_url: String,
    /// Account identifier (`__biz`) of the listing page.
    pub biz: String,
    /// Kind of the response processed last.
    pub kind: Option<ResponseKind>,
    /// Index of the detail page currently being visited; -1 before the first.
    pub detail_index: i64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_request: None,
            last_cursor_id: String::new(),
            offset: 0,
            pagination_token: String::new(),
            link_records: Vec::new(),
            detail_record: None,
            origin_url: String::new(),
            biz: String::new(),
            kind: None,
            detail_index: -1,
        }
    }
}

impl SessionState {
    /// Creates a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new listing pass for `request`.
    ///
    /// Link records and the detail index are reset; the offset is kept.
    pub fn begin_listing(&mut self, request: &InterceptedRequest) {
        self.kind = Some(ResponseKind::List);
        self.current_request = Some(request.clone());
        self.link_records.clear();
        self.detail_index = -1;
        self.biz = request.query("__biz");
        self.origin_url = request.url.to_string();
    }

    /// Records one parsed page: cursor, offset and links.
    pub fn apply_page(&mut self, cursor_ids: &[String], links: Vec<LinkRecord>) {
        if let Some(last) = cursor_ids.last() {
            self.last_cursor_id.clone_from(last);
        }
        self.offset += cursor_ids.len() + 1;
        self.link_records.extend(links);
    }

    /// Link URLs in document order.
    #[must_use]
    pub fn link_urls(&self) -> Vec<&str> {
        self.link_records.iter().map(|l| l.url.as_str()).collect()
    }
}
