//! Listing-page parsing.
//!
//! A history page carries its message list on a single script line, either
//! as `general_msg_list` (older JSON format) or as `msgList = '...'` next to a
//! `window.appmsg_token = "..."` assignment.

use super::patterns::{find_ids, find_token, find_urls, normalize};
use crate::errors::{
    SpiderError, STAGE_MAIN_ID, STAGE_MAIN_URL, STAGE_PAGE_ID, STAGE_PAGE_URL, STAGE_PARSE_MAIN,
};
use crate::models::LinkRecord;

/// Marker of the older single-line page format.
pub const GENERAL_MSG_LIST_MARKER: &str = "general_msg_list";
/// Marker of the message-list script line.
pub const MSG_LIST_MARKER: &str = "msgList = ";
/// Marker of the pagination token script line.
pub const TOKEN_MARKER: &str = "window.appmsg_token =";

/// The lines of a listing body that extraction cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingScan<'a> {
    /// The message-list line.
    pub payload: Option<&'a str>,
    /// The token assignment line seen before the payload.
    pub token_line: Option<&'a str>,
}

impl<'a> ListingScan<'a> {
    /// Selects the payload and token lines of a listing body.
    #[must_use]
    pub fn scan(text: &'a str) -> Self {
        if let Some(line) = text
            .split_inclusive('\n')
            .find(|line| line.contains(GENERAL_MSG_LIST_MARKER))
        {
            return Self {
                payload: Some(line),
                token_line: None,
            };
        }

        let mut token_line = None;
        for line in text.split_inclusive('\n') {
            if line.contains(TOKEN_MARKER) {
                token_line = Some(line);
            }
            if line.contains(MSG_LIST_MARKER) {
                return Self {
                    payload: Some(line),
                    token_line,
                };
            }
        }

        Self {
            payload: None,
            token_line,
        }
    }

    /// The quoted token of the token line.
    #[must_use]
    pub fn token(&self) -> Option<&'a str> {
        self.token_line.and_then(find_token)
    }
}

/// Links and cursor ids extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Pagination token, for listing pages that carry one.
    pub token: Option<String>,
    /// Article links in document order.
    pub links: Vec<LinkRecord>,
    /// Candidate ids in document order; the cursor is the last one.
    pub cursor_ids: Vec<String>,
}

impl ParsedPage {
    /// Normalizes a payload and collects every match, without judging them.
    #[must_use]
    pub fn scan(payload: &str) -> Self {
        let text = normalize(payload);
        Self {
            token: None,
            links: find_urls(&text).into_iter().map(LinkRecord::new).collect(),
            cursor_ids: find_ids(&text).into_iter().map(String::from).collect(),
        }
    }

    /// Fails if either the links or the cursor ids are missing.
    pub fn require_matches(self, url_stage: &str, id_stage: &str) -> Result<Self, SpiderError> {
        if self.links.is_empty() {
            return Err(SpiderError::no_url(url_stage));
        }
        if self.cursor_ids.is_empty() {
            return Err(SpiderError::no_id(id_stage));
        }
        Ok(self)
    }

    /// Whether nothing at all matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.cursor_ids.is_empty()
    }

    /// The pagination cursor.
    #[must_use]
    pub fn last_cursor(&self) -> Option<&str> {
        self.cursor_ids.last().map(String::as_str)
    }
}

impl<'a> TryFrom<&ListingScan<'a>> for ParsedPage {
    type Error = SpiderError;

    /// Extracts the payload line of a scanned listing body.
    fn try_from(scan: &ListingScan<'a>) -> Result<Self, Self::Error> {
        let payload = scan
            .payload
            .ok_or_else(|| SpiderError::no_payload(STAGE_PARSE_MAIN))?;

        let mut page = Self::scan(payload).require_matches(STAGE_MAIN_URL, STAGE_MAIN_ID)?;
        page.token = scan.token().map(String::from);
        Ok(page)
    }
}

/// Parses a listing page body.
pub fn parse_listing(body: &[u8]) -> Result<ParsedPage, SpiderError> {
    let text = String::from_utf8_lossy(body);
    ParsedPage::try_from(&ListingScan::scan(&text))
}

/// Parses a follow-up page body as a whole.
pub fn parse_page(body: &str) -> Result<ParsedPage, SpiderError> {
    ParsedPage::scan(body).require_matches(STAGE_PAGE_URL, STAGE_PAGE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_prefers_general_msg_list() {
        let body = "<html>\nwindow.appmsg_token = \"tok\";\nvar general_msg_list = '{}';\nvar msgList = '{}';\n";
        let scan = ListingScan::scan(body);

        assert_eq!(scan.payload, Some("var general_msg_list = '{}';\n"));
        assert_eq!(scan.token_line, None);
    }

    #[test]
    fn test_scan_stops_at_msg_list() {
        let body = "window.appmsg_token = \"first\";\nvar msgList = '{}';\nwindow.appmsg_token = \"late\";\n";
        let scan = ListingScan::scan(body);

        assert_eq!(scan.payload, Some("var msgList = '{}';\n"));
        assert_eq!(scan.token(), Some("first"));
    }

    #[test]
    fn test_scan_considers_unterminated_last_line() {
        let scan = ListingScan::scan("<html>\nvar msgList = '{}';");
        assert_eq!(scan.payload, Some("var msgList = '{}';"));
    }

    #[test]
    fn test_parse_listing_end_to_end() {
        let page = parse_listing(fixtures::SIMPLE_LISTING.as_bytes()).unwrap();

        assert_eq!(page.token.as_deref(), Some("tok123"));
        assert_eq!(page.last_cursor(), Some("1001"));
        assert_eq!(page.links.len(), 1);
        assert_eq!(
            page.links[0].url,
            "http://mp.weixin.qq.com/s?__biz=MzA3&mid=5&idx=1"
        );
    }

    #[test]
    fn test_parse_listing_escaped_payload() {
        let body = fixtures::listing_html("tokABC", &[(2001, 11), (2002, 12), (2003, 13)]);
        let page = parse_listing(body.as_bytes()).unwrap();

        let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                fixtures::article_url(11).as_str(),
                fixtures::article_url(12).as_str(),
                fixtures::article_url(13).as_str(),
            ]
        );
        assert_eq!(page.cursor_ids, vec!["2001", "2002", "2003"]);
        assert_eq!(page.last_cursor(), Some("2003"));
        assert_eq!(page.token.as_deref(), Some("tokABC"));
    }

    #[test]
    fn test_parse_listing_without_marker() {
        let err = parse_listing(b"<html><body>nothing here</body></html>\n").unwrap_err();
        assert_eq!(err, SpiderError::no_payload(STAGE_PARSE_MAIN));
    }

    #[test]
    fn test_scan_keeps_token_without_payload() {
        let scan = ListingScan::scan("window.appmsg_token = \"orphan\";\n<body></body>\n");
        assert_eq!(scan.token(), Some("orphan"));
        assert_eq!(
            ParsedPage::try_from(&scan).unwrap_err(),
            SpiderError::no_payload(STAGE_PARSE_MAIN)
        );
    }

    #[test]
    fn test_parse_listing_without_urls() {
        let err = parse_listing(b"var msgList = '{&quot;list&quot;:[{&quot;id&quot;:1}]}';\n")
            .unwrap_err();
        assert_eq!(err, SpiderError::no_url(STAGE_MAIN_URL));
    }

    #[test]
    fn test_parse_listing_without_ids() {
        let err =
            parse_listing(b"var msgList = 'http://mp.weixin.qq.com/s?mid=1,';\n").unwrap_err();
        assert_eq!(err, SpiderError::no_id(STAGE_MAIN_ID));
    }

    #[test]
    fn test_parse_page_json() {
        let body = fixtures::page_json(&[(3001, 21), (3002, 22)]);
        let page = parse_page(&body).unwrap();

        assert_eq!(page.links.len(), 2);
        assert_eq!(page.last_cursor(), Some("3002"));
        assert!(page.token.is_none());
    }

    #[test]
    fn test_parse_page_empty() {
        let body = fixtures::page_json(&[]);
        assert!(ParsedPage::scan(&body).is_empty());
        assert_eq!(parse_page(&body).unwrap_err(), SpiderError::no_url(STAGE_PAGE_URL));
    }
}
