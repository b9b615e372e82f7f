//! Requests and responses handed over by the proxy host.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::errors::SpiderError;
use crate::identity::{parse_request_uri, query_value};

/// Which entry point a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// A listing page (history of an account).
    List,
    /// An article detail page.
    Detail,
    /// A metric beacon.
    Metric,
}

impl ResponseKind {
    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
            Self::Metric => "metric",
        }
    }

    /// Conventional URL routing for hosts that do not bring their own.
    #[must_use]
    pub fn classify(request: &InterceptedRequest) -> Option<Self> {
        match request.url.path() {
            "/mp/profile_ext" => match query_value(&request.url, "action").as_str() {
                "home" | "getmsg" => Some(Self::List),
                _ => None,
            },
            "/mp/getappmsgext" => Some(Self::Metric),
            path if path == "/s" || path.starts_with("/s/") => Some(Self::Detail),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up a header case-insensitively.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A request intercepted by the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// HTTP method.
    pub method: String,
    /// Full request URL.
    pub url: Url,
    /// Header fields in arrival order.
    pub headers: Vec<(String, String)>,
}

impl InterceptedRequest {
    /// Creates a GET request for a URL or origin-form target.
    pub fn get(url: &str) -> Result<Self, SpiderError> {
        Ok(Self {
            method: "GET".to_string(),
            url: parse_request_uri(url)?,
            headers: Vec::new(),
        })
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Gets a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The referring page, if any.
    #[must_use]
    pub fn referer(&self) -> Option<&str> {
        self.header("Referer")
    }

    /// First value of a query parameter, or an empty string.
    #[must_use]
    pub fn query(&self, key: &str) -> String {
        query_value(&self.url, key)
    }
}

/// A response intercepted by the proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header fields in arrival order.
    pub headers: Vec<(String, String)>,
    /// Full response body.
    pub body: Vec<u8>,
}

impl InterceptedResponse {
    /// Creates a 200 response with a body.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// The body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A follow-up listing request built by the pagination driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Full request URL.
    pub url: String,
    /// Header fields to send.
    pub headers: Vec<(String, String)>,
}

impl PageRequest {
    /// Gets a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Sets a header, replacing every existing field with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }
}
