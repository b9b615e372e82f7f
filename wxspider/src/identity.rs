//! Content identity derived from article URLs.
//!
//! An article is addressed by its `__biz`, `mid` and `idx` query parameters;
//! every other parameter (`sn`, `chksm`, `scene`, ...) varies between visits
//! and is ignored.

use md5::{Digest, Md5};
use url::Url;

use crate::errors::{SpiderError, STAGE_PARSE_URL};

/// Origin used to resolve origin-form request targets such as `/s?__biz=...`.
const ORIGIN_FORM_BASE: &str = "http://mp.weixin.qq.com";

/// Parses an absolute URL or an origin-form request target.
pub fn parse_request_uri(raw: &str) -> Result<Url, SpiderError> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
            Url::parse(ORIGIN_FORM_BASE)
                .and_then(|base| base.join(raw))
                .map_err(|err| SpiderError::invalid_url(STAGE_PARSE_URL, raw, err))
        }
        Err(err) => Err(SpiderError::invalid_url(STAGE_PARSE_URL, raw, err)),
    }
}

/// Returns the first value of a query parameter, or an empty string.
#[must_use]
pub fn query_value(url: &Url, key: &str) -> String {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// MD5 of `key`, rendered as lowercase hex.
#[must_use]
pub fn hash_key(key: &str) -> String {
    hex::encode(Md5::digest(key.as_bytes()))
}

/// Derives the content id of an article URL.
pub fn gen_id(url: &str) -> Result<String, SpiderError> {
    let uri = parse_request_uri(url)?;
    Ok(gen_id_from(&uri))
}

/// Derives the content id of an already parsed URL.
#[must_use]
pub fn gen_id_from(uri: &Url) -> String {
    let key = format!(
        "{}_{}_{}",
        query_value(uri, "__biz"),
        query_value(uri, "mid"),
        query_value(uri, "idx")
    );
    hash_key(&key)
}
