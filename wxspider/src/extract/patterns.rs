//! Compiled text patterns and the substitution table.
//!
//! Listing payloads arrive as HTML-escaped JSON inside inline scripts. They are
//! flattened with [`normalize`] before the URL and id patterns are applied.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Substitution table, in priority order.
///
/// At each position the earliest entry that matches wins and the replaced
/// text is not rescanned, so `&amp;amp;` beats `&amp;` and `\\` beats `\`.
pub const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("\t", ""),
    (" ", ""),
    ("&quot;", "\""),
    ("&nbsp;", ""),
    ("\\\\", ""),
    ("&amp;amp;", "&"),
    ("&amp;", "&"),
    ("\\", ""),
];

#[allow(clippy::unwrap_used)]
static SUBSTITUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = SUBSTITUTIONS
        .iter()
        .map(|(from, _)| regex::escape(from))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).unwrap()
});

#[allow(clippy::unwrap_used)]
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"http://mp\.weixin\.qq\.com/s[?/][^#"',]*"#).unwrap());

#[allow(clippy::unwrap_used)]
static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""id":(\d+)"#).unwrap());

#[allow(clippy::unwrap_used)]
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(.*)""#).unwrap());

fn substitution_for(matched: &str) -> &'static str {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == matched)
        .map_or("", |(_, to)| *to)
}

/// Applies the substitution table in a single left-to-right pass.
#[must_use]
pub fn normalize(text: &str) -> Cow<'_, str> {
    SUBSTITUTION_RE.replace_all(text, |caps: &Captures<'_>| substitution_for(&caps[0]))
}

/// Finds every article link, in document order.
#[must_use]
pub fn find_urls(text: &str) -> Vec<&str> {
    URL_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Finds the digits of every `"id":<digits>` field, in document order.
#[must_use]
pub fn find_ids(text: &str) -> Vec<&str> {
    ID_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Pulls the quoted value out of a script assignment line.
#[must_use]
pub fn find_token(line: &str) -> Option<&str> {
    TOKEN_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_entities_and_whitespace() {
        let raw = "{&quot;id&quot;:\t1001, &quot;title&quot;:&nbsp;&quot;a b&quot;}";
        assert_eq!(normalize(raw), r#"{"id":1001,"title":"ab"}"#);
    }

    #[test]
    fn test_normalize_ampersands() {
        assert_eq!(normalize("a&amp;amp;b&amp;c"), "a&b&c");
    }

    #[test]
    fn test_normalize_backslashes() {
        assert_eq!(
            normalize(r"http:\/\/mp.weixin.qq.com\/s?__biz=A\\x"),
            "http://mp.weixin.qq.com/s?__biz=Ax"
        );
    }

    #[test]
    fn test_normalize_entities_win_over_backslash() {
        // Dropping the backslash must not corrupt the adjacent entity.
        assert_eq!(normalize(r"\&quot;x\&quot;"), r#""x""#);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = r#"var msgList = '{&quot;list&quot;:[{&quot;comm_msg_info&quot;:{&quot;id&quot;:1001},&quot;content_url&quot;:&quot;http:\/\/mp.weixin.qq.com\/s?__biz=MzA=&amp;amp;mid=5&amp;amp;idx=1#rd&quot;}]}';"#;
        let once = normalize(raw).into_owned();
        let twice = normalize(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_borrows_when_clean() {
        assert!(matches!(normalize("abc"), Cow::Borrowed("abc")));
    }

    #[test]
    fn test_find_urls_stops_at_delimiters() {
        let text = r#""http://mp.weixin.qq.com/s?__biz=A&mid=1&idx=1#wechat_redirect","http://mp.weixin.qq.com/s?__biz=A&mid=2&idx=1',http://mp.weixin.qq.com/s/AbC,"#;
        assert_eq!(
            find_urls(text),
            vec![
                "http://mp.weixin.qq.com/s?__biz=A&mid=1&idx=1",
                "http://mp.weixin.qq.com/s?__biz=A&mid=2&idx=1",
                "http://mp.weixin.qq.com/s/AbC",
            ]
        );
    }

    #[test]
    fn test_find_urls_ignores_other_endpoints() {
        let text = r#""http://mp.weixin.qq.com/mp/profile_ext?action=home""#;
        assert!(find_urls(text).is_empty());
    }

    #[test]
    fn test_find_ids() {
        let text = r#"{"list":[{"id":1001},{"id":1002}],"fakeid":"3"}"#;
        assert_eq!(find_ids(text), vec!["1001", "1002"]);
        assert!(find_ids(r#"{"id":"abc"}"#).is_empty());
    }

    #[test]
    fn test_find_token() {
        assert_eq!(
            find_token(r#"window.appmsg_token = "tok123";"#),
            Some("tok123")
        );
        assert_eq!(find_token("window.appmsg_token = tok;"), None);
    }
}
