//! Bodies and requests shaped like the ones the proxy intercepts.

use crate::errors::SpiderError;
use crate::models::InterceptedRequest;

/// Account identifier used across fixtures.
pub const BIZ: &str = "MzA3";

/// A minimal listing page with one article and token `tok123`.
pub const SIMPLE_LISTING: &str = concat!(
    "<!DOCTYPE html>\n",
    "<html>\n",
    "<script type=\"text/javascript\">\n",
    "window.appmsg_token = \"tok123\";\n",
    "var msgList = '{\"list\":[{\"comm_msg_info\":{\"id\":1001,\"type\":49},",
    "\"app_msg_ext_info\":{\"content_url\":\"http://mp.weixin.qq.com/s?__biz=MzA3&mid=5&idx=1\"}}]}';\n",
    "</script>\n",
    "</html>\n",
);

/// Canonical article URL for `mid`, as it looks after normalization.
#[must_use]
pub fn article_url(mid: u32) -> String {
    format!("http://mp.weixin.qq.com/s?__biz={BIZ}&mid={mid}&idx=1&sn=abc")
}

fn escaped_entry(id: u64, mid: u32) -> String {
    format!(
        "{{&quot;comm_msg_info&quot;:{{&quot;id&quot;:{id},&quot;type&quot;:49}},\
         &quot;app_msg_ext_info&quot;:{{&quot;content_url&quot;:&quot;http:\\/\\/mp.weixin.qq.com\\/s?\
         __biz={BIZ}&amp;amp;mid={mid}&amp;amp;idx=1&amp;amp;sn=abc#wechat_redirect&quot;}}}}"
    )
}

/// A listing page whose `msgList` is HTML-escaped, one `(id, mid)` per article.
#[must_use]
pub fn listing_html(token: &str, items: &[(u64, u32)]) -> String {
    let entries: Vec<String> = items.iter().map(|&(id, mid)| escaped_entry(id, mid)).collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<script type=\"text/javascript\">\n\
         window.appmsg_token = \"{token}\";\n\
         var msgList = '{{&quot;list&quot;:[{}]}}';\n\
         </script>\n</head>\n<body></body>\n</html>\n",
        entries.join(",")
    )
}

/// A `getmsg` follow-up page body, one `(id, mid)` per article.
///
/// An empty slice yields a page with neither links nor ids.
#[must_use]
pub fn page_json(items: &[(u64, u32)]) -> String {
    let entries: Vec<String> = items
        .iter()
        .map(|&(id, mid)| {
            format!(
                r#"{{\"comm_msg_info\":{{\"id\":{id},\"type\":49}},\"app_msg_ext_info\":{{\"content_url\":\"http:\\/\\/mp.weixin.qq.com\\/s?__biz={BIZ}&amp;mid={mid}&amp;idx=1&amp;sn=abc#wechat_redirect\"}}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"ret":0,"errmsg":"ok","msg_count":{},"can_msg_continue":1,"general_msg_list":"{{\"list\":[{}]}}","next_offset":20}}"#,
        items.len(),
        entries.join(",")
    )
}

/// A metric beacon body.
#[must_use]
pub fn metric_body(read: i64, like: i64, verified_read: i64) -> String {
    format!(
        r#"{{"advertisement_num":0,"appmsgstat":{{"show":true,"is_login":true,"read_num":{read},"like_num":{like},"real_read_num":{verified_read}}},"base_resp":{{"ret":0}}}}"#
    )
}

/// The history-page request that opens a listing.
pub fn listing_request(biz: &str) -> Result<InterceptedRequest, SpiderError> {
    Ok(InterceptedRequest::get(&format!(
        "http://mp.weixin.qq.com/mp/profile_ext?action=home&__biz={biz}&scene=124"
    ))?
    .with_header("Cookie", "wap_sid2=session")
    .with_header("User-Agent", "Mozilla/5.0 MicroMessenger/7.0"))
}

/// The request for one article page.
pub fn detail_request(mid: u32) -> Result<InterceptedRequest, SpiderError> {
    InterceptedRequest::get(&article_url(mid))
}

/// A metric beacon request, referred from `referer` if given.
pub fn metric_request(referer: Option<&str>) -> Result<InterceptedRequest, SpiderError> {
    let request = InterceptedRequest::get("/mp/getappmsgext?f=json&is_need_ad=0")?;
    Ok(match referer {
        Some(referer) => request.with_header("Referer", referer),
        None => request,
    })
}
