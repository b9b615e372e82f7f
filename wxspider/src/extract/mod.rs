//! Text extraction: the pattern library and listing parsing.

pub mod listing;
pub mod patterns;

pub use listing::{parse_listing, parse_page, ListingScan, ParsedPage};
pub use patterns::{find_ids, find_token, find_urls, normalize};
