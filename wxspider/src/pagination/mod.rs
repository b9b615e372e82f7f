//! Follow-up page retrieval.

mod driver;
mod fetcher;

pub use driver::{PaginationDriver, PAGE_CONTENT_TYPE};
#[cfg(feature = "http")]
pub use fetcher::HttpPageFetcher;
pub use fetcher::PageFetcher;

#[cfg(test)]
pub(crate) use fetcher::MockPageFetcher;
