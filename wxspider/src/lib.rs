//! # wxspider
//!
//! Extraction core of an intercepting spider for WeChat official-account
//! articles.
//!
//! A proxy host hands every intercepted response to a [`Processor`]:
//!
//! - **Listing pages**: article links and the pagination cursor are
//!   extracted, then follow-up pages are fetched until the history runs out
//! - **Detail pages**: the article body is captured under a stable content id
//! - **Metric beacons**: read and like counts are attached to the article
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wxspider::prelude::*;
//!
//! let config = SpiderConfig::new().with_verbose(true).with_auto_scroll(true);
//! init_logging(config.verbose)?;
//!
//! let mut processor = BaseProcessor::new(config)?;
//! let body = processor.process_list(&request, &response).await?;
//! processor.output();
//! ```
//!
//! [`Processor`]: processor::Processor

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod extract;
pub mod identity;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod processor;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::SpiderConfig;
    pub use crate::errors::SpiderError;
    pub use crate::extract::{normalize, parse_listing, parse_page};
    pub use crate::identity::{gen_id, hash_key};
    pub use crate::models::{
        DetailRecord, InterceptedRequest, InterceptedResponse, LinkRecord, Metric,
        ResponseKind, SessionState,
    };
    pub use crate::observability::{
        init_logging, LoggingSpiderObserver, NoOpSpiderObserver, SpiderObserver,
    };
    #[cfg(feature = "http")]
    pub use crate::pagination::HttpPageFetcher;
    pub use crate::pagination::{PageFetcher, PaginationDriver};
    pub use crate::processor::{BaseProcessor, Processor};
}
