//! Test doubles and page fixtures.
//!
//! This module provides:
//! - Listing, page and metric bodies shaped like the real site
//! - Scripted and failing [`PageFetcher`](crate::pagination::PageFetcher)s

pub mod fixtures;
mod mocks;

pub use mocks::{FailingFetcher, ScriptedFetcher};
