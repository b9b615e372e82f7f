//! Observability: milestone observers and logging setup.

mod logging;
mod observer;

pub use logging::{default_directive, env_filter, init_json_logging, init_logging, InitError};
pub use observer::{
    CollectingSpiderObserver, LoggingSpiderObserver, NoOpSpiderObserver, ObservedEvent,
    PaginationOutcome, PaginationSummary, SpiderObserver,
};
