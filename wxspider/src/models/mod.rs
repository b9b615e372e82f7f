//! Data model: records, intercepted messages and session state.

mod message;
mod records;
mod session;

pub use message::{InterceptedRequest, InterceptedResponse, PageRequest, ResponseKind};
pub use records::{DetailRecord, LinkRecord, Metric, MetricEnvelope};
pub use session::SessionState;
