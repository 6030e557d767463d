pub mod api;
pub mod crawl;
pub mod error;
pub mod input;
pub mod probe;
pub mod report;

pub use error::CoreError;
pub use probe::{NetworkErrorKind, ProbeConfig, ProbeOutcome, ProbeResult, Prober};
pub use report::ReportFormat;
