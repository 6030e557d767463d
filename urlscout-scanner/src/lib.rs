pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod frontier;
pub mod normalize;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{LinkExtractor, extract_links};
pub use fetch::{FetchConfig, FetchOutcome, HttpFetcher, PageFetcher};
pub use frontier::{FrontierEntry, Insertion, VisitedSet};
pub use normalize::{NormalizedUrl, normalize, normalize_relative};
pub use result::{CrawlResult, PageFailure, StopReason};
