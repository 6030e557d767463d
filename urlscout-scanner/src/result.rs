use crate::normalize::NormalizedUrl;
use serde::Serialize;

/// Why a crawl stopped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every reachable URL within the depth limit was processed.
    FrontierExhausted,
    /// The URL cap was hit.
    CapReached,
    /// The overall crawl timeout expired.
    TimedOut,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::FrontierExhausted => "frontier exhausted",
            StopReason::CapReached => "URL cap reached",
            StopReason::TimedOut => "crawl timeout",
        }
    }
}

/// A page that could not be fetched. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: NormalizedUrl,
    pub depth: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub seed: NormalizedUrl,
    /// Same-origin URLs in discovery order, seed first.
    pub urls: Vec<NormalizedUrl>,
    /// Cross-origin links seen on crawled pages. Only filled when external
    /// recording is enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<NormalizedUrl>,
    pub failures: Vec<PageFailure>,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

impl CrawlResult {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        NormalizedUrl::parse(url).is_some_and(|u| self.urls.contains(&u))
    }

    /// The discovered URLs as plain strings.
    pub fn url_strings(&self) -> Vec<String> {
        self.urls.iter().map(|u| u.as_str().to_string()).collect()
    }
}
