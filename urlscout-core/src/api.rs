// Request and response shapes shared by the HTTP API and anything else that
// wants the crawl result as a plain status + JSON body.

use crate::probe::{DEFAULT_CONCURRENCY, ProbeConfig, ProbeResult, Prober};
use crate::report::ProbeSummary;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use urlscout_scanner::crawler::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_URLS};
use urlscout_scanner::{Crawler, FetchConfig, ScanError};

/// Server-side ceilings on what a client may ask for. Larger requested
/// values are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiLimits {
    pub max_depth: usize,
    pub max_urls: usize,
    pub max_concurrency: usize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_urls: 1000,
            max_concurrency: 50,
        }
    }
}

impl ApiLimits {
    pub fn depth(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(DEFAULT_MAX_DEPTH).min(self.max_depth)
    }

    pub fn urls(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(DEFAULT_MAX_URLS).min(self.max_urls)
    }

    pub fn concurrency(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(DEFAULT_CONCURRENCY)
            .min(self.max_concurrency)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlRequest {
    pub url: Option<String>,
    pub depth: Option<usize>,
    pub max_urls: Option<usize>,
}

impl CrawlRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Serialised as `{"links": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CrawlResponse {
    Links { links: Vec<String> },
    Error { error: String },
}

impl CrawlResponse {
    fn error(message: &str) -> Self {
        CrawlResponse::Error {
            error: message.to_string(),
        }
    }
}

/// Crawl the requested seed and map the outcome to a status code and body:
/// 400 when the seed is missing or unusable, 500 when the HTTP client cannot
/// be set up, 200 with the discovered URLs otherwise. Depth and URL cap are
/// clamped to `limits`.
pub async fn handle_crawl_request(
    request: &CrawlRequest,
    config: &FetchConfig,
    limits: &ApiLimits,
) -> (u16, CrawlResponse) {
    let Some(seed) = request.url.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return (400, CrawlResponse::error("Missing URL"));
    };

    let crawler = match Crawler::http(config) {
        Ok(crawler) => crawler
            .with_max_depth(limits.depth(request.depth))
            .with_max_urls(limits.urls(request.max_urls)),
        Err(e) => {
            error!("Crawl error: {}", e);
            return (500, CrawlResponse::error("Failed to crawl domain"));
        }
    };

    match crawler.crawl(seed).await {
        Ok(result) => {
            info!("Crawl of {} returned {} URL(s)", seed, result.len());
            (
                200,
                CrawlResponse::Links {
                    links: result.url_strings(),
                },
            )
        }
        Err(ScanError::InvalidSeed(_)) => (400, CrawlResponse::error("Invalid URL")),
        Err(e) => {
            error!("Crawl error: {}", e);
            (500, CrawlResponse::error("Failed to crawl domain"))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    pub proxy: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeResponse {
    Results {
        summary: ProbeSummary,
        results: Vec<ProbeResult>,
    },
    Error {
        error: String,
    },
}

/// Probe the requested URLs; 400 when none were supplied. Concurrency is
/// clamped to `limits`.
pub async fn handle_probe_request(
    request: ProbeRequest,
    config: &ProbeConfig,
    limits: &ApiLimits,
) -> (u16, ProbeResponse) {
    let urls: Vec<String> = request
        .urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        return (
            400,
            ProbeResponse::Error {
                error: "Missing URLs".to_string(),
            },
        );
    }

    let config = config.clone().with_proxy_prefix(request.proxy.or(config.proxy_prefix.clone()));
    let prober = match Prober::new(&config) {
        Ok(prober) => prober,
        Err(e) => {
            error!("Probe error: {}", e);
            return (
                500,
                ProbeResponse::Error {
                    error: "Failed to check URLs".to_string(),
                },
            );
        }
    };

    let results = prober
        .probe_all(urls, limits.concurrency(request.concurrency))
        .await;
    (
        200,
        ProbeResponse::Results {
            summary: ProbeSummary::from_results(&results),
            results,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shapes() {
        let links = CrawlResponse::Links {
            links: vec!["https://example.com/".to_string()],
        };
        assert_eq!(
            serde_json::to_string(&links).unwrap(),
            r#"{"links":["https://example.com/"]}"#
        );
        assert_eq!(
            serde_json::to_string(&CrawlResponse::error("Missing URL")).unwrap(),
            r#"{"error":"Missing URL"}"#
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let config = FetchConfig::default();
        let (status, body) = handle_crawl_request(&CrawlRequest::default(), &config, &ApiLimits::default()).await;
        assert_eq!(status, 400);
        assert_eq!(body, CrawlResponse::error("Missing URL"));

        let (status, _) = handle_crawl_request(&CrawlRequest::for_url("   "), &config, &ApiLimits::default())
                .await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_invalid_seed_is_bad_request() {
        let (status, body) = handle_crawl_request(
            &CrawlRequest::for_url("not a url"),
            &FetchConfig::default(),
            &ApiLimits::default(),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body, CrawlResponse::error("Invalid URL"));
    }

    #[tokio::test]
    async fn test_empty_probe_request_is_bad_request() {
        let (status, _) = handle_probe_request(
            ProbeRequest::default(),
            &ProbeConfig::default(),
            &ApiLimits::default(),
        )
        .await;
        assert_eq!(status, 400);
    }

    #[test]
    fn test_limits_clamp_requested_values() {
        let limits = ApiLimits {
            max_depth: 3,
            max_urls: 100,
            max_concurrency: 8,
        };
        assert_eq!(limits.depth(Some(50)), 3);
        assert_eq!(limits.depth(Some(1)), 1);
        assert_eq!(limits.depth(None), DEFAULT_MAX_DEPTH);
        assert_eq!(limits.urls(Some(usize::MAX)), 100);
        assert_eq!(limits.urls(None), 100);
        assert_eq!(limits.concurrency(Some(10_000)), 8);
        assert_eq!(limits.concurrency(Some(2)), 2);
        assert_eq!(limits.concurrency(None), 8);
    }

    #[tokio::test]
    async fn test_client_build_failure_is_server_error() {
        let config = ProbeConfig {
            user_agent: "bad\nagent".to_string(),
            ..ProbeConfig::default()
        };
        let request = ProbeRequest {
            urls: vec!["https://example.com/".to_string()],
            ..ProbeRequest::default()
        };
        let (status, _) = handle_probe_request(request, &config, &ApiLimits::default()).await;
        assert_eq!(status, 500);
    }
}
