use crate::error::{Result, ScanError};
use crate::extract::extract_links;
use crate::fetch::{FetchConfig, FetchOutcome, HttpFetcher, PageFetcher};
use crate::frontier::{FrontierEntry, Insertion, VisitedSet};
use crate::normalize::{NormalizedUrl, normalize, normalize_relative};
use crate::result::{CrawlResult, PageFailure, StopReason};
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_MAX_URLS: usize = 200;
pub const DEFAULT_WORKERS: usize = 4;

/// Called with `(depth, url)` each time a page fetch starts.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Bounded, same-origin, breadth-first link discovery.
///
/// A crawl proceeds one depth level at a time. Within a level up to
/// `workers` fetches run concurrently, but their results are applied to the
/// visited set in frontier order, so a deterministic site always yields the
/// same URL order.
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    max_depth: usize,
    max_urls: usize,
    workers: usize,
    crawl_timeout: Option<Duration>,
    relative_links: bool,
    record_external: bool,
    progress_callback: Option<ProgressCallback>,
}

enum VisitOutcome {
    Links(Vec<NormalizedUrl>),
    Failed(String),
}

struct PageVisit {
    entry: FrontierEntry,
    outcome: VisitOutcome,
}

impl Crawler<HttpFetcher> {
    /// A crawler that fetches pages over HTTP.
    pub fn http(config: &FetchConfig) -> Result<Self> {
        Ok(Self::new(HttpFetcher::new(config)?))
    }
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            max_depth: DEFAULT_MAX_DEPTH,
            max_urls: DEFAULT_MAX_URLS,
            workers: DEFAULT_WORKERS,
            crawl_timeout: None,
            relative_links: false,
            record_external: false,
            progress_callback: None,
        }
    }

    /// Pages more than `depth - 1` hops from the seed are kept but not fetched.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_crawl_timeout(mut self, timeout: Duration) -> Self {
        self.crawl_timeout = Some(timeout);
        self
    }

    /// Also resolve page-relative links (`about.html`, `../x`).
    pub fn with_relative_links(mut self, enabled: bool) -> Self {
        self.relative_links = enabled;
        self
    }

    /// Keep cross-origin links in [`CrawlResult::external`] instead of
    /// dropping them. They are never followed either way. The external list
    /// is capped at `max_urls` entries of its own; later ones are dropped.
    pub fn with_record_external(mut self, enabled: bool) -> Self {
        self.record_external = enabled;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_urls(&self) -> usize {
        self.max_urls
    }

    /// Crawls from `seed`. Only an unusable seed is an error; every per-page
    /// failure is recorded in the result instead.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlResult> {
        let seed = NormalizedUrl::parse(seed)
            .ok_or_else(|| ScanError::InvalidSeed(seed.to_string()))?;

        info!(
            "Starting crawl of {} (max depth {}, max URLs {}, {} workers)",
            seed, self.max_depth, self.max_urls, self.workers
        );

        let deadline = self.crawl_timeout.map(|timeout| Instant::now() + timeout);
        let mut visited = VisitedSet::new();
        let mut external = VisitedSet::new();
        let mut failures = Vec::new();
        let mut pages_fetched = 0;
        let mut stop_reason = StopReason::FrontierExhausted;

        visited.insert_if_absent(&seed, self.max_urls);
        let mut frontier = VecDeque::from([FrontierEntry {
            url: seed.clone(),
            depth: 0,
        }]);

        'levels: while let Some(depth) = frontier.front().map(|entry| entry.depth) {
            if visited.is_full(self.max_urls) {
                stop_reason = StopReason::CapReached;
                break;
            }
            if depth >= self.max_depth {
                debug!("{} URL(s) at depth {} kept without fetching", frontier.len(), depth);
                break;
            }

            let level: Vec<FrontierEntry> = frontier.drain(..).collect();
            debug!("Processing {} URL(s) at depth {}", level.len(), depth);

            let mut visits = stream::iter(level)
                .map(|entry| self.visit(entry))
                .buffered(self.workers);

            loop {
                let next = match deadline {
                    Some(deadline) => match tokio::time::timeout_at(deadline, visits.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            warn!("Crawl timeout reached, returning partial results");
                            stop_reason = StopReason::TimedOut;
                            break 'levels;
                        }
                    },
                    None => visits.next().await,
                };
                let Some(PageVisit { entry, outcome }) = next else {
                    break;
                };

                let links = match outcome {
                    VisitOutcome::Links(links) => links,
                    VisitOutcome::Failed(reason) => {
                        failures.push(PageFailure {
                            url: entry.url,
                            depth: entry.depth,
                            reason,
                        });
                        continue;
                    }
                };
                pages_fetched += 1;

                for link in links {
                    if !link.same_origin(&seed) {
                        if self.record_external {
                            external.insert_if_absent(&link, self.max_urls);
                        }
                        continue;
                    }

                    match visited.insert_if_absent(&link, self.max_urls) {
                        Insertion::Inserted => {
                            debug!("Queued {} at depth {}", link, entry.depth + 1);
                            frontier.push_back(FrontierEntry {
                                url: link,
                                depth: entry.depth + 1,
                            });
                        }
                        Insertion::Duplicate => {}
                        Insertion::CapReached => {
                            info!("URL cap of {} reached", self.max_urls);
                            stop_reason = StopReason::CapReached;
                            break 'levels;
                        }
                    }
                }
            }
        }

        info!(
            "Crawl complete. {} URL(s) discovered, {} page(s) fetched, {} failure(s)",
            visited.len(),
            pages_fetched,
            failures.len()
        );

        Ok(CrawlResult {
            seed,
            urls: visited.into_vec(),
            external: external.into_vec(),
            failures,
            pages_fetched,
            stop_reason,
        })
    }

    async fn visit(&self, entry: FrontierEntry) -> PageVisit {
        if let Some(ref callback) = self.progress_callback {
            callback(entry.depth, entry.url.to_string());
        }

        let outcome = match self.fetcher.fetch(&entry.url).await {
            FetchOutcome::Html { body, final_url } => {
                VisitOutcome::Links(self.collect_links(&body, &entry.url, &final_url))
            }
            FetchOutcome::HttpFailure(status) => {
                warn!("Crawl error for {}: HTTP {}", entry.url, status);
                VisitOutcome::Failed(format!("HTTP {}", status))
            }
            FetchOutcome::NetworkFailure(reason) => {
                warn!("Crawl error for {}: {}", entry.url, reason);
                VisitOutcome::Failed(reason)
            }
        };

        PageVisit { entry, outcome }
    }

    /// Root-relative links resolve against the URL that was requested, so a
    /// redirect to another origin does not turn them into external links.
    /// Page-relative links resolve against the page actually served.
    fn collect_links(
        &self,
        body: &str,
        requested: &NormalizedUrl,
        page: &NormalizedUrl,
    ) -> Vec<NormalizedUrl> {
        extract_links(body)
            .filter_map(|raw| {
                let normalized = if self.relative_links && !raw.trim_start().starts_with('/') {
                    normalize_relative(&raw, page.as_url())
                } else {
                    normalize(&raw, requested.as_url())
                };
                if normalized.is_none() {
                    debug!("Discarding link {:?} on {}", raw, page);
                }
                normalized
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    /// In-memory site: page URL -> raw hrefs. Unknown pages answer 404.
    struct StaticSite {
        pages: HashMap<String, Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl StaticSite {
        fn new(pages: &[(&str, &[&str])]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, links)| {
                        (url.to_string(), links.iter().map(|l| l.to_string()).collect())
                    })
                    .collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticSite {
        async fn fetch(&self, url: &NormalizedUrl) -> FetchOutcome {
            self.fetched.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(links) => FetchOutcome::Html {
                    body: links
                        .iter()
                        .map(|l| format!("<a href=\"{}\">link</a>", l))
                        .collect(),
                    final_url: url.clone(),
                },
                None => FetchOutcome::HttpFailure(404),
            }
        }
    }

    fn url_set(result: &CrawlResult) -> HashSet<String> {
        result.url_strings().into_iter().collect()
    }

    fn html_page(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_bytes(body.into_bytes())
    }

    #[tokio::test]
    async fn test_same_origin_dedup_and_filtering() {
        let mock_server = MockServer::start().await;
        let links = format!(
            r#"<html><body>
                <a href="/about">About</a>
                <a href="{}/about#team">Team</a>
                <a href="https://external.com/x">External</a>
                <a href="mailto:a@b.com">Mail</a>
            </body></html>"#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(links.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;
        // At the depth limit: kept in the result, never fetched.
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(html_page(links))
            .expect(0)
            .mount(&mock_server)
            .await;

        let crawler = Crawler::http(&FetchConfig::default())
            .unwrap()
            .with_max_depth(1)
            .with_max_urls(200);
        let result = crawler.crawl(&mock_server.uri()).await.unwrap();

        let expected: HashSet<String> = [
            format!("{}/", mock_server.uri()),
            format!("{}/about", mock_server.uri()),
        ]
        .into_iter()
        .collect();
        assert_eq!(url_set(&result), expected);
        assert!(result.external.is_empty());
        assert_eq!(result.stop_reason, StopReason::FrontierExhausted);
    }

    #[tokio::test]
    async fn test_seed_http_error_yields_seed_only() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let crawler = Crawler::http(&FetchConfig::default()).unwrap();
        let result = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(result.url_strings(), vec![format!("{}/", mock_server.uri())]);
        assert_eq!(result.pages_fetched, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, "HTTP 404");
    }

    #[tokio::test]
    async fn test_max_urls_one_does_not_expand() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(r#"<a href="/a">a</a><a href="/b">b</a>"#.to_string()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let crawler = Crawler::http(&FetchConfig::default())
            .unwrap()
            .with_max_urls(1);
        let result = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.stop_reason, StopReason::CapReached);
    }

    #[tokio::test]
    async fn test_network_failure_does_not_abort_crawl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(r#"<a href="/slow">s</a><a href="/fine">f</a>"#.to_string()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html_page(String::new()).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fine"))
            .respond_with(html_page(r#"<a href="/deeper">d</a>"#.to_string()))
            .mount(&mock_server)
            .await;

        let config = FetchConfig::default().with_timeout(Duration::from_millis(300));
        let crawler = Crawler::http(&config).unwrap().with_max_depth(3);
        let result = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert!(result.contains(&format!("{}/slow", mock_server.uri())));
        assert!(result.contains(&format!("{}/fine", mock_server.uri())));
        assert!(result.contains(&format!("{}/deeper", mock_server.uri())));
        assert!(
            result
                .failures
                .iter()
                .any(|f| f.url.as_str().ends_with("/slow"))
        );
    }

    #[tokio::test]
    async fn test_invalid_seed_is_fatal() {
        let crawler = Crawler::new(StaticSite::new(&[]));
        for seed in ["not a url", "/relative", "mailto:a@b.com", "ftp://example.com/"] {
            let err = crawler.crawl(seed).await.unwrap_err();
            assert!(matches!(err, ScanError::InvalidSeed(_)), "{}", seed);
        }
    }

    #[tokio::test]
    async fn test_depth_bound_on_chain() {
        let site = StaticSite::new(&[
            ("https://example.com/", &["/1"]),
            ("https://example.com/1", &["/2"]),
            ("https://example.com/2", &["/3"]),
            ("https://example.com/3", &["/4"]),
        ]);
        let crawler = Crawler::new(site).with_max_depth(2);
        let result = crawler.crawl("https://example.com").await.unwrap();

        assert_eq!(
            result.url_strings(),
            vec![
                "https://example.com/",
                "https://example.com/1",
                "https://example.com/2"
            ]
        );
        assert_eq!(
            crawler.fetcher.fetched(),
            vec!["https://example.com/", "https://example.com/1"]
        );
    }

    #[tokio::test]
    async fn test_depth_uses_shortest_hop_distance() {
        // /far is reachable in 3 hops via /a -> /b, but in 1 hop from the seed.
        let site = StaticSite::new(&[
            ("https://example.com/", &["/a", "/far"]),
            ("https://example.com/a", &["/b"]),
            ("https://example.com/b", &["/far"]),
            ("https://example.com/far", &["/beyond"]),
        ]);
        let hops: HashMap<&str, usize> = [
            ("https://example.com/", 0),
            ("https://example.com/a", 1),
            ("https://example.com/far", 1),
            ("https://example.com/b", 2),
            ("https://example.com/beyond", 2),
        ]
        .into_iter()
        .collect();

        let max_depth = 2;
        let crawler = Crawler::new(site).with_max_depth(max_depth).with_workers(3);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(result.len(), hops.len());
        for url in result.url_strings() {
            assert!(hops[url.as_str()] <= max_depth, "{} beyond depth", url);
        }
    }

    #[tokio::test]
    async fn test_max_depth_zero_fetches_nothing() {
        let site = StaticSite::new(&[("https://example.com/", &["/a"])]);
        let crawler = Crawler::new(site).with_max_depth(0);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(result.url_strings(), vec!["https://example.com/"]);
        assert!(crawler.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_count_bound() {
        let links: Vec<String> = (0..50).map(|i| format!("/page{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let site = StaticSite::new(&[("https://example.com/", &link_refs)]);

        let crawler = Crawler::new(site).with_max_depth(5).with_max_urls(10);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(result.len(), 10);
        assert_eq!(result.stop_reason, StopReason::CapReached);
        assert_eq!(result.urls[1].as_str(), "https://example.com/page0");
        assert_eq!(result.urls[9].as_str(), "https://example.com/page8");
    }

    #[tokio::test]
    async fn test_equivalent_hrefs_coalesce() {
        let site = StaticSite::new(&[
            (
                "https://example.com/",
                &[
                    "/about",
                    "https://example.com/about",
                    "https://example.com/about#team",
                    "/page#section1",
                    "/page#section2",
                ],
            ),
            ("https://example.com/about", &["/", "/page#top"]),
            ("https://example.com/page", &[]),
        ]);
        let crawler = Crawler::new(site).with_max_depth(3);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(
            result.url_strings(),
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/page"
            ]
        );
        assert_eq!(result.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_result_order_is_reproducible_with_workers() {
        let pages: &[(&str, &[&str])] = &[
            ("https://example.com/", &["/c", "/a", "/b"]),
            ("https://example.com/a", &["/a1", "/a2"]),
            ("https://example.com/b", &["/b1"]),
            ("https://example.com/c", &["/c1", "/a1"]),
        ];

        let first = Crawler::new(StaticSite::new(pages))
            .with_workers(4)
            .with_max_depth(3)
            .crawl("https://example.com/")
            .await
            .unwrap();
        let second = Crawler::new(StaticSite::new(pages))
            .with_workers(1)
            .with_max_depth(3)
            .crawl("https://example.com/")
            .await
            .unwrap();

        assert_eq!(first.url_strings(), second.url_strings());
        assert_eq!(
            first.url_strings(),
            vec![
                "https://example.com/",
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c1",
                "https://example.com/a1",
                "https://example.com/a2",
                "https://example.com/b1",
            ]
        );
    }

    #[tokio::test]
    async fn test_records_external_links_when_enabled() {
        let site = StaticSite::new(&[(
            "https://example.com/",
            &["https://external.com/x", "http://example.com/insecure", "/local"],
        )]);
        let crawler = Crawler::new(site).with_max_depth(1).with_record_external(true);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(
            result.url_strings(),
            vec!["https://example.com/", "https://example.com/local"]
        );
        let external: Vec<&str> = result.external.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            external,
            vec!["https://external.com/x", "http://example.com/insecure"]
        );
    }

    #[tokio::test]
    async fn test_relative_links_only_when_enabled() {
        let pages: &[(&str, &[&str])] = &[("https://example.com/docs/", &["intro.html", "../top"])];

        let strict = Crawler::new(StaticSite::new(pages))
            .crawl("https://example.com/docs/")
            .await
            .unwrap();
        assert_eq!(strict.len(), 1);

        let relaxed = Crawler::new(StaticSite::new(pages))
            .with_relative_links(true)
            .crawl("https://example.com/docs/")
            .await
            .unwrap();
        assert_eq!(
            relaxed.url_strings(),
            vec![
                "https://example.com/docs/",
                "https://example.com/docs/intro.html",
                "https://example.com/top"
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_timeout_returns_partial_result() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(r#"<a href="/slow">s</a>"#.to_string()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                html_page(r#"<a href="/never">n</a>"#.to_string())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let crawler = Crawler::http(&FetchConfig::default())
            .unwrap()
            .with_max_depth(3)
            .with_crawl_timeout(Duration::from_millis(500));
        let result = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(result.stop_reason, StopReason::TimedOut);
        assert!(result.contains(&format!("{}/slow", mock_server.uri())));
        assert!(!result.contains(&format!("{}/never", mock_server.uri())));
    }

    #[tokio::test]
    async fn test_root_relative_links_survive_cross_origin_redirect() {
        let mock_server = MockServer::start().await;
        let port = mock_server.address().port();
        let seed = format!("http://127.0.0.1:{}/", port);

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("http://localhost:{}/home", port).as_str()),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(html_page(r#"<a href="/about">About</a>"#.to_string()))
            .mount(&mock_server)
            .await;

        let crawler = Crawler::http(&FetchConfig::default())
            .unwrap()
            .with_max_depth(1);
        let result = crawler.crawl(&seed).await.unwrap();

        assert_eq!(result.pages_fetched, 1);
        assert_eq!(
            result.url_strings(),
            vec![seed.clone(), format!("http://127.0.0.1:{}/about", port)]
        );
    }

    /// Answers every page with a fixed link list after a short pause, and
    /// tracks how many fetches are in flight at once.
    struct CountingSite {
        links: Vec<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for CountingSite {
        async fn fetch(&self, url: &NormalizedUrl) -> FetchOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let body = if url.as_str() == "https://example.com/" {
                self.links
                    .iter()
                    .map(|l| format!("<a href=\"{}\">link</a>", l))
                    .collect()
            } else {
                String::new()
            };
            FetchOutcome::Html {
                body,
                final_url: url.clone(),
            }
        }
    }

    #[tokio::test]
    async fn test_workers_bound_concurrent_fetches() {
        let site = CountingSite {
            links: (0..12).map(|i| format!("/p{}", i)).collect(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let crawler = Crawler::new(site).with_max_depth(2).with_workers(3);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(result.pages_fetched, 13);
        let peak = crawler.fetcher.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak of {} fetches exceeds 3 workers", peak);
        assert!(peak > 1, "fetches never overlapped");
    }

    #[tokio::test]
    async fn test_external_list_is_capped() {
        let links: Vec<String> = (0..10).map(|i| format!("https://other{}.com/", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let site = StaticSite::new(&[("https://example.com/", &link_refs)]);

        let crawler = Crawler::new(site)
            .with_max_depth(1)
            .with_max_urls(4)
            .with_record_external(true);
        let result = crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(result.url_strings(), vec!["https://example.com/"]);
        assert_eq!(result.external.len(), 4);
        assert_eq!(result.external[3].as_str(), "https://other3.com/");
    }

    #[tokio::test]
    async fn test_progress_callback_sees_each_fetch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let site = StaticSite::new(&[
            ("https://example.com/", &["/a"]),
            ("https://example.com/a", &[]),
        ]);

        let crawler = Crawler::new(site)
            .with_max_depth(2)
            .with_progress_callback(Arc::new(move |depth, url| {
                seen_clone.lock().unwrap().push((depth, url));
            }));
        crawler.crawl("https://example.com/").await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (0, "https://example.com/".to_string()),
                (1, "https://example.com/a".to_string())
            ]
        );
    }
}
