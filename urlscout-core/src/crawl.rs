use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;
use urlscout_scanner::crawler::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_URLS, DEFAULT_WORKERS};
use urlscout_scanner::{CrawlResult, Crawler, FetchConfig};

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: String,
    pub max_depth: usize,
    pub max_urls: usize,
    pub workers: usize,
    pub fetch: FetchConfig,
    pub crawl_timeout: Option<Duration>,
    pub relative_links: bool,
    pub record_external: bool,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_urls: DEFAULT_MAX_URLS,
            workers: DEFAULT_WORKERS,
            fetch: FetchConfig::default(),
            crawl_timeout: None,
            relative_links: false,
            record_external: false,
            show_progress_bars: false,
        }
    }
}

impl CrawlOptions {
    pub fn for_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }
}

/// Callback for reporting crawl progress messages
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let mut path = u.path().to_string();
            if path.is_empty() {
                path.push('/');
            }
            if let Some(query) = u.query() {
                path.push('?');
                path.push_str(query);
            }
            path
        })
        .unwrap_or_else(|| url.to_string())
}

/// Run a single-seed crawl, optionally drawing a spinner on stderr.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlResult> {
    let CrawlOptions {
        seed,
        max_depth,
        max_urls,
        workers,
        fetch,
        crawl_timeout,
        relative_links,
        record_external,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Starting crawl...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let fetched = Arc::new(AtomicUsize::new(0));
    let internal_progress: urlscout_scanner::ProgressCallback = {
        let pb = progress_bar.clone();
        let fetched = fetched.clone();
        let external = progress_callback.clone();
        Arc::new(move |depth: usize, url: String| {
            let count = fetched.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb {
                pb.set_message(format!(
                    "Crawling... {} pages fetched (depth {}) {}",
                    count,
                    depth,
                    extract_url_path(&url)
                ));
            }
            if let Some(ref callback) = external {
                callback(format!("[depth {}] {}", depth, url));
            }
        })
    };

    let mut crawler = Crawler::http(&fetch)?
        .with_max_depth(max_depth)
        .with_max_urls(max_urls)
        .with_workers(workers)
        .with_relative_links(relative_links)
        .with_record_external(record_external)
        .with_progress_callback(internal_progress);

    if let Some(timeout) = crawl_timeout {
        crawler = crawler.with_crawl_timeout(timeout);
    }

    let outcome = crawler.crawl(&seed).await;

    if let Some(ref pb) = progress_bar {
        match outcome {
            Ok(ref result) => pb.finish_with_message(format!(
                "Crawl complete! {} URLs found, {} pages fetched",
                result.len(),
                result.pages_fetched
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    Ok(outcome?)
}
