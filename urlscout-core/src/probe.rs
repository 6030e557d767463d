// Liveness probing for a list of URLs (crawled or supplied by hand)

use crate::error::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Method, StatusCode};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use urlscout_scanner::fetch::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Why a probe never got an HTTP status back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Dns,
    Connect,
    TooManyRedirects,
    InvalidUrl,
    Other,
}

impl NetworkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Dns => "dns",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::TooManyRedirects => "too_many_redirects",
            NetworkErrorKind::InvalidUrl => "invalid_url",
            NetworkErrorKind::Other => "other",
        }
    }
}

/// Classification of one probe. Exactly one of three buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Final status in 200..=399.
    Ok(u16),
    /// Any other final status.
    HttpError(u16),
    NetworkError(NetworkErrorKind),
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            ProbeOutcome::Ok(status)
        } else {
            ProbeOutcome::HttpError(status)
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Ok(status) | ProbeOutcome::HttpError(status) => Some(*status),
            ProbeOutcome::NetworkError(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProbeOutcome::Ok(_) => "ok",
            ProbeOutcome::HttpError(_) => "http_error",
            ProbeOutcome::NetworkError(_) => "network_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// The URL as supplied, before any proxy rewriting.
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The numeric status, or `Error` when no status was received.
    pub fn status_label(&self) -> String {
        match self.outcome.status_code() {
            Some(status) => status.to_string(),
            None => "Error".to_string(),
        }
    }

    /// `(url, status)` for tabular export.
    pub fn to_row(&self) -> (String, String) {
        (self.url.clone(), self.status_label())
    }
}

impl Serialize for ProbeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProbeResult", 4)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("status", &self.outcome.status_code())?;
        state.serialize_field("outcome", self.outcome.kind())?;
        match self.outcome {
            ProbeOutcome::NetworkError(kind) => state.serialize_field("error", kind.as_str())?,
            _ => state.skip_field("error")?,
        }
        state.end()
    }
}

/// Called after each probe completes, in completion order.
pub type ProbeProgressCallback = Arc<dyn Fn(&ProbeResult) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Prepended verbatim to every URL before dispatch.
    pub proxy_prefix: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_prefix: None,
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy_prefix(mut self, prefix: Option<String>) -> Self {
        self.proxy_prefix = prefix.filter(|p| !p.is_empty());
        self
    }
}

/// Issues lightweight existence checks.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    proxy_prefix: Option<String>,
    progress_callback: Option<ProbeProgressCallback>,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(50)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            proxy_prefix: config.proxy_prefix.clone(),
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProbeProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The URL actually requested for `url`.
    pub fn dispatch_url(&self, url: &str) -> String {
        match self.proxy_prefix {
            Some(ref prefix) => format!("{}{}", prefix, url),
            None => url.to_string(),
        }
    }

    /// Probes every URL with at most `concurrency_limit` requests in flight.
    /// Output order matches input order.
    pub async fn probe_all(&self, urls: Vec<String>, concurrency_limit: usize) -> Vec<ProbeResult> {
        let limit = concurrency_limit.max(1);
        debug!("Probing {} URL(s) with concurrency {}", urls.len(), limit);

        stream::iter(urls)
            .map(|url| async move {
                let result = self.probe(url).await;
                if let Some(ref callback) = self.progress_callback {
                    callback(&result);
                }
                result
            })
            .buffered(limit)
            .collect()
            .await
    }

    pub async fn probe(&self, url: String) -> ProbeResult {
        let target = self.dispatch_url(&url);
        let outcome = self.probe_target(&target).await;
        if !outcome.is_ok() {
            warn!("Probe of {} failed: {:?}", url, outcome);
        }
        ProbeResult { url, outcome }
    }

    async fn probe_target(&self, target: &str) -> ProbeOutcome {
        if Url::parse(target).is_err() {
            return ProbeOutcome::NetworkError(NetworkErrorKind::InvalidUrl);
        }

        match self.send(Method::HEAD, target).await {
            Ok(status)
                if status == StatusCode::METHOD_NOT_ALLOWED
                    || status == StatusCode::NOT_IMPLEMENTED =>
            {
                debug!("HEAD not supported by {}, retrying with GET", target);
                match self.send(Method::GET, target).await {
                    Ok(status) => ProbeOutcome::from_status(status.as_u16()),
                    Err(e) => ProbeOutcome::NetworkError(categorize_error(&e)),
                }
            }
            Ok(status) => ProbeOutcome::from_status(status.as_u16()),
            Err(e) => ProbeOutcome::NetworkError(categorize_error(&e)),
        }
    }

    // The response is dropped unread, so a GET fallback never downloads the body.
    async fn send(&self, method: Method, target: &str) -> std::result::Result<StatusCode, reqwest::Error> {
        let response = self.client.request(method, target).send().await?;
        Ok(response.status())
    }
}

/// Convenience wrapper: build a [`Prober`] from `config` and probe `urls`.
pub async fn probe_all(
    urls: Vec<String>,
    concurrency_limit: usize,
    config: &ProbeConfig,
) -> Result<Vec<ProbeResult>> {
    let prober = Prober::new(config)?;
    Ok(prober.probe_all(urls, concurrency_limit).await)
}

/// Probe `urls`, drawing a progress bar on stderr when `show_progress_bars` is set.
pub async fn execute_check(
    urls: Vec<String>,
    concurrency_limit: usize,
    config: &ProbeConfig,
    show_progress_bars: bool,
) -> Result<Vec<ProbeResult>> {
    let mut prober = Prober::new(config)?;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(urls.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        let callback_bar = pb.clone();
        prober = prober.with_progress_callback(Arc::new(move |result: &ProbeResult| {
            callback_bar.set_message(result.url.clone());
            callback_bar.inc(1);
        }));
        Some(pb)
    } else {
        None
    };

    let results = prober.probe_all(urls, concurrency_limit).await;

    if let Some(pb) = progress_bar {
        let ok = results.iter().filter(|r| r.is_ok()).count();
        pb.finish_with_message(format!("{} of {} reachable", ok, results.len()));
    }

    Ok(results)
}

fn categorize_error(error: &reqwest::Error) -> NetworkErrorKind {
    if error.is_timeout() {
        NetworkErrorKind::Timeout
    } else if error.is_redirect() {
        NetworkErrorKind::TooManyRedirects
    } else if error.is_builder() {
        NetworkErrorKind::InvalidUrl
    } else if error.is_connect() {
        if error_chain_mentions(error, "dns") {
            NetworkErrorKind::Dns
        } else {
            NetworkErrorKind::Connect
        }
    } else {
        NetworkErrorKind::Other
    }
}

fn error_chain_mentions(error: &reqwest::Error, needle: &str) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(err) = source {
        if err.to_string().to_lowercase().contains(needle) {
            return true;
        }
        source = err.source();
    }
    false
}
