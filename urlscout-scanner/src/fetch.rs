use crate::error::Result;
use crate::normalize::NormalizedUrl;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_USER_AGENT: &str = concat!(
    "urlscout/",
    env!("CARGO_PKG_VERSION"),
    " (URL inventory crawler)"
);

/// What happened when a single page was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was retrieved. `final_url` is the URL after redirects.
    Html {
        body: String,
        final_url: NormalizedUrl,
    },
    /// The server answered with a status of 400 or above.
    HttpFailure(u16),
    /// Timeout, DNS, connection, TLS, redirect-limit or body read failure.
    NetworkFailure(String),
}

/// Source of page bodies for the crawl engine.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &NormalizedUrl) -> FetchOutcome;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds a reqwest client honouring this configuration.
    pub fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .build()?;
        Ok(client)
    }
}

/// [`PageFetcher`] backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &NormalizedUrl) -> FetchOutcome {
        debug!("Fetching {}", url);

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::NetworkFailure(describe_error(&e)),
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return FetchOutcome::HttpFailure(status.as_u16());
        }

        let final_url = NormalizedUrl::from_url(response.url().clone())
            .unwrap_or_else(|| url.clone());

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        if !is_html {
            debug!("Skipping body of non-HTML response {}", final_url);
            return FetchOutcome::Html {
                body: String::new(),
                final_url,
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Html { body, final_url },
            Err(e) => FetchOutcome::NetworkFailure(describe_error(&e)),
        }
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
