//! Fetch gateway
//!
//! This module defines the capability the crawl controller fetches pages
//! through, and its HTTP implementation:
//! - Building the HTTP client with the configured user agent and timeout
//! - Pacing request starts by the configured download delay
//! - Following redirects and reporting the final URL
//! - Classifying transport and status failures

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Per-request options passed to the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Render client-side JavaScript before returning
    pub render_js: bool,

    /// Wait after DOM-ready before capturing the page
    pub settle_delay: Duration,
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL after redirects
    pub final_url: Url,
    pub status_code: u16,
    pub body: String,
    pub headers: HeaderMap,
}

/// Fetch-level failure; every variant is eligible for retry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error
    pub fn from_reqwest(url: &Url, error: &reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else if error.is_redirect() {
            Self::RedirectLimit { url }
        } else if error.is_body() || error.is_decode() {
            Self::Body {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Network {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// Capability the controller fetches pages through
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use disaster_crawl::config::FetchConfig;
/// use disaster_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .connect_timeout(Duration::from_millis(config.request_timeout_ms))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP fetch gateway
///
/// Pages are returned as served; there is no JavaScript engine, so the
/// render hint is accepted but only logged and the settle delay is skipped.
pub struct HttpFetcher {
    client: Client,
    download_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            Duration::from_millis(config.download_delay_ms),
        ))
    }

    pub fn with_client(client: Client, download_delay: Duration) -> Self {
        Self {
            client,
            download_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until at least `download_delay` has passed since the last request start
    async fn pace(&self) {
        if self.download_delay.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.download_delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchResponse, FetchError> {
        if options.render_js {
            tracing::trace!(
                "Rendering requested for {} (settle {:?}); serving raw HTML",
                url,
                options.settle_delay
            );
        }

        self.pace().await;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchResponse {
            final_url,
            status_code: status.as_u16(),
            body,
            headers,
        })
    }
}
