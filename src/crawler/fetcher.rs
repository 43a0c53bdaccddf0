//! Listing page fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Opening the HTTP session used for a whole crawl
//! - The [`Fetch`] capability the crawl loop is written against
//! - Converting transport failures into an absent page

use crate::config::ScraperConfig;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors a [`Fetch`] implementation can report
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The capability itself is unusable; not tied to a single request
    #[error("Session error: {0}")]
    Session(String),
}

impl FetchError {
    /// Whether this failure concerns a single request only
    pub fn is_transport(&self) -> bool {
        !matches!(self, FetchError::Session(_))
    }

    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Capability to retrieve one URL as raw bytes
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Issues a single request bounded by `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// The network session shared by every request of one crawl
///
/// Connections are pooled by the inner client and released when the session
/// is dropped.
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    /// Opens a session sending the configured user agent
    ///
    /// # Example
    ///
    /// ```no_run
    /// use storefront_harvest::config::ScraperConfig;
    /// use storefront_harvest::crawler::HttpSession;
    ///
    /// let session = HttpSession::open(&ScraperConfig::default()).unwrap();
    /// ```
    pub fn open(config: &ScraperConfig) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        tracing::debug!("HTTP session opened");
        Ok(Self { client })
    }
}

impl Fetch for HttpSession {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(body.to_vec())
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::debug!("HTTP session closed");
    }
}

/// Fetches one listing page, turning transport failures into `None`
///
/// # Returns
///
/// * `Ok(Some(body))` - Page retrieved
/// * `Ok(None)` - Timeout, connection failure, non-2xx status or body error;
///   already logged
/// * `Err(HarvestError)` - The session itself failed
pub async fn fetch_page<F: Fetch>(
    session: &F,
    url: &str,
    timeout: Duration,
) -> Result<Option<Vec<u8>>, HarvestError> {
    match session.fetch(url, timeout).await {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.is_transport() => {
            tracing::error!("Error fetching URL {}: {}", url, e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
