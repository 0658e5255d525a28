//! Image probes
//!
//! [`ImageProbe`] issues the HEAD and GET requests used to decide whether a
//! candidate URL serves a real image. [`HttpImageProbe`] is the reqwest
//! implementation; tests swap in their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect, Client, Method, StatusCode};
use tracing::{debug, trace};

use crate::config::ScraperConfig;
use crate::error::ScrapeError;

/// Smallest Content-Length a HEAD probe must report to be accepted on its own.
pub const DEFAULT_MIN_IMAGE_BYTES: u64 = 128;

const MAX_REDIRECTS: usize = 10;

/// The parts of a probe response the acceptance policy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl ProbeResponse {
    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image"))
    }

    /// HEAD acceptance: success, image content type, and a declared length of
    /// at least `min_bytes`.
    pub fn accepts_head(&self, min_bytes: u64) -> bool {
        self.status.is_success()
            && self.is_image()
            && self.content_length.is_some_and(|len| len >= min_bytes)
    }

    /// GET acceptance: success and an image content type, any length.
    pub fn accepts_get(&self) -> bool {
        self.status.is_success() && self.is_image()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("probe transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Metadata-only request
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError>;

    /// Full fetch, used when HEAD is inconclusive
    async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError>;
}

/// Decide one candidate: HEAD first, GET when HEAD does not qualify or fails.
/// Probe errors count as rejection and are never returned.
pub async fn validate_candidate(probe: &dyn ImageProbe, url: &str, min_bytes: u64) -> bool {
    match probe.head(url).await {
        Ok(resp) if resp.accepts_head(min_bytes) => return true,
        Ok(resp) => debug!(url, status = %resp.status, "HEAD inconclusive, trying GET"),
        Err(e) => debug!(url, error = %e, "HEAD failed, trying GET"),
    }

    match probe.get(url).await {
        Ok(resp) => {
            let accepted = resp.accepts_get();
            debug!(url, status = %resp.status, accepted, "GET probe");
            accepted
        }
        Err(e) => {
            debug!(url, error = %e, "GET failed, dropping candidate");
            false
        }
    }
}

/// reqwest-backed probe. Redirects are followed and every request carries
/// its own timeout.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
    timeout: Duration,
}

impl HttpImageProbe {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(user_agent_headers(user_agent)?)
            .build()?;

        Ok(Self::with_client(client, timeout))
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Self::new(&config.probe_user_agent, config.probe_timeout)
    }

    /// Use a preconfigured client; `timeout` still applies per request.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn send(&self, method: Method, url: &str) -> Result<ProbeResponse, ProbeError> {
        let resp = self
            .client
            .request(method.clone(), url)
            .timeout(self.timeout)
            .send()
            .await?;

        let headers = resp.headers();
        let probe = ProbeResponse {
            status: resp.status(),
            content_type: header_str(headers, CONTENT_TYPE.as_str()),
            content_length: header_str(headers, CONTENT_LENGTH.as_str())
                .and_then(|v| v.parse::<u64>().ok()),
        };
        trace!(url, %method, status = %probe.status, "probe response");
        Ok(probe)
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        self.send(Method::HEAD, url).await
    }

    async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        self.send(Method::GET, url).await
    }
}

fn user_agent_headers(user_agent: &str) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    let value = user_agent
        .parse()
        .map_err(|_| ScrapeError::Config(format!("invalid user agent: {:?}", user_agent)))?;
    headers.insert(USER_AGENT, value);
    Ok(headers)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}
