//! Static HTML renderer over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect, Client};
use tracing::{debug, warn};
use url::Url;

use super::{has_ready_signal, DomSnapshot, PageRenderer};
use crate::config::ScraperConfig;
use crate::error::{RenderError, ScrapeError};

/// Fetches the server-rendered HTML with a plain GET. Nothing is executed,
/// so subresources are never loaded and "read more" content is whatever the
/// server already sent.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| ScrapeError::Config(format!("invalid user agent: {:?}", user_agent)))?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("vi-VN,vi;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Self::new(&config.page_user_agent)
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &Url) -> Result<DomSnapshot, RenderError> {
        let resp = self.client.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RenderError::HttpStatus { status });
        }

        let final_url = resp.url().clone();
        let html = resp.text().await?;
        Ok(DomSnapshot { url: final_url, html })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &Url, navigation_timeout: Duration) -> Result<DomSnapshot, RenderError> {
        debug!(%url, "fetching listing page");

        let snapshot = tokio::time::timeout(navigation_timeout, self.fetch(url))
            .await
            .map_err(|_| RenderError::Timeout(navigation_timeout))??;

        if !has_ready_signal(&snapshot.html) {
            warn!(url = %snapshot.url, "no readiness selector in page, extracting anyway");
        }
        debug!(url = %snapshot.url, bytes = snapshot.html.len(), "page fetched");
        Ok(snapshot)
    }
}
