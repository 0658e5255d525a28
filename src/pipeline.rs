//! The listing pipeline: validate URL, render, extract, normalize, resolve
//! images. Only URL rejection and render failure abort a scrape; everything
//! finer-grained degrades into absent fields or dropped images.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extractors::extract_fields;
use crate::images::{HttpImageProbe, ImageProbe, ImageResolver};
use crate::normalize::normalize;
use crate::record::ListingRecord;
use crate::render::{HttpRenderer, PageRenderer};
use crate::site::parse_listing_url;

pub struct ListingScraper {
    config: ScraperConfig,
    renderer: Arc<dyn PageRenderer>,
    resolver: ImageResolver,
}

impl ListingScraper {
    /// Scraper with the HTTP renderer and reqwest image probe.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let renderer = Arc::new(HttpRenderer::from_config(&config)?);
        let probe = Arc::new(HttpImageProbe::from_config(&config)?);
        Ok(Self::with_components(config, renderer, probe))
    }

    /// Scraper with caller-supplied rendering and probing.
    pub fn with_components(
        config: ScraperConfig,
        renderer: Arc<dyn PageRenderer>,
        probe: Arc<dyn ImageProbe>,
    ) -> Self {
        let resolver = ImageResolver::new(probe, config.image_concurrency)
            .with_min_bytes(config.min_image_bytes);
        Self {
            config,
            renderer,
            resolver,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Scrape one listing, bounded by the configured request timeout.
    pub async fn scrape(&self, url: &str) -> Result<ListingRecord, ScrapeError> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(url))
                .await
                .map_err(|_| ScrapeError::TimedOut(limit))?,
            None => self.run(url).await,
        }
    }

    /// Like [`scrape`](Self::scrape), but abandons the request (including any
    /// in-flight image probes) as soon as `cancel` fires.
    pub async fn scrape_with_cancel(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ListingRecord, ScrapeError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(url, "scrape cancelled");
                Err(ScrapeError::Cancelled)
            }
            result = self.scrape(url) => result,
        }
    }

    #[instrument(skip(self))]
    async fn run(&self, url: &str) -> Result<ListingRecord, ScrapeError> {
        let started = Instant::now();
        let source = url.trim();
        let url = parse_listing_url(source)?;

        let snapshot = self
            .renderer
            .render(&url, self.config.navigation_timeout)
            .await?;
        debug!(final_url = %snapshot.url, elapsed = ?started.elapsed(), "page rendered");

        let raw = extract_fields(&snapshot.html, Some(&snapshot.url));
        debug!(
            attributes = raw.attributes.len(),
            config = raw.config.len(),
            raw_images = raw.images.len(),
            "fields extracted"
        );
        if raw.images.is_empty() {
            warn!(url = %snapshot.url, "no gallery images found");
        }

        let normalized = normalize(raw, source);
        let mut record = normalized.record;
        record.images = self.resolver.validate(&normalized.image_candidates).await;

        info!(
            code = record.code_id.as_deref().unwrap_or("-"),
            images = record.images.len(),
            elapsed = ?started.elapsed(),
            "listing scraped"
        );
        Ok(record)
    }
}
