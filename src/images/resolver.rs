//! Image resolution: canonical dedup of gallery URLs, then pool validation.

use std::sync::Arc;

use tracing::{debug, info};

use super::pool::ValidationPool;
use super::probe::{HttpImageProbe, ImageProbe, DEFAULT_MIN_IMAGE_BYTES};
use crate::canonical::dedup_images;
use crate::config::ScraperConfig;
use crate::error::ScrapeError;

/// Default validation pool size
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Dedups raw gallery URLs and keeps the ones that serve a real image.
#[derive(Clone)]
pub struct ImageResolver {
    probe: Arc<dyn ImageProbe>,
    concurrency: usize,
    min_bytes: u64,
}

impl ImageResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, concurrency: usize) -> Self {
        Self {
            probe,
            concurrency,
            min_bytes: DEFAULT_MIN_IMAGE_BYTES,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let probe = HttpImageProbe::from_config(config)?;
        Ok(Self::new(Arc::new(probe), config.image_concurrency)
            .with_min_bytes(config.min_image_bytes))
    }

    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Dedup by canonical key, then validate. Output order is unspecified.
    pub async fn resolve<I, S>(&self, raw_urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = dedup_images(raw_urls);
        self.validate(&candidates).await
    }

    /// Validate already-deduplicated candidates.
    pub async fn validate(&self, candidates: &[String]) -> Vec<String> {
        if candidates.is_empty() {
            debug!("no image candidates");
            return Vec::new();
        }

        let pool = ValidationPool::new(self.probe.as_ref(), self.concurrency, self.min_bytes);
        let accepted = pool.run(candidates).await;
        info!(
            candidates = candidates.len(),
            accepted = accepted.len(),
            "resolved listing images"
        );
        accepted
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("concurrency", &self.concurrency)
            .field("min_bytes", &self.min_bytes)
            .finish_non_exhaustive()
    }
}
