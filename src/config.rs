//! Runtime configuration
//!
//! Every knob has a default; environment variables override them.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::images::{DEFAULT_CONCURRENCY, DEFAULT_MIN_IMAGE_BYTES};

/// User agent presented to the listing site when rendering pages.
pub const DEFAULT_PAGE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// User agent sent with image probes.
pub const DEFAULT_PROBE_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Size of the image validation pool
    pub image_concurrency: usize,
    /// Upper bound for page navigation
    pub navigation_timeout: Duration,
    /// How long to wait for a readiness selector before snapshotting anyway
    pub ready_timeout: Duration,
    /// Pause after clicking "read more" so the description can expand
    pub expand_settle: Duration,
    /// Per-request timeout for each HEAD/GET image probe
    pub probe_timeout: Duration,
    /// Deadline for the whole scrape, `None` for no deadline
    pub request_timeout: Option<Duration>,
    /// Smallest Content-Length accepted from a HEAD probe
    pub min_image_bytes: u64,
    pub page_user_agent: String,
    pub probe_user_agent: String,
    /// Chrome binary for the headless renderer
    pub chrome_path: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            image_concurrency: DEFAULT_CONCURRENCY,
            navigation_timeout: Duration::from_secs(60),
            ready_timeout: Duration::from_secs(20),
            expand_settle: Duration::from_millis(400),
            probe_timeout: Duration::from_secs(10),
            request_timeout: Some(Duration::from_secs(180)),
            min_image_bytes: DEFAULT_MIN_IMAGE_BYTES,
            page_user_agent: DEFAULT_PAGE_USER_AGENT.to_string(),
            probe_user_agent: DEFAULT_PROBE_USER_AGENT.to_string(),
            chrome_path: None,
        }
    }
}

impl ScraperConfig {
    /// Build a config from `LISTING_*` environment variables, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let defaults = Self::default();

        let request_timeout = match env_parse::<u64>("LISTING_REQUEST_TIMEOUT_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        let image_concurrency = match env_parse::<usize>("LISTING_IMAGE_CONCURRENCY")? {
            Some(0) => {
                return Err(ScrapeError::Config(
                    "LISTING_IMAGE_CONCURRENCY must be at least 1".to_string(),
                ))
            }
            Some(n) => n,
            None => defaults.image_concurrency,
        };

        Ok(Self {
            image_concurrency,
            navigation_timeout: env_parse("LISTING_NAVIGATION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.navigation_timeout),
            ready_timeout: env_parse("LISTING_READY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.ready_timeout),
            expand_settle: env_parse("LISTING_EXPAND_SETTLE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.expand_settle),
            probe_timeout: env_parse("LISTING_PROBE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
            request_timeout,
            min_image_bytes: env_parse("LISTING_MIN_IMAGE_BYTES")?
                .unwrap_or(defaults.min_image_bytes),
            page_user_agent: env_string("LISTING_PAGE_USER_AGENT")
                .unwrap_or(defaults.page_user_agent),
            probe_user_agent: env_string("LISTING_PROBE_USER_AGENT")
                .unwrap_or(defaults.probe_user_agent),
            chrome_path: env_string("LISTING_CHROME_PATH").map(PathBuf::from),
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ScrapeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ScrapeError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}
