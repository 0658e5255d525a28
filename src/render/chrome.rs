//! Headless Chrome renderer
//!
//! Runs the page's scripts so lazily-built sections exist in the snapshot.
//! The headless_chrome API is blocking, so each render runs on the blocking
//! pool.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, warn};
use url::Url;

use super::{DomSnapshot, PageRenderer, READY_SELECTORS};
use crate::config::ScraperConfig;
use crate::error::RenderError;

/// Subresources that never matter for extraction
const BLOCKED_URL_PATTERNS: &[&str] = &[
    "*.css", "*.woff", "*.woff2", "*.ttf", "*.otf", "*.mp4", "*.webm", "*.mp3", "*.jpg", "*.jpeg",
    "*.png", "*.gif", "*.webp", "*.svg",
];

/// Clicks every "read more" control inside the description and reports how
/// many were clicked. Pages without a description container are left alone.
const EXPAND_DESCRIPTION_JS: &str = r#"
(() => {
    const root = document.querySelector('.js__pr-description')
        || document.querySelector('.re__pr-description');
    if (!root) return 0;
    const wanted = (el) => {
        const text = (el.textContent || '').toLowerCase();
        const cls = (typeof el.className === 'string' ? el.className : '').toLowerCase();
        return text.includes('xem thêm') || text.includes('đọc tiếp')
            || el.getAttribute('data-view-more') !== null
            || cls.includes('readmore') || cls.includes('viewmore');
    };
    let clicked = 0;
    root.querySelectorAll('button, a, span').forEach((el) => {
        if (!wanted(el)) return;
        try { el.click(); clicked += 1; } catch (e) {}
    });
    return clicked;
})()
"#;

#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
    user_agent: String,
    ready_timeout: Duration,
    expand_settle: Duration,
}

impl ChromeRenderer {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            user_agent: config.page_user_agent.clone(),
            ready_timeout: config.ready_timeout,
            expand_settle: config.expand_settle,
        }
    }

    fn render_blocking(&self, url: &Url, navigation_timeout: Duration) -> Result<DomSnapshot, RenderError> {
        let args = vec![
            OsStr::new("--blink-settings=imagesEnabled=false"),
            OsStr::new("--disable-remote-fonts"),
            OsStr::new("--mute-audio"),
            OsStr::new("--lang=vi-VN"),
        ];
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(self.chrome_path.clone())
            .args(args)
            .idle_browser_timeout(navigation_timeout + self.ready_timeout + Duration::from_secs(30))
            .build()
            .map_err(|e| RenderError::Navigation(format!("launch options: {}", e)))?;

        let browser = Browser::new(options).map_err(navigation)?;
        let tab = browser.new_tab().map_err(navigation)?;
        tab.set_default_timeout(navigation_timeout);
        tab.set_user_agent(&self.user_agent, Some("vi-VN,vi"), None)
            .map_err(navigation)?;

        let blocked = tab.call_method(Network::SetBlockedURLs {
            urls: BLOCKED_URL_PATTERNS.iter().map(|p| p.to_string()).collect(),
        });
        if let Err(e) = blocked {
            debug!(error = %e, "could not block subresources");
        }

        tab.navigate_to(url.as_str()).map_err(navigation)?;
        tab.wait_until_navigated().map_err(|e| {
            if e.to_string().to_lowercase().contains("timeout") {
                RenderError::Timeout(navigation_timeout)
            } else {
                navigation(e)
            }
        })?;

        self.wait_ready(&tab);
        self.expand_description(&tab);

        let html = tab.get_content().map_err(navigation)?;
        let final_url = Url::parse(&tab.get_url()).unwrap_or_else(|_| url.clone());
        Ok(DomSnapshot { url: final_url, html })
    }

    /// Wait for any readiness selector; give up quietly at `ready_timeout`.
    fn wait_ready(&self, tab: &Tab) {
        let selector = READY_SELECTORS.join(", ");
        if tab
            .wait_for_element_with_custom_timeout(&selector, self.ready_timeout)
            .is_err()
        {
            warn!(timeout = ?self.ready_timeout, "no readiness selector appeared, snapshotting anyway");
        }
    }

    fn expand_description(&self, tab: &Tab) {
        match tab.evaluate(EXPAND_DESCRIPTION_JS, false) {
            Ok(result) => {
                let clicked = result.value.and_then(|v| v.as_u64()).unwrap_or(0);
                debug!(clicked, "expanded description");
                if clicked > 0 {
                    std::thread::sleep(self.expand_settle);
                }
            }
            Err(e) => debug!(error = %e, "description expansion failed"),
        }
    }
}

fn navigation(err: impl std::fmt::Display) -> RenderError {
    RenderError::Navigation(err.to_string())
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &Url, navigation_timeout: Duration) -> Result<DomSnapshot, RenderError> {
        debug!(%url, "rendering listing page in headless chrome");
        let renderer = self.clone();
        let url = url.clone();
        tokio::task::spawn_blocking(move || renderer.render_blocking(&url, navigation_timeout))
            .await
            .map_err(|e| RenderError::Navigation(format!("render task failed: {}", e)))?
    }
}
