//! Page rendering seam
//!
//! A [`PageRenderer`] turns a listing URL into a [`DomSnapshot`]: the final
//! URL plus serialized HTML. Extraction only ever sees the snapshot, never a
//! live browser.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::RenderError;
use crate::extractors::select_first;

mod http;
pub use http::HttpRenderer;

#[cfg(feature = "headless")]
mod chrome;
#[cfg(feature = "headless")]
pub use chrome::ChromeRenderer;

/// Selectors that mark a listing page as rendered enough to extract.
pub const READY_SELECTORS: &[&str] = &[".re__pr-specs-content-item", "h1", ".js__pr-description"];

/// Serialized DOM of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSnapshot {
    /// URL after redirects
    pub url: Url,
    pub html: String,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url`, giving up after `navigation_timeout`.
    async fn render(&self, url: &Url, navigation_timeout: Duration) -> Result<DomSnapshot, RenderError>;
}

/// True if any of [`READY_SELECTORS`] matches in `html`.
pub fn has_ready_signal(html: &str) -> bool {
    let document = Html::parse_document(html);
    READY_SELECTORS
        .iter()
        .any(|sel| select_first(document.root_element(), sel).is_some())
}
