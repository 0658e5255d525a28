//! Field extraction from a rendered listing page
//!
//! [`extract_fields`] turns snapshot HTML into a [`RawFieldBag`]. Nothing in
//! here fails: a missing element just leaves its field empty.

mod css_extractor;
mod gallery_extractor;
mod listing_extractor;

pub use css_extractor::*;
pub use gallery_extractor::*;
pub use listing_extractor::*;

use scraper::Html;
use url::Url;

use crate::record::{Attribute, ConfigPair};

/// Loosely-typed fields read from one page, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFieldBag {
    pub title: String,
    /// Details table rows in page order
    pub attributes: Vec<Attribute>,
    /// Short-info config rows (posted date, expiry, code)
    pub config: Vec<ConfigPair>,
    pub description_html: String,
    pub address: String,
    pub product_type: Option<String>,
    /// Gallery URLs, possibly with duplicates and size variants
    pub images: Vec<String>,
    pub project: String,
    pub price_per_area: Option<String>,
}

/// Extract every raw field from page HTML. `base` resolves relative image
/// URLs and is normally the snapshot URL.
pub fn extract_fields(html: &str, base: Option<&Url>) -> RawFieldBag {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let body = select_first(root, "body").unwrap_or(root);

    RawFieldBag {
        title: extract_title(root),
        attributes: extract_attributes(root),
        config: extract_config(root),
        description_html: extract_description_html(root),
        address: extract_address(root),
        product_type: extract_product_type(root),
        images: extract_gallery_images(root, base),
        project: extract_project(root),
        price_per_area: extract_price_per_area(body),
    }
}
