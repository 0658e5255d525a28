//! Listing extraction and media resolution for batdongsan.com.vn
//!
//! Turns a listing URL into a normalized [`ListingRecord`]:
//! - renders the page through a [`PageRenderer`] (plain HTTP, or headless
//!   Chrome with the `headless` feature)
//! - extracts raw fields from the DOM snapshot with CSS selector fallbacks
//! - maps free-text detail rows onto named fields
//! - dedups gallery photos by a size-agnostic canonical key
//! - validates the photos concurrently with a HEAD-then-GET probe

pub mod canonical;
pub mod config;
pub mod error;
pub mod extractors;
pub mod images;
pub mod normalize;
pub mod parsing;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod site;

pub use config::ScraperConfig;
pub use error::{RenderError, ScrapeError};
pub use images::{HttpImageProbe, ImageProbe, ImageResolver, ProbeError, ProbeResponse};
pub use pipeline::ListingScraper;
pub use record::{Attribute, ConfigPair, ListingRecord};
pub use render::{DomSnapshot, HttpRenderer, PageRenderer};
