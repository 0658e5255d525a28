//! Error types for the listing pipeline.
//!
//! Only whole-pipeline failures live here. Missing fields and rejected image
//! candidates are folded into the returned record instead.

use std::time::Duration;

use reqwest::StatusCode;

/// Errors that abort a scrape.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// The input is not an absolute http(s) URL.
    #[error("invalid listing url: {0}")]
    InvalidUrl(String),
    /// The input host is not the supported site.
    #[error("unsupported host {host}: only batdongsan.com.vn listings are supported")]
    DomainRejected { host: String },
    /// The page could not be rendered; nothing was extracted.
    #[error("render failed: {0}")]
    RenderFailed(#[from] RenderError),
    /// The whole request exceeded its deadline.
    #[error("scrape timed out after {0:?}")]
    TimedOut(Duration),
    /// The caller cancelled the request.
    #[error("scrape cancelled")]
    Cancelled,
    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// An HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors produced by a [`crate::render::PageRenderer`].
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("navigation failed: {0}")]
    Navigation(String),
}
