//! Input contract: one absolute http(s) URL on the supported site.

use url::Url;

use crate::error::ScrapeError;

/// The only site whose markup the extractors understand.
pub const SUPPORTED_DOMAIN: &str = "batdongsan.com.vn";

/// Parse a listing URL, rejecting anything that is not an absolute http(s)
/// URL on the supported domain (apex or any subdomain).
pub fn parse_listing_url(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ScrapeError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            raw,
            url.scheme()
        )));
    }

    let host = url.host_str().unwrap_or_default();
    if !is_supported_host(host) {
        return Err(ScrapeError::DomainRejected {
            host: host.to_string(),
        });
    }

    Ok(url)
}

/// True for the supported domain and its subdomains.
pub fn is_supported_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == SUPPORTED_DOMAIN
        || host
            .strip_suffix(SUPPORTED_DOMAIN)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
