//! Gallery image collection
//!
//! Images live inside the lightbox overlay. Lazy-loaded images keep their
//! real URL in `data-src` or `data-original`, so each `img` is read through
//! an ordered list of attributes.

use scraper::ElementRef;
use url::Url;

use super::css_extractor::select_all;

const GALLERY_IMAGES: &str = ".re__overlay.js__overlay img";

/// Attribute priority per `img` element
const SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-original"];

/// Raw image URLs in document order. Duplicates and size variants are kept;
/// relative URLs are resolved against `base` when one is given.
pub fn extract_gallery_images(root: ElementRef<'_>, base: Option<&Url>) -> Vec<String> {
    select_all(root, GALLERY_IMAGES)
        .into_iter()
        .filter_map(|img| {
            SOURCE_ATTRS
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
        })
        .map(|src| absolutize(src, base))
        .collect()
}

fn absolutize(src: &str, base: Option<&Url>) -> String {
    if Url::parse(src).is_ok() {
        return src.to_string();
    }
    match base.and_then(|b| b.join(src).ok()) {
        Some(abs) => abs.to_string(),
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const GALLERY: &str = r#"
    <html><body>
        <img src="https://file4.batdongsan.com.vn/outside.jpg">
        <div class="re__overlay js__overlay">
            <img src="https://file4.batdongsan.com.vn/crop/200x150/a.jpg">
            <img src="" data-src="https://file4.batdongsan.com.vn/resize/745x510/b.jpg">
            <img data-original="//file4.batdongsan.com.vn/c.jpg">
            <img alt="no source">
        </div>
    </body></html>
    "#;

    #[test]
    fn test_attribute_priority_and_scope() {
        let doc = Html::parse_document(GALLERY);
        let images = extract_gallery_images(doc.root_element(), None);
        assert_eq!(
            images,
            vec![
                "https://file4.batdongsan.com.vn/crop/200x150/a.jpg",
                "https://file4.batdongsan.com.vn/resize/745x510/b.jpg",
                "//file4.batdongsan.com.vn/c.jpg",
            ]
        );
    }

    #[test]
    fn test_protocol_relative_resolved_against_page() {
        let doc = Html::parse_document(GALLERY);
        let base = Url::parse("https://batdongsan.com.vn/ban-nha/pr1").unwrap();
        let images = extract_gallery_images(doc.root_element(), Some(&base));
        assert_eq!(images[2], "https://file4.batdongsan.com.vn/c.jpg");
    }

    #[test]
    fn test_missing_overlay_is_empty() {
        let doc = Html::parse_document("<div class='re__overlay'><img src='x.jpg'></div>");
        assert!(extract_gallery_images(doc.root_element(), None).is_empty());
    }
}
