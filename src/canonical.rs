//! Image URL canonicalization
//!
//! The listing site serves the same photo under several `crop/WxH` and
//! `resize/WxH` variants, often with tracking query strings attached.
//! [`normalize_image_url`] produces the URL we keep (a large displayable
//! size); [`canonical_key`] produces a size-agnostic identity used only to
//! detect duplicates.

use indexmap::IndexMap;
use url::Url;

/// Size every cropped variant is rewritten to.
pub const DISPLAY_SIZE: &str = "1200x900";

/// Strip the query, rewrite `/crop/WxH/` to `/resize/1200x900/` and collapse
/// repeated slashes in the path. Unparseable input only loses its `?...` tail.
pub fn normalize_image_url(src: &str) -> String {
    let mut url = match Url::parse(src) {
        Ok(u) => u,
        Err(_) => return strip_query(src).to_string(),
    };

    url.set_query(None);
    if url.cannot_be_a_base() {
        // data: and similar opaque URLs have no path segments to rewrite
        return url.to_string();
    }

    let trailing_slash = url.path().len() > 1 && url.path().ends_with('/');
    let mut segments: Vec<String> = path_segments(url.path()).map(String::from).collect();

    let mut i = 0;
    while i + 1 < segments.len() {
        // The size segment must be followed by another segment or a slash
        let terminated = i + 2 < segments.len() || trailing_slash;
        if segments[i] == "crop" && is_crop_size(&segments[i + 1]) && terminated {
            segments[i] = "resize".to_string();
            segments[i + 1] = DISPLAY_SIZE.to_string();
            i += 2;
        } else {
            i += 1;
        }
    }

    url.set_path(&join_path(&segments, trailing_slash));
    url.to_string()
}

/// Size-agnostic identity: the normalized URL with every `(crop|resize, WxH)`
/// segment pair removed and no query.
pub fn canonical_key(src: &str) -> String {
    let normalized = normalize_image_url(src);
    let mut url = match Url::parse(&normalized) {
        Ok(u) => u,
        Err(_) => return normalized,
    };
    if url.cannot_be_a_base() {
        return normalized;
    }

    let segments: Vec<&str> = path_segments(url.path()).collect();
    let mut kept: Vec<String> = Vec::with_capacity(segments.len());
    let mut i = 0;
    while i < segments.len() {
        let is_sizing = segments[i] == "crop" || segments[i] == "resize";
        if is_sizing && i + 1 < segments.len() && is_size_segment(segments[i + 1]) {
            i += 2;
            continue;
        }
        kept.push(segments[i].to_string());
        i += 1;
    }

    url.set_path(&join_path(&kept, false));
    url.set_query(None);
    url.to_string()
}

/// Deduplicate image URLs by canonical key. The first occurrence of each key
/// wins and is kept in normalized form; key order follows first appearance.
pub fn dedup_images<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut by_key: IndexMap<String, String> = IndexMap::new();
    for src in urls {
        let src = src.as_ref();
        by_key
            .entry(canonical_key(src))
            .or_insert_with(|| normalize_image_url(src));
    }
    by_key.into_values().collect()
}

fn strip_query(src: &str) -> &str {
    src.split('?').next().unwrap_or_default()
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join_path<S: AsRef<str>>(segments: &[S], trailing_slash: bool) -> String {
    let mut path = String::from("/");
    for (idx, seg) in segments.iter().enumerate() {
        if idx > 0 {
            path.push('/');
        }
        path.push_str(seg.as_ref());
    }
    if trailing_slash && !segments.is_empty() {
        path.push('/');
    }
    path
}

/// `WxH` with decimal dimensions and either case of `x`, e.g. `745x510`.
fn is_size_segment(seg: &str) -> bool {
    has_dimensions(seg, &['x', 'X'])
}

/// Crop sizes are only rewritten with a lowercase `x`.
fn is_crop_size(seg: &str) -> bool {
    has_dimensions(seg, &['x'])
}

fn has_dimensions(seg: &str, separators: &[char]) -> bool {
    let Some((w, h)) = seg.split_once(separators) else {
        return false;
    };
    !w.is_empty()
        && !h.is_empty()
        && w.bytes().all(|b| b.is_ascii_digit())
        && h.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROPPED: &str =
        "https://file4.batdongsan.com.vn/crop/393x222/2024/05/10/20240510101010-abcd_wm.jpg?w=1";
    const RESIZED: &str =
        "https://file4.batdongsan.com.vn/resize/745x510/2024/05/10/20240510101010-abcd_wm.jpg";

    #[test]
    fn test_normalize_rewrites_crop_and_drops_query() {
        assert_eq!(
            normalize_image_url(CROPPED),
            "https://file4.batdongsan.com.vn/resize/1200x900/2024/05/10/20240510101010-abcd_wm.jpg"
        );
    }

    #[test]
    fn test_normalize_keeps_resize_size() {
        assert_eq!(normalize_image_url(RESIZED), RESIZED);
    }

    #[test]
    fn test_normalize_collapses_double_slashes() {
        assert_eq!(
            normalize_image_url("https://cdn.example.com//images///a.jpg"),
            "https://cdn.example.com/images/a.jpg"
        );
    }

    #[test]
    fn test_normalize_unparseable_falls_back_to_truncation() {
        assert_eq!(normalize_image_url("/relative/pic.jpg?x=1"), "/relative/pic.jpg");
        assert_eq!(normalize_image_url(""), "");
    }

    #[test]
    fn test_crop_without_following_segment_is_left_alone() {
        // `/crop/100x100` at the very end has no closing slash
        assert_eq!(
            normalize_image_url("https://cdn.example.com/a/crop/100x100"),
            "https://cdn.example.com/a/crop/100x100"
        );
    }

    #[test]
    fn test_uppercase_crop_size_not_rewritten_but_keyed() {
        let upper = "https://cdn.example.com/crop/10X10/a.jpg";
        assert_eq!(normalize_image_url(upper), upper);
        assert_eq!(canonical_key(upper), "https://cdn.example.com/a.jpg");
        assert_eq!(
            canonical_key(upper),
            canonical_key("https://cdn.example.com/crop/10x10/a.jpg")
        );
    }

    #[test]
    fn test_canonical_key_is_size_agnostic() {
        let key = canonical_key(CROPPED);
        assert_eq!(
            key,
            "https://file4.batdongsan.com.vn/2024/05/10/20240510101010-abcd_wm.jpg"
        );
        assert_eq!(canonical_key(RESIZED), key);
    }

    #[test]
    fn test_canonical_key_idempotent_over_normalize() {
        let samples = [
            CROPPED,
            RESIZED,
            "https://cdn.example.com//crop/10x10/crop/20x20/x.png?a=b#frag",
            "https://cdn.example.com/resize/1X2/",
            "not a url?with=query",
            "data:image/png;base64,AAAA",
            "",
        ];
        for s in samples {
            assert_eq!(canonical_key(s), canonical_key(&normalize_image_url(s)), "{}", s);
        }
    }

    #[test]
    fn test_dedup_keeps_first_normalized_representative() {
        let urls = vec![
            RESIZED.to_string(),
            CROPPED.to_string(),
            "https://file4.batdongsan.com.vn/resize/745x510/2024/05/10/other.jpg?t=9".to_string(),
        ];
        let deduped = dedup_images(&urls);
        assert_eq!(
            deduped,
            vec![
                RESIZED.to_string(),
                "https://file4.batdongsan.com.vn/resize/745x510/2024/05/10/other.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedup_query_only_difference() {
        let deduped = dedup_images(["https://a.com/p.jpg?v=1", "https://a.com/p.jpg?v=2"]);
        assert_eq!(deduped, vec!["https://a.com/p.jpg".to_string()]);
    }
}
