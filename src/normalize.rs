//! Field normalization
//!
//! Maps the free-text detail rows of a [`RawFieldBag`] onto named record
//! fields by case-insensitive substring match on the label, and keeps the
//! rows no reserved key claims as residual attributes.

use crate::canonical::dedup_images;
use crate::extractors::RawFieldBag;
use crate::record::{Attribute, ListingRecord};

const PRICE_KEYS: &[&str] = &["mức giá", "giá"];
const AREA_KEYS: &[&str] = &["diện tích"];
const BEDROOM_KEYS: &[&str] = &["phòng ngủ"];
const BATHROOM_KEYS: &[&str] = &["phòng tắm", "vệ sinh"];
const FLOOR_KEYS: &[&str] = &["số tầng", "tầng"];
const DIRECTION_KEYS: &[&str] = &["hướng nhà", "hướng"];
const BALCONY_KEYS: &[&str] = &["hướng ban công"];
const HOUSE_DIRECTION_KEYS: &[&str] = &["hướng nhà"];
const LEGAL_KEYS: &[&str] = &["pháp lý"];
const FURNITURE_KEYS: &[&str] = &["nội thất"];

/// Union of every key above; a row matching any of them is never residual.
pub const RESERVED_LABEL_KEYS: &[&str] = &[
    "mức giá",
    "giá",
    "diện tích",
    "phòng ngủ",
    "phòng tắm",
    "vệ sinh",
    "số tầng",
    "tầng",
    "hướng",
    "hướng nhà",
    "hướng ban công",
    "pháp lý",
    "nội thất",
];

const POSTED_KEYS: &[&str] = &["ngày đăng"];
const EXPIRED_KEYS: &[&str] = &["hết hạn", "ngày hết hạn"];
const CODE_KEYS: &[&str] = &["mã tin"];

/// Output of [`normalize`]: the record without validated images, plus the
/// deduplicated candidates the image resolver still has to check.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: ListingRecord,
    pub image_candidates: Vec<String>,
}

/// Build a [`ListingRecord`] from raw fields. `record.images` is left empty.
pub fn normalize(raw: RawFieldBag, source_url: &str) -> Normalized {
    let attrs = &raw.attributes;
    let from_attrs = |keys: &[&str]| lookup(attrs, keys, |a| (&a.label, &a.value));
    let from_config = |keys: &[&str]| lookup(&raw.config, keys, |c| (&c.title, &c.value));

    let record = ListingRecord {
        source_url: source_url.to_string(),
        title: non_empty(&raw.title),
        code_id: from_config(CODE_KEYS),
        price: from_attrs(PRICE_KEYS),
        price_per_m2: raw.price_per_area.clone().filter(|s| !s.is_empty()),
        area: from_attrs(AREA_KEYS),
        bedrooms: from_attrs(BEDROOM_KEYS),
        bathrooms: from_attrs(BATHROOM_KEYS),
        floors: from_attrs(FLOOR_KEYS),
        direction: from_attrs(DIRECTION_KEYS),
        balcony_direction: from_attrs(BALCONY_KEYS),
        house_direction: from_attrs(HOUSE_DIRECTION_KEYS),
        legal: from_attrs(LEGAL_KEYS),
        furniture: from_attrs(FURNITURE_KEYS),
        address: non_empty(&raw.address),
        posted_at: from_config(POSTED_KEYS),
        expired_at: from_config(EXPIRED_KEYS),
        description_html: non_empty(&raw.description_html),
        attributes: residual_attributes(attrs),
        images: Vec::new(),
        project: non_empty(&raw.project),
        product_type: raw.product_type.clone().filter(|s| !s.is_empty()),
    };

    Normalized {
        record,
        image_candidates: dedup_images(&raw.images),
    }
}

/// Rows whose label contains none of [`RESERVED_LABEL_KEYS`], in page order.
pub fn residual_attributes(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .filter(|a| {
            let label = a.label.to_lowercase();
            !RESERVED_LABEL_KEYS.iter().any(|k| label.contains(k))
        })
        .cloned()
        .collect()
}

/// For each key in order, the value of the first row whose lowercased label
/// contains it. Earlier keys win over later ones.
fn lookup<T>(rows: &[T], keys: &[&str], split: impl Fn(&T) -> (&String, &String)) -> Option<String> {
    keys.iter().find_map(|key| {
        rows.iter()
            .map(&split)
            .find(|(label, _)| label.to_lowercase().contains(key))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(String::from)
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ConfigPair;

    fn attr(label: &str, value: &str) -> Attribute {
        Attribute {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    fn cfg(title: &str, value: &str) -> ConfigPair {
        ConfigPair {
            title: title.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_direction_claims_and_partitions() {
        let raw = RawFieldBag {
            attributes: vec![attr("Hướng cửa chính", "Đông Nam"), attr("Mặt tiền", "5 m")],
            ..Default::default()
        };
        let out = normalize(raw, "https://batdongsan.com.vn/pr1");

        assert_eq!(out.record.direction.as_deref(), Some("Đông Nam"));
        assert_eq!(out.record.attributes, vec![attr("Mặt tiền", "5 m")]);
    }

    #[test]
    fn test_key_order_prefers_specific_key() {
        let attrs = vec![
            attr("Hướng ban công", "Tây"),
            attr("Hướng nhà", "Bắc"),
            attr("Số tầng", "4"),
            attr("Tầng hầm", "1"),
        ];
        let raw = RawFieldBag {
            attributes: attrs,
            ..Default::default()
        };
        let record = normalize(raw, "u").record;

        assert_eq!(record.direction.as_deref(), Some("Bắc"));
        assert_eq!(record.house_direction.as_deref(), Some("Bắc"));
        assert_eq!(record.balcony_direction.as_deref(), Some("Tây"));
        assert_eq!(record.floors.as_deref(), Some("4"));
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_price_matches_either_key() {
        let raw = RawFieldBag {
            attributes: vec![attr("Giá thuê", "15 triệu/tháng")],
            ..Default::default()
        };
        assert_eq!(normalize(raw, "u").record.price.as_deref(), Some("15 triệu/tháng"));
    }

    #[test]
    fn test_config_fields() {
        let raw = RawFieldBag {
            config: vec![
                cfg("Ngày đăng", "10/05/2024"),
                cfg("Ngày hết hạn", "24/05/2024"),
                cfg("Loại tin", "Tin VIP"),
                cfg("Mã tin", "39281734"),
            ],
            ..Default::default()
        };
        let record = normalize(raw, "u").record;

        assert_eq!(record.posted_at.as_deref(), Some("10/05/2024"));
        assert_eq!(record.expired_at.as_deref(), Some("24/05/2024"));
        assert_eq!(record.code_id.as_deref(), Some("39281734"));
    }

    #[test]
    fn test_empty_bag_gives_absent_fields() {
        let out = normalize(RawFieldBag::default(), "https://batdongsan.com.vn/pr1");
        assert_eq!(
            out.record,
            ListingRecord {
                source_url: "https://batdongsan.com.vn/pr1".into(),
                ..Default::default()
            }
        );
        assert!(out.image_candidates.is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let raw = RawFieldBag {
            title: "Nhà phố Quận 7".into(),
            attributes: vec![
                attr("Mức giá", "5.2 tỷ"),
                attr("Diện tích", "80 m²"),
                attr("Số phòng ngủ", "3 phòng"),
            ],
            images: vec![
                "https://file4.batdongsan.com.vn/crop/200x150/2024/05/a.jpg?v=1".into(),
                "https://file4.batdongsan.com.vn/resize/745x510/2024/05/a.jpg".into(),
                "https://file4.batdongsan.com.vn/crop/200x150/2024/05/b.jpg".into(),
            ],
            ..Default::default()
        };
        let out = normalize(raw, "https://batdongsan.com.vn/ban-nha/pr1");

        assert_eq!(out.record.title.as_deref(), Some("Nhà phố Quận 7"));
        assert_eq!(out.record.price.as_deref(), Some("5.2 tỷ"));
        assert_eq!(out.record.area.as_deref(), Some("80 m²"));
        assert_eq!(out.record.bedrooms.as_deref(), Some("3 phòng"));
        assert!(out.record.attributes.is_empty());
        assert!(out.record.images.is_empty());
        assert_eq!(
            out.image_candidates,
            vec![
                "https://file4.batdongsan.com.vn/resize/1200x900/2024/05/a.jpg",
                "https://file4.batdongsan.com.vn/resize/1200x900/2024/05/b.jpg",
            ]
        );
    }
}
