//! Listing field extraction
//!
//! Reads the text fields of a listing page (title, detail attributes,
//! description, address, breadcrumb product type, short-info config pairs,
//! project name and the price-per-area fragment).

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

use super::css_extractor::{coalesce, first_text, labeled_pairs, FieldRule};
use crate::record::{Attribute, ConfigPair};

const TITLE: &str = "h1";

const SPEC_ITEM: &str = ".re__pr-specs-content-item";
const SPEC_ITEM_LABEL: &str = ".re__pr-specs-content-item-title";
const SPEC_ITEM_VALUE: &str = ".re__pr-specs-content-item-value";

const CONFIG_ITEM: &str = "div.re__pr-short-info-item.js__pr-config-item";
const CONFIG_ITEM_TITLE: &str = "span.title";
const CONFIG_ITEM_VALUE: &str = "span.value";

const PROJECT_TITLE: &str = "div.re__project-title";

const DESCRIPTION_RULES: &[FieldRule] = &[
    FieldRule::inner_html(".js__pr-description"),
    FieldRule::inner_html(
        ".re__section.re__pr-description.js__section.js__li-description .re__section-body",
    ),
    FieldRule::inner_html(".re__pr-description .re__section-body"),
];

const ADDRESS_RULES: &[FieldRule] = &[
    FieldRule::text("span.re__pr-short-description.js__pr-address"),
    FieldRule::text(".re__pr-short-description"),
];

const PRODUCT_TYPE_RULE: FieldRule = FieldRule::attr(r#".re__breadcrumb a[level="4"]"#, "title");

/// `<number> triệu|tỷ / m²`, e.g. "85,71 triệu/m²"
static PRICE_PER_AREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\d.,]+)\s*(triệu|tỷ)\s*/\s*m²").unwrap());

/// First `h1`, whitespace-collapsed
pub fn extract_title(root: ElementRef<'_>) -> String {
    first_text(root, TITLE)
}

/// Details table rows with both a label and a value
pub fn extract_attributes(root: ElementRef<'_>) -> Vec<Attribute> {
    labeled_pairs(root, SPEC_ITEM, SPEC_ITEM_LABEL, SPEC_ITEM_VALUE)
        .into_iter()
        .map(|(label, value)| Attribute { label, value })
        .collect()
}

/// Short-info config items (posted date, expiry, listing code)
pub fn extract_config(root: ElementRef<'_>) -> Vec<ConfigPair> {
    labeled_pairs(root, CONFIG_ITEM, CONFIG_ITEM_TITLE, CONFIG_ITEM_VALUE)
        .into_iter()
        .map(|(title, value)| ConfigPair { title, value })
        .collect()
}

/// Description markup from the first selector that yields any
pub fn extract_description_html(root: ElementRef<'_>) -> String {
    coalesce(root, DESCRIPTION_RULES).unwrap_or_default()
}

pub fn extract_address(root: ElementRef<'_>) -> String {
    coalesce(root, ADDRESS_RULES).unwrap_or_default()
}

/// Breadcrumb link title at hierarchy level 4
pub fn extract_product_type(root: ElementRef<'_>) -> Option<String> {
    PRODUCT_TYPE_RULE
        .apply(root)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn extract_project(root: ElementRef<'_>) -> String {
    first_text(root, PROJECT_TITLE)
}

/// First "price per m²" fragment anywhere in the visible page text, verbatim
pub fn extract_price_per_area(body: ElementRef<'_>) -> Option<String> {
    let text = visible_text(body);
    PRICE_PER_AREA
        .find(&text)
        .map(|m| m.as_str().to_string())
}

/// Elements that start a new line in rendered text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Text under `el` the way a browser lays it out: block elements sit on
/// their own lines and script-like containers are skipped.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible(el, &mut out);
    out
}

fn push_visible(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if HIDDEN_TAGS.contains(&name) {
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            push_visible(child_el, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
    if block {
        out.push('\n');
    }
}
