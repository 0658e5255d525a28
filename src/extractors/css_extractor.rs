//! CSS selector lookups scoped to an element
//!
//! Every lookup degrades to an empty result when the selector matches
//! nothing, so callers never have to handle "element missing" as an error.

use scraper::{ElementRef, Selector};

/// How a value is read from a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// Whitespace-collapsed text content
    Text,
    /// Raw inner markup
    InnerHtml,
    /// Attribute value
    Attr(&'static str),
}

/// One way of reading a field: a selector plus an accessor.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub selector: &'static str,
    pub accessor: Accessor,
}

impl FieldRule {
    pub const fn text(selector: &'static str) -> Self {
        Self { selector, accessor: Accessor::Text }
    }

    pub const fn inner_html(selector: &'static str) -> Self {
        Self { selector, accessor: Accessor::InnerHtml }
    }

    pub const fn attr(selector: &'static str, name: &'static str) -> Self {
        Self { selector, accessor: Accessor::Attr(name) }
    }

    /// Apply the rule to the first element matching its selector.
    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        let el = select_first(scope, self.selector)?;
        match self.accessor {
            Accessor::Text => Some(text_of(el)),
            Accessor::InnerHtml => Some(el.inner_html()),
            Accessor::Attr(name) => el.value().attr(name).map(String::from),
        }
    }
}

/// Try rules in order and keep the first non-empty value.
pub fn coalesce(scope: ElementRef<'_>, rules: &[FieldRule]) -> Option<String> {
    rules
        .iter()
        .filter_map(|rule| rule.apply(scope))
        .find(|v| !v.trim().is_empty())
}

/// Replace every whitespace run with one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text content of an element
pub fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// First descendant of `scope` matching `selector_str`
pub fn select_first<'a>(scope: ElementRef<'a>, selector_str: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector_str).ok()?;
    scope.select(&selector).next()
}

/// All descendants of `scope` matching `selector_str`
pub fn select_all<'a>(scope: ElementRef<'a>, selector_str: &str) -> Vec<ElementRef<'a>> {
    let selector = match Selector::parse(selector_str) {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    scope.select(&selector).collect()
}

/// Text of the first match, empty if nothing matches
pub fn first_text(scope: ElementRef<'_>, selector_str: &str) -> String {
    select_first(scope, selector_str)
        .map(text_of)
        .unwrap_or_default()
}

/// Collect `(label, value)` pairs from repeated item nodes, keeping only
/// pairs where both sides are non-empty after whitespace collapsing.
pub fn labeled_pairs(
    scope: ElementRef<'_>,
    item_selector: &str,
    label_selector: &str,
    value_selector: &str,
) -> Vec<(String, String)> {
    select_all(scope, item_selector)
        .into_iter()
        .map(|item| {
            let label = select_first(item, label_selector).map(text_of).unwrap_or_default();
            let value = select_first(item, value_selector).map(text_of).unwrap_or_default();
            (label, value)
        })
        .filter(|(label, value)| !label.is_empty() && !value.is_empty())
        .collect()
}
