//! Numeric price parsing and address decomposition
//!
//! The record keeps raw strings; these helpers are applied on demand by
//! consumers that need numbers or address parts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// First run of digits and separators
static NUMBER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d.,]*").unwrap());

/// Parse a Vietnamese price text into VND.
///
/// "tỷ" scales by 10⁹ and "triệu" by 10⁶. A lone comma without any period is
/// a decimal separator ("2,5 tỷ"); otherwise commas are thousands separators.
/// Several periods ("1.200.000") are thousands separators as well.
/// Returns `None` when there is no number at all.
pub fn parse_price(text: &str) -> Option<f64> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    let multiplier = if lower.contains("tỷ") {
        BILLION
    } else if lower.contains("triệu") {
        MILLION
    } else {
        1.0
    };

    let run = NUMBER_RUN.find(&lower)?.as_str();
    let run = run.trim_end_matches(['.', ',']);

    let commas = run.matches(',').count();
    let periods = run.matches('.').count();

    let numeral = if commas == 1 && periods == 0 {
        run.replace(',', ".")
    } else {
        let without_commas = run.replace(',', "");
        if periods > 1 {
            without_commas.replace('.', "")
        } else {
            without_commas
        }
    };

    numeral.parse::<f64>().ok().map(|n| n * multiplier)
}

/// Ward, district and city taken from the tail of a comma-separated address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
}

/// Split an address on commas: last segment is the city, then district,
/// then ward. Missing positions are `None`.
pub fn decompose_address(address: &str) -> AddressParts {
    let segments: Vec<&str> = address.split(',').map(str::trim).collect();
    let from_end = |n: usize| -> Option<String> {
        segments
            .len()
            .checked_sub(n)
            .map(|idx| segments[idx])
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    AddressParts {
        city: from_end(1),
        district: from_end(2),
        ward: from_end(3),
    }
}
