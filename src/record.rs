//! The normalized listing record handed to export consumers.

use serde::{Deserialize, Serialize};

use crate::parsing::{decompose_address, parse_price};

pub use crate::parsing::AddressParts;

/// A `{label, value}` row from the listing's details table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub label: String,
    pub value: String,
}

/// A `{title, value}` row from the short-info config block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPair {
    pub title: String,
    pub value: String,
}

/// One extracted listing. Every named field is optional; a missing field
/// means the page did not show it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(rename = "pricePerM2", skip_serializing_if = "Option::is_none")]
    pub price_per_m2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balcony_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furniture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<String>,
    #[serde(rename = "descriptionHTML", skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    /// Detail rows not claimed by any named field
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Deduplicated, validated photo URLs in no particular order
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl ListingRecord {
    /// Price in VND, parsed on demand from the raw price text.
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_deref().and_then(parse_price)
    }

    /// Ward/district/city split of the address.
    pub fn address_parts(&self) -> AddressParts {
        self.address
            .as_deref()
            .map(decompose_address)
            .unwrap_or_default()
    }

    /// File stem used when exporting this listing, e.g. `batdongsan_39281734`.
    pub fn export_stem(&self) -> String {
        let code: String = self
            .code_id
            .as_deref()
            .unwrap_or("listing")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if code.is_empty() {
            "batdongsan_listing".to_string()
        } else {
            format!("batdongsan_{}", code)
        }
    }
}
