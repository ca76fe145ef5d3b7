use serde::{Deserialize, Serialize};

use crate::core::Key;

/// Document is a simplified invoice, usually without customer details.
pub const TAG_SIMPLIFIED: &str = "simplified";
/// Tax is owed by the customer; the payable tax is forced to zero.
pub const TAG_REVERSE_CHARGE: &str = "reverse-charge";
/// Taxes are calculated with the customer's regime instead of the supplier's.
pub const TAG_CUSTOMER_RATES: &str = "customer-rates";
/// Document was issued by the customer on the supplier's behalf.
pub const TAG_SELF_BILLED: &str = "self-billed";
/// Document covers only part of a supply.
pub const TAG_PARTIAL: &str = "partial";
/// Document is addressed to a public administration.
pub const TAG_B2G: &str = "b2g";

/// A recognised document tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub key: Key,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl TagDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            desc: None,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}

/// Tags every regime is expected to understand.
pub fn common_tags() -> Vec<TagDefinition> {
    vec![
        TagDefinition::new(TAG_SIMPLIFIED, "Simplified invoice")
            .with_desc("Used for B2C transactions when the customer details are not available."),
        TagDefinition::new(TAG_REVERSE_CHARGE, "Reverse charge"),
        TagDefinition::new(TAG_CUSTOMER_RATES, "Customer rates")
            .with_desc("Apply the tax rates of the customer's regime."),
        TagDefinition::new(TAG_SELF_BILLED, "Self-billed"),
        TagDefinition::new(TAG_PARTIAL, "Partial"),
        TagDefinition::new(TAG_B2G, "Business to government"),
    ]
}
