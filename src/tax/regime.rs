use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::scenario::ScenarioSet;
use super::tag::TagDefinition;
use crate::core::{Key, Percent, ValidationError, currencies};
use crate::dispatch::Node;

/// Regime-level structural check over any document node.
pub type ObjectValidator = fn(Node<'_>, &mut Vec<ValidationError>);

/// Rules for one jurisdiction: currency, recognised tags, scenarios, tax
/// categories and an optional structural validator.
///
/// Regimes are plain data built once at startup and registered in a
/// [`Registry`](super::Registry); they are never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Regime {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// Sub-national zone with its own rules, if any.
    pub zone: Option<String>,
    pub name: String,
    /// Currency whose precision is used for every total.
    pub currency: String,
    pub tags: Vec<TagDefinition>,
    pub scenarios: Vec<ScenarioSet>,
    pub categories: Vec<CategoryDef>,
    pub validator: Option<ObjectValidator>,
}

impl Regime {
    /// Zero amount with the currency's precision.
    pub fn currency_base_amount(&self) -> Decimal {
        currencies::base_amount(&self.currency)
    }

    pub fn tag(&self, key: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.key == key)
    }

    pub fn scenario_set(&self, schema: &str) -> Option<&ScenarioSet> {
        self.scenarios.iter().find(|s| s.schema == schema)
    }

    pub fn category(&self, code: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Run the regime's structural checks on a node. Regimes without a
    /// validator accept everything.
    pub fn validate_object(&self, node: Node<'_>, errors: &mut Vec<ValidationError>) {
        if let Some(validate) = self.validator {
            validate(node, errors);
        }
    }
}

/// A tax category (e.g. VAT) and its rates.
#[derive(Debug, Clone)]
pub struct CategoryDef {
    pub code: Key,
    pub name: String,
    /// Withheld taxes are subtracted from the tax sum instead of added.
    pub retained: bool,
    pub rates: Vec<RateDef>,
}

impl CategoryDef {
    pub fn rate(&self, key: &str) -> Option<&RateDef> {
        self.rates.iter().find(|r| r.key == key)
    }
}

/// A named rate with its history. A rate without values is exempt.
#[derive(Debug, Clone)]
pub struct RateDef {
    pub key: Key,
    pub name: String,
    /// Newest first.
    pub values: Vec<RateValue>,
}

impl RateDef {
    /// The value in force on `date` for `zone`. Zone-restricted values are
    /// only considered for those zones.
    pub fn value_on(&self, date: NaiveDate, zone: Option<&str>) -> Option<&RateValue> {
        self.values.iter().find(|v| {
            let zone_ok = v.zones.is_empty()
                || zone.is_some_and(|z| v.zones.iter().any(|vz| vz == z));
            let date_ok = v.since.is_none_or(|since| since <= date);
            zone_ok && date_ok
        })
    }
}

/// A percentage valid from `since` onwards.
#[derive(Debug, Clone)]
pub struct RateValue {
    pub since: Option<NaiveDate>,
    pub percent: Percent,
    pub zones: Vec<String>,
}

impl RateValue {
    pub fn new(since: Option<NaiveDate>, percent: Percent) -> Self {
        Self {
            since,
            percent,
            zones: Vec::new(),
        }
    }

    pub fn in_zones(mut self, zones: &[&str]) -> Self {
        self.zones = zones.iter().map(|z| z.to_string()).collect();
        self
    }
}
