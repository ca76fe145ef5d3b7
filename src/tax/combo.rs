use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::regime::Regime;
use super::total::TaxError;
use crate::core::{Extensions, Key, Percent};

/// Category code for value added tax.
pub const CATEGORY_VAT: &str = "VAT";

/// Rate keys shared by most regimes.
pub const RATE_STANDARD: &str = "standard";
pub const RATE_INTERMEDIATE: &str = "intermediate";
pub const RATE_REDUCED: &str = "reduced";
pub const RATE_SUPER_REDUCED: &str = "super-reduced";
pub const RATE_ZERO: &str = "zero";
pub const RATE_EXEMPT: &str = "exempt";

/// A tax combination applied to a line, discount or charge: the category,
/// and either a rate key resolved against the regime or an explicit percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    #[serde(rename = "cat")]
    pub category: Key,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

impl Combo {
    /// A combo resolved from the regime's rate table.
    pub fn rate(category: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            rate: Some(rate.into()),
            ..Default::default()
        }
    }

    /// A combo with an explicit percentage.
    pub fn percent(category: impl Into<String>, percent: Percent) -> Self {
        Self {
            category: category.into(),
            percent: Some(percent),
            ..Default::default()
        }
    }

    /// Determine the percent that applies to this combo under `regime`.
    ///
    /// A rate key is authoritative and looked up for the date and zone;
    /// without one the explicit percent is used. `Ok(None)` means exempt.
    pub fn resolve_percent(
        &self,
        regime: &Regime,
        zone: Option<&str>,
        date: NaiveDate,
    ) -> Result<Option<Percent>, TaxError> {
        let category = regime
            .category(&self.category)
            .ok_or_else(|| TaxError::UnknownCategory(self.category.clone()))?;

        let rate = match &self.rate {
            Some(key) => Some(category.rate(key).ok_or_else(|| TaxError::UnknownRate {
                category: self.category.clone(),
                rate: key.clone(),
            })?),
            None => None,
        };

        let percent = match rate {
            Some(rate) if rate.values.is_empty() => None,
            Some(rate) => Some(
                rate.value_on(date, zone)
                    .map(|v| v.percent)
                    .ok_or_else(|| TaxError::NoRateValue {
                        category: self.category.clone(),
                        rate: rate.key.clone(),
                        date,
                    })?,
            ),
            None => self.percent,
        };

        if let Some(p) = percent {
            if p.is_negative() {
                return Err(TaxError::NegativePercent {
                    category: self.category.clone(),
                    percent: p,
                });
            }
        }
        Ok(percent)
    }

    /// Write the resolved percent into the combo so it appears in output.
    pub(crate) fn prepare(
        &mut self,
        regime: &Regime,
        zone: Option<&str>,
        date: NaiveDate,
    ) -> Result<(), TaxError> {
        self.percent = self.resolve_percent(regime, zone, date)?;
        Ok(())
    }
}
