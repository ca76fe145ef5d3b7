//! Tax totals grouped by category and rate.
//!
//! The calculator receives every taxable line of a document, resolves each
//! combo's percent against the regime and accumulates bases per
//! `(category, rate, percent)` group. Bases are rounded once, at the end,
//! to the precision of the zero amount.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::combo::Combo;
use super::regime::Regime;
use crate::core::{Key, Percent, round_half_up};

/// Errors raised while totalling taxes. Any of them aborts the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    #[error("unknown tax category '{0}'")]
    UnknownCategory(String),

    #[error("unknown rate '{rate}' in category '{category}'")]
    UnknownRate { category: String, rate: String },

    #[error("no value for rate '{rate}' in category '{category}' on {date}")]
    NoRateValue {
        category: String,
        rate: String,
        date: NaiveDate,
    },

    #[error("negative percent {percent} in category '{category}'")]
    NegativePercent { category: String, percent: Percent },

    #[error("amount overflow in category '{0}'")]
    Overflow(String),
}

/// Anything that carries tax combos and a pre-tax amount.
pub trait TaxableLine {
    fn tax_combos(&self) -> &[Combo];
    /// The amount taxes are calculated on. Discounts report a negative
    /// amount so they reduce the base.
    fn taxable_amount(&self) -> Decimal;
}

/// Per-category breakdown of a document's taxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxTotal {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryTotal>,
    /// Total tax: regular categories added, retained categories subtracted.
    pub sum: Decimal,
}

impl TaxTotal {
    pub fn category(&self, code: &str) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| c.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub code: Key,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retained: bool,
    pub rates: Vec<RateTotal>,
    pub base: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTotal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub base: Decimal,
    /// `None` for exempt groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    pub amount: Decimal,
}

/// Inputs for a single tax total calculation.
pub struct TotalCalculator<'a> {
    /// Zero amount in the currency's precision; every result uses its scale.
    pub zero: Decimal,
    pub regime: &'a Regime,
    pub zone: Option<&'a str>,
    pub date: NaiveDate,
    /// Category whose tax is already included in line amounts.
    pub includes: Option<&'a str>,
    pub lines: Vec<&'a dyn TaxableLine>,
}

#[derive(Default)]
struct RateGroup {
    key: Option<Key>,
    percent: Option<Percent>,
    base: Decimal,
    gross: Decimal,
}

struct CategoryGroup {
    code: Key,
    retained: bool,
    rates: Vec<RateGroup>,
}

impl TotalCalculator<'_> {
    pub fn calculate(&self) -> Result<TaxTotal, TaxError> {
        let mut groups: Vec<CategoryGroup> = Vec::new();

        for line in &self.lines {
            let combos = line.tax_combos();
            if combos.is_empty() {
                continue;
            }
            let amount = line.taxable_amount();

            let mut resolved = Vec::with_capacity(combos.len());
            for combo in combos {
                resolved.push((combo, combo.resolve_percent(self.regime, self.zone, self.date)?));
            }

            let included = self.includes.and_then(|code| {
                resolved
                    .iter()
                    .find(|(c, _)| c.category == code)
                    .and_then(|(_, p)| *p)
            });
            let base = match (self.includes, included) {
                (Some(code), Some(p)) => p
                    .back_out(amount)
                    .ok_or_else(|| TaxError::Overflow(code.to_string()))?,
                _ => amount,
            };

            for (combo, percent) in resolved {
                let overflow = || TaxError::Overflow(combo.category.clone());
                let group = self.group_for(&mut groups, combo, percent)?;
                group.base = group.base.checked_add(base).ok_or_else(overflow)?;
                group.gross = group.gross.checked_add(amount).ok_or_else(overflow)?;
            }
        }

        self.finish(groups)
    }

    fn group_for<'g>(
        &self,
        groups: &'g mut Vec<CategoryGroup>,
        combo: &Combo,
        percent: Option<Percent>,
    ) -> Result<&'g mut RateGroup, TaxError> {
        let ci = match groups.iter().position(|g| g.code == combo.category) {
            Some(i) => i,
            None => {
                let def = self
                    .regime
                    .category(&combo.category)
                    .ok_or_else(|| TaxError::UnknownCategory(combo.category.clone()))?;
                groups.push(CategoryGroup {
                    code: def.code.clone(),
                    retained: def.retained,
                    rates: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let rates = &mut groups[ci].rates;
        let ri = match rates
            .iter()
            .position(|r| r.key == combo.rate && r.percent == percent)
        {
            Some(i) => i,
            None => {
                rates.push(RateGroup {
                    key: combo.rate.clone(),
                    percent,
                    ..Default::default()
                });
                rates.len() - 1
            }
        };
        Ok(&mut rates[ri])
    }

    fn finish(&self, groups: Vec<CategoryGroup>) -> Result<TaxTotal, TaxError> {
        let dp = self.zero.scale();
        let mut total = TaxTotal {
            categories: Vec::with_capacity(groups.len()),
            sum: self.zero,
        };

        for group in groups {
            let included = self.includes == Some(group.code.as_str());
            let mut category = CategoryTotal {
                code: group.code,
                retained: group.retained,
                rates: Vec::with_capacity(group.rates.len()),
                base: self.zero,
                amount: self.zero,
            };
            let overflow = || TaxError::Overflow(category.code.clone());
            for rate in group.rates {
                let base = round_half_up(rate.base, dp);
                let amount = match rate.percent {
                    None => Some(self.zero),
                    Some(_) if included => round_half_up(rate.gross, dp).checked_sub(base),
                    Some(p) => p.of(base),
                }
                .ok_or_else(overflow)?;
                category.base = category.base.checked_add(base).ok_or_else(overflow)?;
                category.amount = category.amount.checked_add(amount).ok_or_else(overflow)?;
                category.rates.push(RateTotal {
                    key: rate.key,
                    base,
                    percent: rate.percent,
                    amount,
                });
            }
            total.sum = if category.retained {
                total.sum.checked_sub(category.amount)
            } else {
                total.sum.checked_add(category.amount)
            }
            .ok_or_else(overflow)?;
            total.categories.push(category);
        }

        Ok(total)
    }
}
