use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::BillingError;
use super::types::*;

/// How to turn an issued invoice into a correction of itself.
///
/// Exactly one of `credit` or `debit` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionOptions {
    /// Issue a credit note reversing the original.
    #[serde(default)]
    pub credit: bool,
    /// Issue a debit note adding to the original.
    #[serde(default)]
    pub debit: bool,
    /// Issue date of the correction; the original's is kept if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Series for the correction document; the original's is kept if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Human readable reason, stored on the preceding reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Invoice {
    /// Convert this invoice into a credit or debit note that refers back to
    /// it. The original identity is pushed onto `preceding`; code, uuid and
    /// totals are cleared so the caller can assign a new code and
    /// recalculate.
    pub fn correct(&mut self, opts: &CorrectionOptions) -> Result<(), BillingError> {
        let type_ = match (opts.credit, opts.debit) {
            (true, false) => InvoiceType::CreditNote,
            (false, true) => InvoiceType::DebitNote,
            (true, true) => {
                return Err(BillingError::Correction(
                    "cannot request both credit and debit".into(),
                ));
            }
            (false, false) => {
                return Err(BillingError::Correction(
                    "either credit or debit must be requested".into(),
                ));
            }
        };
        if self.code.trim().is_empty() {
            return Err(BillingError::Correction(
                "cannot correct an invoice without a code".into(),
            ));
        }

        self.preceding.push(Preceding {
            uuid: self.uuid.take(),
            type_: self.type_,
            series: self.series.clone(),
            code: std::mem::take(&mut self.code),
            issue_date: self.issue_date,
            reason: opts.reason.clone(),
        });

        self.type_ = type_;
        if let Some(series) = &opts.series {
            self.series = Some(series.clone());
        }
        if let Some(date) = opts.date {
            self.issue_date = Some(date);
        }
        self.totals = None;
        Ok(())
    }

    /// JSON schema describing [`CorrectionOptions`].
    pub fn correction_options_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "credit": { "type": "boolean", "title": "Credit" },
                "debit": { "type": "boolean", "title": "Debit" },
                "date": { "type": "string", "format": "date", "title": "Date" },
                "series": { "type": "string", "title": "Series" },
                "reason": { "type": "string", "title": "Reason" }
            },
            "oneOf": [
                { "properties": { "credit": { "const": true } }, "required": ["credit"] },
                { "properties": { "debit": { "const": true } }, "required": ["debit"] }
            ]
        })
    }
}
