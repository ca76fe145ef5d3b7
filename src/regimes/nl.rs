//! The Netherlands.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::core::{Note, Percent, TaxIdentity, ValidationError};
use crate::dispatch::Node;
use crate::tax::{
    CATEGORY_VAT, CategoryDef, RATE_EXEMPT, RATE_REDUCED, RATE_STANDARD, RATE_ZERO, RateDef,
    RateValue, Regime, Scenario, ScenarioSet, TAG_REVERSE_CHARGE, common_tags,
};

const VAT_CODE_LEN: usize = 12;

pub fn regime() -> Regime {
    Regime {
        country: "NL".into(),
        zone: None,
        name: "The Netherlands".into(),
        currency: "EUR".into(),
        tags: common_tags(),
        scenarios: vec![ScenarioSet {
            schema: "bill/invoice".into(),
            list: vec![Scenario {
                tags: vec![TAG_REVERSE_CHARGE.into()],
                note: Some(Note::legal(
                    TAG_REVERSE_CHARGE,
                    "Reverse Charge / Omgekeerde heffing.",
                )),
                ..Default::default()
            }],
        }],
        categories: vec![CategoryDef {
            code: CATEGORY_VAT.into(),
            name: "VAT".into(),
            retained: false,
            rates: vec![
                RateDef {
                    key: RATE_ZERO.into(),
                    name: "Zero Rate".into(),
                    values: vec![RateValue::new(None, Percent::ZERO)],
                },
                RateDef {
                    key: RATE_STANDARD.into(),
                    name: "Standard Rate".into(),
                    values: vec![
                        RateValue::new(since(2012, 10, 1), Percent::new(dec!(21))),
                        RateValue::new(since(2001, 1, 1), Percent::new(dec!(19))),
                    ],
                },
                RateDef {
                    key: RATE_REDUCED.into(),
                    name: "Reduced Rate".into(),
                    values: vec![
                        RateValue::new(since(2019, 1, 1), Percent::new(dec!(9))),
                        RateValue::new(since(2001, 1, 1), Percent::new(dec!(6))),
                    ],
                },
                RateDef {
                    key: RATE_EXEMPT.into(),
                    name: "Exempt".into(),
                    values: vec![],
                },
            ],
        }],
        validator: Some(validate),
    }
}

fn since(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn validate(node: Node<'_>, errors: &mut Vec<ValidationError>) {
    if let Node::Party(party) = node {
        if let Some(id) = &party.tax_id {
            validate_tax_identity(id, errors);
        }
    }
}

fn validate_tax_identity(id: &TaxIdentity, errors: &mut Vec<ValidationError>) {
    if id.country != "NL" {
        return;
    }
    if let Some(code) = id.code.as_deref().filter(|c| !c.is_empty()) {
        if let Err(msg) = verify_tax_code(code) {
            errors.push(ValidationError::new("tax_id.code", msg));
        }
    }
}

/// Check a Dutch VAT number: nine digits, `B`, two digits, with a mod-11
/// checksum over the first nine digits.
pub fn verify_tax_code(code: &str) -> Result<(), &'static str> {
    let code = code.to_uppercase();
    if code.len() != VAT_CODE_LEN || !code.is_ascii() {
        return Err("invalid VAT number");
    }
    if code.as_bytes()[9] != b'B' {
        return Err("invalid VAT number");
    }
    let digits: u64 = code[..9].parse().map_err(|_| "invalid VAT number")?;
    if !code[10..].bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid VAT number");
    }

    let check = digits % 10;
    let mut num = digits;
    let mut sum = 0;
    for weight in 2..=9 {
        num /= 10;
        sum += (num % 10) * weight;
    }
    let mut sum = sum % 11;
    if sum > 9 {
        sum = 0;
    }
    if sum != check {
        return Err("checksum mismatch");
    }
    Ok(())
}
