//! Greece.
//!
//! Island zones get reduced rates. The myDATA invoice type is resolved
//! from the document type and tags through the scenario table below.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::{Invoice, InvoiceType, Note, Percent, ValidationError};
use crate::dispatch::Node;
use crate::tax::{
    CATEGORY_VAT, CategoryDef, RATE_EXEMPT, RATE_REDUCED, RATE_STANDARD, RATE_SUPER_REDUCED,
    RateDef, RateValue, Regime, Scenario, ScenarioSet, TAG_REVERSE_CHARGE, TAG_SELF_BILLED,
    TAG_SIMPLIFIED, TagDefinition, common_tags,
};

pub const TAG_ISLANDS: &str = "islands";
pub const TAG_GOODS: &str = "goods";
pub const TAG_SERVICES: &str = "services";
pub const TAG_EXPORT: &str = "export";
pub const TAG_EU: &str = "eu";

/// Zone with reduced island rates.
pub const ZONE_ISLANDS: &str = "islands";

/// myDATA invoice type code (e.g. "1.1" for a domestic sale of goods).
pub const EXT_KEY_MYDATA_INVOICE_TYPE: &str = "gr-mydata-invoice-type";

pub fn regime() -> Regime {
    let mut tags = common_tags();
    tags.extend([
        TagDefinition::new(TAG_ISLANDS, "Islands Reduced Rates"),
        TagDefinition::new(TAG_GOODS, "Goods"),
        TagDefinition::new(TAG_SERVICES, "Services"),
        TagDefinition::new(TAG_EXPORT, "Export"),
        TagDefinition::new(TAG_EU, "European Union"),
    ]);

    Regime {
        country: "GR".into(),
        zone: None,
        name: "Greece".into(),
        currency: "EUR".into(),
        tags,
        scenarios: vec![invoice_scenarios()],
        categories: vec![CategoryDef {
            code: CATEGORY_VAT.into(),
            name: "VAT".into(),
            retained: false,
            rates: vec![
                rate(RATE_STANDARD, "Standard Rate", dec!(24), dec!(17), Some(dec!(23))),
                rate(RATE_REDUCED, "Reduced Rate", dec!(13), dec!(9), None),
                rate(RATE_SUPER_REDUCED, "Super-Reduced Rate", dec!(6), dec!(4), None),
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

fn rate(
    key: &str,
    name: &str,
    mainland: Decimal,
    islands: Decimal,
    before: Option<Decimal>,
) -> RateDef {
    let since = NaiveDate::from_ymd_opt(2016, 6, 1);
    let mut values = vec![
        RateValue::new(since, Percent::new(islands)).in_zones(&[ZONE_ISLANDS]),
        RateValue::new(since, Percent::new(mainland)),
    ];
    if let Some(p) = before {
        values.push(RateValue::new(None, Percent::new(p)));
    }
    RateDef {
        key: key.into(),
        name: name.into(),
        values,
    }
}

// Most specific rows first: the first scenario that sets the invoice type
// wins.
fn invoice_scenarios() -> ScenarioSet {
    use InvoiceType::{CreditNote, Standard};

    let rows: [(InvoiceType, &[&str], &str); 13] = [
        (CreditNote, &[TAG_GOODS, TAG_SIMPLIFIED, TAG_SELF_BILLED], "11.5"),
        (CreditNote, &[TAG_SIMPLIFIED], "11.4"),
        (Standard, &[TAG_SERVICES, TAG_SIMPLIFIED], "11.2"),
        (Standard, &[TAG_GOODS, TAG_SIMPLIFIED], "11.1"),
        (Standard, &[TAG_SIMPLIFIED], "11.3"),
        (CreditNote, &[], "5.1"),
        (Standard, &[TAG_SERVICES, TAG_EXPORT, TAG_EU], "2.2"),
        (Standard, &[TAG_SERVICES, TAG_EXPORT], "2.3"),
        (Standard, &[TAG_SERVICES], "2.1"),
        (Standard, &[TAG_GOODS, TAG_SELF_BILLED], "1.4"),
        (Standard, &[TAG_GOODS, TAG_EXPORT, TAG_EU], "1.2"),
        (Standard, &[TAG_GOODS, TAG_EXPORT], "1.3"),
        (Standard, &[TAG_GOODS], "1.1"),
    ];

    let mut list = vec![Scenario {
        tags: vec![TAG_REVERSE_CHARGE.into()],
        note: Some(Note::legal(
            TAG_REVERSE_CHARGE,
            "Reverse Charge / Αντίστροφη φόρτιση",
        )),
        ..Default::default()
    }];
    list.extend(rows.into_iter().map(|(type_, tags, code)| Scenario {
        types: vec![type_.key().into()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note: None,
        ext: [(EXT_KEY_MYDATA_INVOICE_TYPE.to_string(), code.to_string())].into(),
    }));

    ScenarioSet {
        schema: Invoice::SHORT_SCHEMA.into(),
        list,
    }
}

fn validate(node: Node<'_>, errors: &mut Vec<ValidationError>) {
    if let Node::Invoice(inv) = node {
        validate_invoice(inv, errors);
    }
}

fn validate_invoice(inv: &Invoice, errors: &mut Vec<ValidationError>) {
    if inv.series.as_deref().is_none_or(str::is_empty) {
        errors.push(ValidationError::new("series", "series is required"));
    }
    let has_type = inv
        .tax
        .as_ref()
        .is_some_and(|t| t.ext.contains_key(EXT_KEY_MYDATA_INVOICE_TYPE));
    if inv.type_ != InvoiceType::Proforma && !has_type {
        errors.push(ValidationError::new(
            "tax.ext",
            format!("{EXT_KEY_MYDATA_INVOICE_TYPE} is required"),
        ));
    }
}
