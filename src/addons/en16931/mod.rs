//! EN 16931-1:2017 addon.
//!
//! Normalization fills in the UNTDID codes that EN 16931 syntaxes need
//! (tax categories, payment means, allowance and charge reasons) from
//! the keys already on the document. Validation makes sure they are
//! present and known, and applies the invoice-level business rules.

pub mod untdid;

use crate::core::{
    Advance, Charge, Discount, Extensions, Instructions, Invoice, InvoiceType, LineDiscount,
    ValidationError,
};
use crate::dispatch::{Node, NodeMut};
use crate::tax::{
    AddonDef, CATEGORY_VAT, Combo, RATE_EXEMPT, RATE_ZERO, Scenario, ScenarioSet, TAG_SELF_BILLED,
};

/// Key of the EN 16931-1:2017 addon.
pub const V2017: &str = "eu-en16931-v2017";

pub const EXT_KEY_TAX_CATEGORY: &str = "untdid-tax-category";
pub const EXT_KEY_PAYMENT_MEANS: &str = "untdid-payment-means";
pub const EXT_KEY_ALLOWANCE: &str = "untdid-allowance";
pub const EXT_KEY_CHARGE: &str = "untdid-charge";
pub const EXT_KEY_DOCUMENT_TYPE: &str = "untdid-document-type";

/// UNTDID 5305 tax category codes.
pub const TAX_CATEGORY_STANDARD: &str = "S";
pub const TAX_CATEGORY_ZERO: &str = "Z";
pub const TAX_CATEGORY_EXEMPT: &str = "E";

pub fn addon() -> AddonDef {
    AddonDef {
        key: V2017.into(),
        name: "EN 16931-1:2017".into(),
        description: "European Norm 16931-1:2017 for electronic invoicing: \
                      code mappings and core business rules."
            .into(),
        tags: vec![],
        scenarios: vec![document_type_scenarios()],
        normalizer: Some(normalize),
        validator: Some(validate),
    }
}

fn document_type_scenarios() -> ScenarioSet {
    let row = |type_: InvoiceType, tags: &[&str], code: &str| Scenario {
        types: vec![type_.key().into()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note: None,
        ext: [(EXT_KEY_DOCUMENT_TYPE.to_string(), code.to_string())].into(),
    };
    ScenarioSet {
        schema: Invoice::SHORT_SCHEMA.into(),
        list: vec![
            row(InvoiceType::Standard, &[TAG_SELF_BILLED], "389"),
            row(InvoiceType::Standard, &[], "380"),
            row(InvoiceType::CreditNote, &[], "381"),
            row(InvoiceType::DebitNote, &[], "383"),
            row(InvoiceType::Corrective, &[], "384"),
        ],
    }
}

fn normalize(node: NodeMut<'_>) {
    match node {
        NodeMut::Combo(combo) => normalize_combo(combo),
        NodeMut::Instructions(inst) => {
            set_code(&mut inst.ext, EXT_KEY_PAYMENT_MEANS, untdid::payment_means_code(&inst.key))
        }
        NodeMut::Advance(adv) => normalize_advance(adv),
        NodeMut::Discount(d) => normalize_discount(d),
        NodeMut::Charge(c) => normalize_charge(c),
        _ => {}
    }
}

fn set_code(ext: &mut Extensions, key: &str, code: Option<&str>) {
    if let Some(code) = code {
        ext.entry(key.to_string()).or_insert_with(|| code.to_string());
    }
}

fn normalize_combo(combo: &mut Combo) {
    if combo.category != CATEGORY_VAT {
        return;
    }
    let code = match combo.rate.as_deref() {
        Some(RATE_EXEMPT) => TAX_CATEGORY_EXEMPT,
        Some(RATE_ZERO) => TAX_CATEGORY_ZERO,
        Some(_) => TAX_CATEGORY_STANDARD,
        None => match combo.percent {
            None => TAX_CATEGORY_EXEMPT,
            Some(p) if p.is_zero() => TAX_CATEGORY_ZERO,
            Some(_) => TAX_CATEGORY_STANDARD,
        },
    };
    set_code(&mut combo.ext, EXT_KEY_TAX_CATEGORY, Some(code));
}

fn normalize_advance(adv: &mut Advance) {
    let code = adv.key.as_deref().and_then(untdid::payment_means_code);
    set_code(&mut adv.ext, EXT_KEY_PAYMENT_MEANS, code);
}

fn normalize_discount(d: &mut Discount) {
    let code = d.key.as_deref().and_then(untdid::allowance_code);
    set_code(&mut d.ext, EXT_KEY_ALLOWANCE, code);
}

fn normalize_charge(c: &mut Charge) {
    let code = c.key.as_deref().and_then(untdid::charge_code);
    set_code(&mut c.ext, EXT_KEY_CHARGE, code);
}

fn validate(node: Node<'_>, errors: &mut Vec<ValidationError>) {
    if let Err(e) = check(node) {
        errors.push(e);
    }
}

/// Each node kind carries at most one EN 16931 rule.
fn check(node: Node<'_>) -> Result<(), ValidationError> {
    match node {
        Node::Invoice(inv) => validate_invoice(inv),
        Node::Combo(combo) => validate_combo(combo),
        Node::Instructions(inst) => validate_instructions(inst),
        Node::Advance(adv) => require_ext(&adv.ext, EXT_KEY_PAYMENT_MEANS, "BR-49"),
        Node::Discount(d) => validate_allowance(&d.ext),
        Node::Charge(c) => validate_charge(&c.ext),
        Node::LineDiscount(d) => validate_line_discount(d),
        _ => Ok(()),
    }
}

fn require_ext(ext: &Extensions, key: &str, rule: &str) -> Result<(), ValidationError> {
    if ext.get(key).is_none_or(String::is_empty) {
        return Err(ValidationError::with_rule(
            format!("ext.{key}"),
            "required",
            rule,
        ));
    }
    Ok(())
}

// BR-CO-25: a positive amount due needs payment terms or a due date.
fn validate_invoice(inv: &Invoice) -> Result<(), ValidationError> {
    let Some(totals) = &inv.totals else {
        return Ok(());
    };
    let due = totals.due.unwrap_or(totals.payable);
    if due.is_sign_positive() && !due.is_zero() {
        let has_terms = inv.payment.as_ref().is_some_and(|p| p.terms.is_some());
        if !has_terms {
            return Err(ValidationError::with_rule(
                "payment.terms",
                "payment terms are required when an amount is due",
                "BR-CO-25",
            ));
        }
    }
    Ok(())
}

fn validate_combo(combo: &Combo) -> Result<(), ValidationError> {
    if combo.category != CATEGORY_VAT {
        return Ok(());
    }
    require_ext(&combo.ext, EXT_KEY_TAX_CATEGORY, "BR-CO-18")
}

fn validate_instructions(inst: &Instructions) -> Result<(), ValidationError> {
    require_ext(&inst.ext, EXT_KEY_PAYMENT_MEANS, "BR-49")
}

fn validate_allowance(ext: &Extensions) -> Result<(), ValidationError> {
    match ext.get(EXT_KEY_ALLOWANCE) {
        Some(code) if !untdid::is_known_allowance_reason(code) => {
            Err(ValidationError::with_rule(
                format!("ext.{EXT_KEY_ALLOWANCE}"),
                format!("unknown allowance reason code '{code}'"),
                "BR-CL-19",
            ))
        }
        _ => Ok(()),
    }
}

fn validate_charge(ext: &Extensions) -> Result<(), ValidationError> {
    match ext.get(EXT_KEY_CHARGE) {
        Some(code) if !untdid::is_known_charge_reason(code) => Err(ValidationError::with_rule(
            format!("ext.{EXT_KEY_CHARGE}"),
            format!("unknown charge reason code '{code}'"),
            "BR-CL-20",
        )),
        _ => Ok(()),
    }
}

fn validate_line_discount(d: &LineDiscount) -> Result<(), ValidationError> {
    match d.code.as_deref() {
        Some(code) if !untdid::is_known_allowance_reason(code) => {
            Err(ValidationError::with_rule(
                "code",
                format!("unknown allowance reason code '{code}'"),
                "BR-CL-19",
            ))
        }
        _ => Ok(()),
    }
}
