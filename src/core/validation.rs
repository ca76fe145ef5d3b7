use rust_decimal::Decimal;

use super::currencies::is_known_currency_code;
use super::error::{BillingError, ValidationError, ValidationErrors};
use super::percent::round_half_up;
use super::types::*;
use crate::dispatch;
use crate::tax::{AddonDef, Registry, TAG_REVERSE_CHARGE};

impl Invoice {
    /// Run structural checks, addon and regime validators, and arithmetic
    /// checks. All failures are collected into a single error.
    pub fn validate(&self, registry: &Registry) -> Result<(), BillingError> {
        ValidationErrors::from(validate_invoice(self, registry)).into_result()
    }
}

/// Validate an invoice against its regime and active addons.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice, registry: &Registry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let regime = invoice.tax_regime(registry);
    if regime.is_none() {
        errors.push(ValidationError::new(
            "supplier.tax_id",
            "no tax regime for the supplier's tax identity",
        ));
    }

    if invoice.code.trim().is_empty() {
        errors.push(ValidationError::new("code", "code must not be empty"));
    }

    if invoice.currency.trim().is_empty() {
        errors.push(ValidationError::new("currency", "currency must not be empty"));
    } else if !is_known_currency_code(&invoice.currency) {
        errors.push(ValidationError::new(
            "currency",
            format!("currency '{}' is not a known ISO 4217 code", invoice.currency),
        ));
    }

    if invoice.issue_date.is_none() {
        errors.push(ValidationError::new("issue_date", "issue date is required"));
    }

    match &invoice.supplier {
        Some(supplier) => validate_party(supplier, "supplier", &mut errors),
        None => errors.push(ValidationError::new("supplier", "supplier is required")),
    }
    if let Some(customer) = &invoice.customer {
        validate_party(customer, "customer", &mut errors);
    }

    if invoice.lines.is_empty() {
        errors.push(ValidationError::new(
            "lines",
            "invoice must have at least one line",
        ));
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }
    for (i, d) in invoice.discounts.iter().enumerate() {
        validate_combos(&d.taxes, &format!("discounts[{i}]"), &mut errors);
    }
    for (i, c) in invoice.charges.iter().enumerate() {
        validate_combos(&c.taxes, &format!("charges[{i}]"), &mut errors);
    }

    for (i, note) in invoice.notes.iter().enumerate() {
        if note.text.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("notes[{i}].text"),
                "note text must not be empty",
            ));
        }
    }

    let mut addons: Vec<&AddonDef> = Vec::with_capacity(invoice.addons.len());
    for (i, key) in invoice.addons.iter().enumerate() {
        match registry.addon(key) {
            Some(addon) => addons.push(addon),
            None => errors.push(ValidationError::new(
                format!("addons[{i}]"),
                format!("unknown addon '{key}'"),
            )),
        }
    }

    errors.extend(dispatch::validate(invoice, &addons, regime));

    errors.extend(validate_arithmetic(invoice));

    errors
}

/// Validate invoice arithmetic (totals, rounding).
pub fn validate_arithmetic(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(totals) = &invoice.totals else {
        errors.push(ValidationError::new(
            "totals",
            "totals must be calculated before validation (call calculate first)",
        ));
        return errors;
    };
    let dp = totals.sum.scale();

    for (i, line) in invoice.lines.iter().enumerate() {
        expect_amount(
            &mut errors,
            format!("lines[{i}].sum"),
            line.sum,
            line.item.price.checked_mul(line.quantity),
            "price × quantity",
        );
        let discount = line.discount.as_ref().map_or(Decimal::ZERO, |d| d.amount);
        expect_amount(
            &mut errors,
            format!("lines[{i}].total"),
            line.total,
            line.sum.checked_sub(discount),
            "sum - discount",
        );
    }

    let line_totals = invoice
        .lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.total))
        .map(|sum| round_half_up(sum, dp));
    expect_amount(&mut errors, "totals.sum", totals.sum, line_totals, "sum of line totals");

    for (i, d) in invoice.discounts.iter().enumerate() {
        if let Some(p) = d.percent.filter(|p| !p.is_zero()) {
            expect_amount(
                &mut errors,
                format!("discounts[{i}].amount"),
                d.amount,
                p.of(d.base.unwrap_or(totals.sum)),
                &format!("{p} of base"),
            );
        }
    }
    for (i, c) in invoice.charges.iter().enumerate() {
        if let Some(p) = c.percent.filter(|p| !p.is_zero()) {
            expect_amount(
                &mut errors,
                format!("charges[{i}].amount"),
                c.amount,
                p.of(c.base.unwrap_or(totals.sum)),
                &format!("{p} of base"),
            );
        }
    }

    let expected_total = totals
        .sum
        .checked_sub(totals.discount.unwrap_or_default())
        .and_then(|t| t.checked_add(totals.charge.unwrap_or_default()))
        .and_then(|t| t.checked_sub(totals.tax_included.unwrap_or_default()));
    expect_amount(
        &mut errors,
        "totals.total",
        totals.total,
        expected_total,
        "sum - discounts + charges - included tax",
    );

    let reverse_charge = invoice
        .tax
        .as_ref()
        .is_some_and(|t| t.contains_tag(TAG_REVERSE_CHARGE));
    if reverse_charge {
        if !totals.tax.is_zero() {
            errors.push(ValidationError::new(
                "totals.tax",
                "tax must be zero for reverse charge invoices",
            ));
        }
    } else if let Some(taxes) = &totals.taxes {
        expect_amount(
            &mut errors,
            "totals.tax",
            totals.tax,
            Some(taxes.sum),
            "sum of tax categories",
        );
    }

    expect_amount(
        &mut errors,
        "totals.total_with_tax",
        totals.total_with_tax,
        totals.total.checked_add(totals.tax),
        "total + tax",
    );

    expect_amount(
        &mut errors,
        "totals.payable",
        totals.payable,
        totals
            .total_with_tax
            .checked_add(totals.outlays.unwrap_or_default()),
        "total with tax + outlays",
    );

    if let Some(advances) = totals.advances {
        let expected_due = totals.payable.checked_sub(advances);
        match (totals.due, expected_due) {
            (Some(due), Some(expected)) if due == expected => {}
            _ => errors.push(ValidationError::new(
                "totals.due",
                format!("due does not match payable {} - advances {}", totals.payable, advances),
            )),
        }
    }

    errors
}

/// Record an error on `field` unless `actual` equals the `expected`
/// derivation. An expected value that overflowed never matches.
fn expect_amount(
    errors: &mut Vec<ValidationError>,
    field: impl Into<String>,
    actual: Decimal,
    expected: Option<Decimal>,
    derivation: &str,
) {
    match expected {
        Some(e) if e == actual => {}
        Some(e) => errors.push(ValidationError::new(
            field,
            format!("{actual} does not match {derivation} {e}"),
        )),
        None => errors.push(ValidationError::new(
            field,
            format!("{derivation} overflows"),
        )),
    }
}

fn validate_party(party: &Party, prefix: &str, errors: &mut Vec<ValidationError>) {
    if party.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.name"),
            "name must not be empty",
        ));
    }
    if let Some(id) = &party.tax_id {
        if id.country.trim().len() != 2 {
            errors.push(ValidationError::new(
                format!("{prefix}.tax_id.country"),
                "country must be an ISO 3166-1 alpha-2 code",
            ));
        }
    }
}

fn validate_line(line: &Line, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.quantity.is_zero() {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must not be zero",
        ));
    }

    if line.item.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.item.name"),
            "item name must not be empty",
        ));
    }

    validate_combos(&line.taxes, &prefix, errors);
}

fn validate_combos(combos: &[crate::tax::Combo], prefix: &str, errors: &mut Vec<ValidationError>) {
    for (i, combo) in combos.iter().enumerate() {
        if combo.category.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{prefix}.taxes[{i}].cat"),
                "tax category is required",
            ));
        }
        if combos[..i].iter().any(|c| c.category == combo.category) {
            errors.push(ValidationError::new(
                format!("{prefix}.taxes[{i}].cat"),
                format!("category '{}' appears more than once", combo.category),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Percent;
    use crate::tax::{
        CATEGORY_VAT, CategoryDef, Combo, RATE_STANDARD, RateDef, RateValue, Regime, common_tags,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn registry() -> Registry {
        Registry::builder()
            .regime(Regime {
                country: "XX".into(),
                zone: None,
                name: "Test".into(),
                currency: "EUR".into(),
                tags: common_tags(),
                scenarios: vec![],
                categories: vec![CategoryDef {
                    code: CATEGORY_VAT.into(),
                    name: "VAT".into(),
                    retained: false,
                    rates: vec![RateDef {
                        key: RATE_STANDARD.into(),
                        name: "Standard".into(),
                        values: vec![RateValue::new(None, Percent::new(dec!(20)))],
                    }],
                }],
                validator: None,
            })
            .build()
    }

    fn party(name: &str) -> Party {
        Party {
            name: name.into(),
            tax_id: Some(TaxIdentity {
                country: "XX".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            code: "INV-1".into(),
            currency: "EUR".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 15),
            supplier: Some(party("Seller Ltd")),
            customer: Some(party("Buyer Ltd")),
            lines: vec![Line {
                quantity: dec!(2),
                item: Item {
                    name: "Consulting".into(),
                    price: dec!(50.00),
                    ..Default::default()
                },
                taxes: vec![Combo::rate(CATEGORY_VAT, RATE_STANDARD)],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn calculated_invoice_is_valid() {
        let registry = registry();
        let mut inv = invoice();
        inv.calculate(&registry).unwrap();
        let errors = validate_invoice(&inv, &registry);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert!(inv.validate(&registry).is_ok());
    }

    #[test]
    fn uncalculated_invoice_needs_totals() {
        let registry = registry();
        let errors = validate_invoice(&invoice(), &registry);
        assert!(errors.iter().any(|e| e.field == "totals"));
    }

    #[test]
    fn collects_every_structural_error() {
        let registry = registry();
        let mut inv = invoice();
        inv.calculate(&registry).unwrap();
        inv.code.clear();
        inv.currency = "XYZ".into();
        inv.lines[0].item.name.clear();
        inv.notes.push(Note::default());

        let errors = validate_invoice(&inv, &registry);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"code"));
        assert!(fields.contains(&"currency"));
        assert!(fields.contains(&"lines[0].item.name"));
        assert!(fields.contains(&"notes[0].text"));
    }

    #[test]
    fn unknown_supplier_regime() {
        let registry = registry();
        let mut inv = invoice();
        inv.supplier.as_mut().unwrap().tax_id.as_mut().unwrap().country = "YY".into();
        let errors = validate_invoice(&inv, &registry);
        assert!(errors.iter().any(|e| e.field == "supplier.tax_id"));
    }

    #[test]
    fn unknown_addon_reported() {
        let registry = registry();
        let mut inv = invoice();
        inv.calculate(&registry).unwrap();
        inv.addons.push("nope".into());
        let errors = validate_invoice(&inv, &registry);
        assert!(errors.iter().any(|e| e.field == "addons[0]"));
    }

    #[test]
    fn tampered_totals_detected() {
        let registry = registry();
        let mut inv = invoice();
        inv.calculate(&registry).unwrap();
        if let Some(t) = inv.totals.as_mut() {
            t.payable += dec!(1);
        }
        let errors = validate_arithmetic(&inv);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "totals.payable");
    }

    #[test]
    fn duplicate_category_on_line() {
        let registry = registry();
        let mut inv = invoice();
        inv.lines[0].taxes.push(Combo::rate(CATEGORY_VAT, RATE_STANDARD));
        let errors = validate_invoice(&inv, &registry);
        assert!(errors.iter().any(|e| e.field == "lines[0].taxes[1].cat"));
    }
}
