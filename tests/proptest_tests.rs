//! Property-based tests for invoice calculation.
//!
//! Run with: `cargo test --test proptest_tests`

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tarifa::core::*;
use tarifa::tax::{CATEGORY_VAT, RATE_REDUCED, RATE_STANDARD, RATE_ZERO, Registry};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build(lines: Vec<Line>) -> InvoiceBuilder {
    let mut builder = InvoiceBuilder::new("P-1", date(2024, 6, 15)).supplier(
        PartyBuilder::new("Provide One B.V.")
            .tax_id("NL", "000099995B57")
            .build(),
    );
    for line in lines {
        builder = builder.add_line(line);
    }
    builder
}

// ── Strategies ──────────────────────────────────────────────────────────────

/// A price from 0.01 to 99999.99.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A quantity from 1 to 99, optionally with one decimal place.
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1u32..100u32).prop_map(Decimal::from),
        (1i64..1000i64).prop_map(|tenths| Decimal::new(tenths, 1)),
    ]
}

fn arb_rate() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(RATE_STANDARD), Just(RATE_REDUCED), Just(RATE_ZERO)]
}

fn arb_line() -> impl Strategy<Value = Line> {
    (arb_quantity(), arb_price(), arb_rate()).prop_map(|(qty, price, rate)| {
        LineBuilder::new("Item", qty, price)
            .rate(CATEGORY_VAT, rate)
            .build()
    })
}

fn arb_lines() -> impl Strategy<Value = Vec<Line>> {
    prop::collection::vec(arb_line(), 1..=6)
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    /// Line and document totals are consistent with each other.
    #[test]
    fn totals_are_consistent(lines in arb_lines()) {
        let mut inv = build(lines).build().unwrap();
        inv.calculate(Registry::global()).unwrap();

        for line in &inv.lines {
            prop_assert_eq!(line.sum, line.item.price * line.quantity);
            prop_assert_eq!(line.total, line.sum);
        }
        let totals = inv.totals.as_ref().unwrap();
        prop_assert_eq!(totals.sum.scale(), 2);
        prop_assert_eq!(totals.total, totals.sum);
        prop_assert_eq!(totals.total_with_tax, totals.total + totals.tax);
        prop_assert_eq!(totals.payable, totals.total_with_tax);
        prop_assert!(validate_arithmetic(&inv).is_empty());
    }

    /// Calculating twice gives byte-identical output.
    #[test]
    fn calculate_is_idempotent(lines in arb_lines(), pct in 0u32..=50u32) {
        let mut inv = build(lines)
            .add_discount(Discount {
                percent: Some(Percent::new(Decimal::from(pct))),
                ..Default::default()
            })
            .build()
            .unwrap();
        inv.calculate(Registry::global()).unwrap();
        let first = serde_json::to_string(&inv).unwrap();
        inv.calculate(Registry::global()).unwrap();
        prop_assert_eq!(serde_json::to_string(&inv).unwrap(), first);
    }

    /// A percentage discount never exceeds the sum it is taken from.
    #[test]
    fn discount_bounded_by_sum(lines in arb_lines(), pct in 0u32..=100u32) {
        let mut inv = build(lines)
            .add_discount(Discount {
                percent: Some(Percent::new(Decimal::from(pct))),
                ..Default::default()
            })
            .build()
            .unwrap();
        inv.calculate(Registry::global()).unwrap();
        let totals = inv.totals.as_ref().unwrap();
        let discount = totals.discount.unwrap_or_default();
        prop_assert!(discount <= totals.sum);
        prop_assert_eq!(totals.total, totals.sum - discount);
    }

    /// Removing included tax and recalculating lands within a cent of the
    /// original total with tax.
    #[test]
    fn included_tax_round_trip(price in arb_price(), qty in 1u32..100u32) {
        let line = LineBuilder::new("Item", Decimal::from(qty), price)
            .rate(CATEGORY_VAT, RATE_STANDARD)
            .build();
        let mut inv = build(vec![line]).prices_include(CATEGORY_VAT).build().unwrap();
        inv.calculate(Registry::global()).unwrap();
        let gross = inv.totals.as_ref().unwrap().total_with_tax;
        prop_assert_eq!(gross, price * Decimal::from(qty));

        let mut net = inv.remove_included_taxes();
        net.calculate(Registry::global()).unwrap();
        let diff = (net.totals.unwrap().total_with_tax - gross).abs();
        prop_assert!(diff <= dec!(0.01), "difference {} too large", diff);
    }
}
