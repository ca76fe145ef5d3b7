use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tarifa::core::*;
use tarifa::regimes::gr;
use tarifa::tax::{
    CATEGORY_VAT, RATE_REDUCED, RATE_STANDARD, Registry, TAG_CUSTOMER_RATES, TAG_REVERSE_CHARGE,
    TaxError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn registry() -> &'static Registry {
    Registry::global()
}

fn dutch_supplier() -> Party {
    PartyBuilder::new("Provide One B.V.")
        .tax_id("NL", "000099995B57")
        .email("billing@provideone.nl")
        .build()
}

fn greek_supplier() -> Party {
    PartyBuilder::new("Provide One A.E.").tax_country("GR").build()
}

fn consumer() -> Party {
    PartyBuilder::new("Sample Consumer").build()
}

fn services(qty: rust_decimal::Decimal, price: rust_decimal::Decimal) -> Line {
    LineBuilder::new("Development services", qty, price)
        .unit("h")
        .rate(CATEGORY_VAT, RATE_STANDARD)
        .build()
}

fn dutch_invoice() -> InvoiceBuilder {
    InvoiceBuilder::new("2024-001", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .customer(consumer())
        .add_line(services(dec!(10), dec!(100.00)))
}

// --- Basic calculation ---

#[test]
fn dutch_standard_rate() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.calculate(registry()).unwrap();

    let line = &inv.lines[0];
    assert_eq!(line.index, 1);
    assert_eq!(line.sum, dec!(1000.00));
    assert_eq!(line.total, dec!(1000.00));
    assert_eq!(line.taxes[0].percent.unwrap().points(), dec!(21));

    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.sum, dec!(1000.00));
    assert_eq!(totals.total, dec!(1000.00));
    assert_eq!(totals.tax, dec!(210.00));
    assert_eq!(totals.total_with_tax, dec!(1210.00));
    assert_eq!(totals.payable, dec!(1210.00));
    assert_eq!(totals.discount, None);
    assert_eq!(totals.due, None);

    let vat = totals.taxes.as_ref().unwrap().category(CATEGORY_VAT).unwrap();
    assert_eq!(vat.base, dec!(1000.00));
    assert_eq!(vat.rates[0].key.as_deref(), Some(RATE_STANDARD));

    inv.validate(registry()).unwrap();
}

#[test]
fn totals_carry_currency_precision() {
    let mut inv = InvoiceBuilder::new("2024-002", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .add_line(services(dec!(3), dec!(33.333)))
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    // 99.999 is kept on the line and rounded once for the document.
    assert_eq!(inv.lines[0].sum, dec!(99.999));
    let totals = inv.totals.unwrap();
    assert_eq!(totals.sum, dec!(100.00));
    assert_eq!(totals.sum.scale(), 2);
    assert_eq!(totals.tax, dec!(21.00));
    assert_eq!(totals.payable, dec!(121.00));
}

#[test]
fn historical_rate_follows_value_date() {
    let mut inv = dutch_invoice()
        .value_date(date(2012, 9, 1))
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.totals.unwrap().tax, dec!(190.00));
}

#[test]
fn mixed_rates_grouped_per_rate() {
    let mut inv = dutch_invoice()
        .add_line(
            LineBuilder::new("Books", dec!(2), dec!(25.00))
                .rate(CATEGORY_VAT, RATE_REDUCED)
                .build(),
        )
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    let totals = inv.totals.as_ref().unwrap();
    let vat = totals.taxes.as_ref().unwrap().category(CATEGORY_VAT).unwrap();
    assert_eq!(vat.rates.len(), 2);
    assert_eq!(vat.rates[1].base, dec!(50.00));
    assert_eq!(vat.rates[1].amount, dec!(4.50));
    assert_eq!(totals.tax, dec!(214.50));
    assert_eq!(inv.lines[1].index, 2);
}

#[test]
fn prices_including_tax() {
    let mut inv = InvoiceBuilder::new("2024-003", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .add_line(services(dec!(1), dec!(1000.00)))
        .prices_include(CATEGORY_VAT)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.sum, dec!(1000.00));
    assert_eq!(totals.tax_included, Some(dec!(173.55)));
    assert_eq!(totals.total, dec!(826.45));
    assert_eq!(totals.tax, dec!(173.55));
    assert_eq!(totals.total_with_tax, dec!(1000.00));

    let vat = totals.taxes.as_ref().unwrap().category(CATEGORY_VAT).unwrap();
    assert_eq!(vat.base, dec!(826.45));
    inv.validate(registry()).unwrap();
}

#[test]
fn remove_included_taxes_keeps_totals() {
    let mut inv = InvoiceBuilder::new("2024-004", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .add_line(services(dec!(10), dec!(121.00)))
        .prices_include(CATEGORY_VAT)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    let included = inv.totals.as_ref().unwrap().clone();

    let mut net = inv.remove_included_taxes();
    assert_eq!(net.lines[0].item.price, dec!(100.000));
    assert!(net.tax.as_ref().unwrap().prices_include.is_none());

    net.calculate(registry()).unwrap();
    let totals = net.totals.unwrap();
    assert_eq!(totals.total, included.total);
    assert_eq!(totals.tax, included.tax);
    assert_eq!(totals.total_with_tax, included.total_with_tax);
}

#[test]
fn calculation_is_idempotent() {
    let mut inv = dutch_invoice()
        .tag(TAG_REVERSE_CHARGE)
        .add_discount(Discount {
            percent: Some(Percent::new(dec!(5))),
            taxes: vec![tarifa::tax::Combo::rate(CATEGORY_VAT, RATE_STANDARD)],
            ..Default::default()
        })
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    let first = serde_json::to_string(&inv).unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(serde_json::to_string(&inv).unwrap(), first);
    assert_eq!(inv.notes.len(), 1);
}

// --- Tags and scenarios ---

#[test]
fn reverse_charge_zeroes_tax_and_adds_note() {
    let mut inv = dutch_invoice().tag(TAG_REVERSE_CHARGE).build().unwrap();
    inv.calculate(registry()).unwrap();

    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.tax, dec!(0.00));
    assert_eq!(totals.total_with_tax, dec!(1000.00));
    // The computed category amounts are still reported.
    assert_eq!(totals.taxes.as_ref().unwrap().sum, dec!(210.00));

    assert_eq!(inv.notes.len(), 1);
    let note = &inv.notes[0];
    assert_eq!(note.key.as_deref(), Some(NOTE_KEY_LEGAL));
    assert_eq!(note.src.as_deref(), Some(TAG_REVERSE_CHARGE));
    assert_eq!(note.text, "Reverse Charge / Omgekeerde heffing.");
    inv.validate(registry()).unwrap();
}

#[test]
fn existing_note_with_same_source_is_kept() {
    let mut inv = dutch_invoice().tag(TAG_REVERSE_CHARGE).build().unwrap();
    inv.notes.push(Note::legal(TAG_REVERSE_CHARGE, "Custom wording"));
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.notes.len(), 1);
    assert_eq!(inv.notes[0].text, "Custom wording");
}

#[test]
fn unknown_tag_rejected() {
    let mut inv = dutch_invoice().tag(gr::TAG_GOODS).build().unwrap();
    let err = inv.calculate(registry()).unwrap_err();
    assert!(matches!(err, BillingError::InvalidTag(ref t) if t == "goods"));
    assert!(inv.totals.is_none());
}

#[test]
fn greek_invoice_type_from_tags() {
    let mut inv = InvoiceBuilder::new("101", date(2024, 3, 1))
        .series("A")
        .supplier(greek_supplier())
        .add_line(services(dec!(1), dec!(100.00)))
        .tag(gr::TAG_GOODS)
        .tag(gr::TAG_EXPORT)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    let ext = &inv.tax.as_ref().unwrap().ext;
    assert_eq!(ext[gr::EXT_KEY_MYDATA_INVOICE_TYPE], "1.3");
    assert_eq!(inv.totals.as_ref().unwrap().tax, dec!(24.00));
    inv.validate(registry()).unwrap();

    inv.series = None;
    match inv.validate(registry()).unwrap_err() {
        BillingError::Validation(errors) => {
            assert!(errors.has_field("series"));
            assert_eq!(errors.0[0].rule.as_deref(), Some("GR"));
        }
        other => panic!("unexpected error: {other}"),
    }

    inv.tax.as_mut().unwrap().ext.clear();
    let fields: Vec<String> = validate_invoice(&inv, registry())
        .into_iter()
        .map(|e| e.field)
        .collect();
    assert_eq!(fields, vec!["series", "tax.ext"]);
}

#[test]
fn scenario_codes_follow_type_changes() {
    let mut inv = InvoiceBuilder::new("103", date(2024, 3, 1))
        .series("A")
        .supplier(greek_supplier())
        .add_line(services(dec!(1), dec!(100.00)))
        .tag(gr::TAG_GOODS)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.tax.as_ref().unwrap().ext[gr::EXT_KEY_MYDATA_INVOICE_TYPE], "1.1");

    inv.type_ = InvoiceType::Proforma;
    inv.calculate(registry()).unwrap();
    let tax = inv.tax.as_ref().unwrap();
    assert!(!tax.ext.contains_key(gr::EXT_KEY_MYDATA_INVOICE_TYPE));
    assert_eq!(tax.tags, vec![gr::TAG_GOODS.to_string()]);
    inv.validate(registry()).unwrap();
}

#[test]
fn greek_islands_use_zone_rates() {
    let supplier = PartyBuilder::new("Provide One A.E.")
        .tax_country("GR")
        .zone(gr::ZONE_ISLANDS)
        .build();
    let mut inv = InvoiceBuilder::new("102", date(2024, 3, 1))
        .series("A")
        .supplier(supplier)
        .add_line(services(dec!(1), dec!(100.00)))
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.totals.unwrap().tax, dec!(17.00));
}

// --- Tax identity and regime resolution ---

#[test]
fn missing_supplier() {
    let mut inv = Invoice {
        code: "1".into(),
        issue_date: Some(date(2024, 1, 15)),
        lines: vec![services(dec!(1), dec!(10))],
        ..Default::default()
    };
    assert!(matches!(
        inv.calculate(registry()),
        Err(BillingError::MissingSupplier)
    ));
}

#[test]
fn unknown_regime() {
    let mut inv = InvoiceBuilder::new("1", date(2024, 1, 15))
        .supplier(PartyBuilder::new("Nowhere Ltd").tax_country("ZZ").build())
        .add_line(services(dec!(1), dec!(10)))
        .build()
        .unwrap();
    let err = inv.calculate(registry()).unwrap_err();
    assert!(matches!(
        err,
        BillingError::UnknownRegime { ref country, zone: None } if country == "ZZ"
    ));
}

#[test]
fn supplier_without_tax_identity() {
    let mut inv = InvoiceBuilder::new("1", date(2024, 1, 15))
        .supplier(PartyBuilder::new("Anonymous").build())
        .add_line(services(dec!(1), dec!(10)))
        .build()
        .unwrap();
    assert!(matches!(
        inv.calculate(registry()),
        Err(BillingError::UnresolvableTaxIdentity(_))
    ));
}

#[test]
fn missing_date() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.issue_date = None;
    assert!(matches!(
        inv.calculate(registry()),
        Err(BillingError::MissingDate)
    ));
}

#[test]
fn unknown_category_keeps_previous_totals() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.calculate(registry()).unwrap();
    let before = inv.totals.clone();

    inv.lines.push(
        LineBuilder::new("Imported goods", dec!(1), dec!(50.00))
            .rate("GST", RATE_STANDARD)
            .build(),
    );
    let err = inv.calculate(registry()).unwrap_err();
    assert!(matches!(
        err,
        BillingError::TaxCalculation(TaxError::UnknownCategory(ref code)) if code == "GST"
    ));
    assert_eq!(inv.totals, before);
}

#[test]
fn overflowing_amounts_are_an_error() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.calculate(registry()).unwrap();
    let before = inv.totals.clone();

    inv.lines.push(services(dec!(10), rust_decimal::Decimal::MAX));
    let err = inv.calculate(registry()).unwrap_err();
    assert!(matches!(err, BillingError::AmountOverflow(_)), "{err}");
    assert_eq!(inv.totals, before);

    inv.lines.pop();
    inv.lines.push(services(dec!(1), rust_decimal::Decimal::MAX));
    assert!(matches!(
        inv.calculate(registry()),
        Err(BillingError::AmountOverflow(ref field)) if field == "totals.sum"
    ));
}

#[test]
fn customer_rates_use_customer_regime() {
    let customer = PartyBuilder::new("Πελάτης Α.Ε.").tax_country("gr").build();
    let mut inv = InvoiceBuilder::new("2024-010", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .customer(customer)
        .add_line(services(dec!(10), dec!(100.00)))
        .tag(TAG_CUSTOMER_RATES)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    assert_eq!(inv.customer.as_ref().unwrap().tax_id.as_ref().unwrap().country, "GR");
    assert_eq!(inv.totals.unwrap().tax, dec!(240.00));
}

#[test]
fn customer_rates_need_customer_identity() {
    let mut inv = dutch_invoice().tag(TAG_CUSTOMER_RATES).build().unwrap();
    assert!(matches!(
        inv.calculate(registry()),
        Err(BillingError::UnresolvableTaxIdentity(_))
    ));
}

#[test]
fn tax_identity_is_normalized() {
    let supplier = PartyBuilder::new("Provide One B.V.")
        .tax_id("nl", "NL 0000.9999.5-B57")
        .build();
    let mut inv = dutch_invoice().supplier(supplier).build().unwrap();
    inv.calculate(registry()).unwrap();
    let id = inv.supplier.unwrap().tax_id.unwrap();
    assert_eq!(id.country, "NL");
    assert_eq!(id.code.as_deref(), Some("000099995B57"));
}

// --- Discounts, charges, outlays and payment ---

#[test]
fn discounts_and_charges() {
    let mut inv = dutch_invoice()
        .add_discount(Discount {
            reason: Some("Loyalty".into()),
            percent: Some(Percent::new(dec!(10))),
            taxes: vec![tarifa::tax::Combo::rate(CATEGORY_VAT, RATE_STANDARD)],
            ..Default::default()
        })
        .add_charge(Charge {
            reason: Some("Delivery".into()),
            amount: dec!(20.00),
            taxes: vec![tarifa::tax::Combo::rate(CATEGORY_VAT, RATE_STANDARD)],
            ..Default::default()
        })
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    assert_eq!(inv.discounts[0].index, 1);
    assert_eq!(inv.discounts[0].amount, dec!(100.00));
    assert_eq!(inv.discounts[0].base, None);

    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.discount, Some(dec!(100.00)));
    assert_eq!(totals.charge, Some(dec!(20.00)));
    assert_eq!(totals.total, dec!(920.00));
    assert_eq!(totals.tax, dec!(193.20));
    assert_eq!(totals.total_with_tax, dec!(1113.20));
    inv.validate(registry()).unwrap();
}

#[test]
fn percent_discount_overrides_amount() {
    let mut inv = dutch_invoice()
        .add_discount(Discount {
            base: Some(dec!(200.00)),
            percent: Some(Percent::new(dec!(50))),
            amount: dec!(999.00),
            ..Default::default()
        })
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.discounts[0].amount, dec!(100.00));
    assert_eq!(inv.totals.unwrap().total, dec!(900.00));
}

#[test]
fn line_discount_reduces_line_total() {
    let line = LineBuilder::new("Licence", dec!(4), dec!(250.00))
        .rate(CATEGORY_VAT, RATE_STANDARD)
        .discount_percent(Percent::new(dec!(10)))
        .build();
    let mut inv = InvoiceBuilder::new("2024-020", date(2024, 1, 15))
        .supplier(dutch_supplier())
        .add_line(line)
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.lines[0].discount.as_ref().unwrap().amount, dec!(100.00));
    assert_eq!(inv.lines[0].total, dec!(900.00));
    assert_eq!(inv.totals.unwrap().tax, dec!(189.00));
}

#[test]
fn outlays_advances_and_due() {
    let mut inv = dutch_invoice()
        .add_outlay("Court fees", dec!(50.00))
        .payment(Payment {
            advances: vec![Advance {
                description: "Deposit".into(),
                percent: Some(Percent::new(dec!(10))),
                ..Default::default()
            }],
            terms: Some(Terms {
                due_dates: vec![
                    DueDate {
                        date: date(2024, 2, 15),
                        notes: None,
                        amount: dec!(0),
                        percent: Some(Percent::new(dec!(50))),
                    },
                    DueDate {
                        date: date(2024, 3, 15),
                        notes: None,
                        amount: dec!(0),
                        percent: Some(Percent::new(dec!(50))),
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        })
        .build()
        .unwrap();
    inv.calculate(registry()).unwrap();

    assert_eq!(inv.outlays[0].index, 1);
    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(totals.total_with_tax, dec!(1210.00));
    assert_eq!(totals.outlays, Some(dec!(50.00)));
    assert_eq!(totals.payable, dec!(1260.00));
    assert_eq!(totals.advances, Some(dec!(121.00)));
    assert_eq!(totals.due, Some(dec!(1139.00)));

    let payment = inv.payment.as_ref().unwrap();
    assert_eq!(payment.advances[0].amount, dec!(121.00));
    let dues = &payment.terms.as_ref().unwrap().due_dates;
    assert_eq!(dues[0].amount, dec!(630.00));
    inv.validate(registry()).unwrap();
}

// --- Validation ---

#[test]
fn validation_requires_totals() {
    let inv = dutch_invoice().build().unwrap();
    match inv.validate(registry()).unwrap_err() {
        BillingError::Validation(errors) => assert!(errors.has_field("totals")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn validation_reports_tampered_totals() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.calculate(registry()).unwrap();
    inv.totals.as_mut().unwrap().payable = dec!(1.00);
    inv.lines[0].sum = dec!(5.00);

    let errors = validate_invoice(&inv, registry());
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"totals.payable"));
    assert!(fields.contains(&"lines[0].sum"));
}

#[test]
fn validation_checks_dutch_tax_code() {
    let supplier = PartyBuilder::new("Provide One B.V.")
        .tax_id("NL", "123456789B01")
        .build();
    let mut inv = dutch_invoice().supplier(supplier).build().unwrap();
    inv.calculate(registry()).unwrap();

    let errors = validate_invoice(&inv, registry());
    let err = errors
        .iter()
        .find(|e| e.field == "supplier.tax_id.code")
        .unwrap();
    assert_eq!(err.rule.as_deref(), Some("NL"));
}

// --- Corrections ---

#[test]
fn credit_note_refers_to_original() {
    let mut inv = dutch_invoice().series("F").build().unwrap();
    inv.calculate(registry()).unwrap();

    let opts = CorrectionOptions {
        credit: true,
        date: Some(date(2024, 2, 1)),
        reason: Some("Returned goods".into()),
        ..Default::default()
    };
    inv.correct(&opts).unwrap();

    assert_eq!(inv.type_, InvoiceType::CreditNote);
    assert!(inv.totals.is_none());
    assert!(inv.code.is_empty());
    assert_eq!(inv.issue_date, Some(date(2024, 2, 1)));

    let preceding = &inv.preceding[0];
    assert_eq!(preceding.code, "2024-001");
    assert_eq!(preceding.series.as_deref(), Some("F"));
    assert_eq!(preceding.type_, InvoiceType::Standard);
    assert_eq!(preceding.issue_date, Some(date(2024, 1, 15)));
    assert_eq!(preceding.reason.as_deref(), Some("Returned goods"));

    inv.code = "C-001".into();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.totals.unwrap().payable, dec!(1210.00));
}

#[test]
fn correction_without_date_recalculates() {
    let mut inv = dutch_invoice().build().unwrap();
    inv.calculate(registry()).unwrap();

    let opts = CorrectionOptions {
        credit: true,
        ..Default::default()
    };
    inv.correct(&opts).unwrap();
    assert_eq!(inv.issue_date, Some(date(2024, 1, 15)));

    inv.code = "C-002".into();
    inv.calculate(registry()).unwrap();
    assert_eq!(inv.totals.unwrap().payable, dec!(1210.00));
}

#[test]
fn correction_needs_one_direction() {
    let mut inv = dutch_invoice().build().unwrap();
    let both = CorrectionOptions {
        credit: true,
        debit: true,
        ..Default::default()
    };
    assert!(matches!(inv.correct(&both), Err(BillingError::Correction(_))));
    assert!(matches!(
        inv.correct(&CorrectionOptions::default()),
        Err(BillingError::Correction(_))
    ));
    assert!(inv.preceding.is_empty());
}

// --- Concurrency ---

#[test]
fn shared_registry_across_threads() {
    let registry = Registry::with_defaults();
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let registry = &registry;
                s.spawn(move || {
                    let mut inv = InvoiceBuilder::new(format!("T-{n}"), date(2024, 1, 15))
                        .supplier(dutch_supplier())
                        .add_line(services(rust_decimal::Decimal::from(n), dec!(100.00)))
                        .build()
                        .unwrap();
                    inv.calculate(registry).unwrap();
                    inv.totals.unwrap().payable
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (i, payable) in results.into_iter().enumerate() {
        let n = rust_decimal::Decimal::from(i as i64 + 1);
        assert_eq!(payable, n * dec!(121.00));
    }
}
