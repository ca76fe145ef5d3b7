use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::BillingError;
use super::percent::Percent;
use super::types::*;
use crate::tax::Combo;

/// Builder for assembling invoices.
///
/// `build()` checks required parts and input limits but does not
/// calculate; call [`Invoice::calculate`] with a registry afterwards.
///
/// ```
/// use tarifa::core::*;
/// use tarifa::tax::{CATEGORY_VAT, RATE_STANDARD};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("2024-001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .supplier(PartyBuilder::new("Provide One B.V.").tax_id("NL", "000099995B57").build())
///     .customer(PartyBuilder::new("Sample Consumer").build())
///     .add_line(LineBuilder::new("Development services", dec!(10), dec!(100.00))
///         .rate(CATEGORY_VAT, RATE_STANDARD)
///         .build())
///     .build()
///     .unwrap();
/// assert!(invoice.totals.is_none());
/// ```
pub struct InvoiceBuilder {
    code: String,
    series: Option<String>,
    type_: InvoiceType,
    currency: String,
    issue_date: NaiveDate,
    operation_date: Option<NaiveDate>,
    value_date: Option<NaiveDate>,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<Line>,
    discounts: Vec<Discount>,
    charges: Vec<Charge>,
    outlays: Vec<Outlay>,
    tax: Option<Tax>,
    payment: Option<Payment>,
    notes: Vec<Note>,
    addons: Vec<String>,
}

impl InvoiceBuilder {
    pub fn new(code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            series: None,
            type_: InvoiceType::Standard,
            currency: "EUR".to_string(),
            issue_date,
            operation_date: None,
            value_date: None,
            supplier: None,
            customer: None,
            lines: Vec::new(),
            discounts: Vec::new(),
            charges: Vec::new(),
            outlays: Vec::new(),
            tax: None,
            payment: None,
            notes: Vec::new(),
            addons: Vec::new(),
        }
    }

    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn invoice_type(mut self, type_: InvoiceType) -> Self {
        self.type_ = type_;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn operation_date(mut self, date: NaiveDate) -> Self {
        self.operation_date = Some(date);
        self
    }

    /// Date on which taxes become accountable, when it differs from the
    /// issue date.
    pub fn value_date(mut self, date: NaiveDate) -> Self {
        self.value_date = Some(date);
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn add_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_discount(mut self, discount: Discount) -> Self {
        self.discounts.push(discount);
        self
    }

    pub fn add_charge(mut self, charge: Charge) -> Self {
        self.charges.push(charge);
        self
    }

    pub fn add_outlay(mut self, description: impl Into<String>, amount: Decimal) -> Self {
        self.outlays.push(Outlay {
            description: description.into(),
            amount,
            ..Default::default()
        });
        self
    }

    pub fn tag(mut self, key: impl Into<String>) -> Self {
        self.tax.get_or_insert_with(Tax::default).tags.push(key.into());
        self
    }

    /// Mark prices as already including the tax of `category`.
    pub fn prices_include(mut self, category: impl Into<String>) -> Self {
        self.tax.get_or_insert_with(Tax::default).prices_include = Some(category.into());
        self
    }

    pub fn addon(mut self, key: impl Into<String>) -> Self {
        self.addons.push(key.into());
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.notes.push(Note {
            text: text.into(),
            ..Default::default()
        });
        self
    }

    pub fn payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn build(self) -> Result<Invoice, BillingError> {
        let supplier = self
            .supplier
            .ok_or_else(|| BillingError::Builder("supplier is required".into()))?;

        if self.lines.is_empty() {
            return Err(BillingError::Builder(
                "at least one line is required".into(),
            ));
        }

        Ok(Invoice {
            series: self.series,
            code: self.code,
            type_: self.type_,
            currency: self.currency,
            tax: self.tax,
            issue_date: Some(self.issue_date),
            operation_date: self.operation_date,
            value_date: self.value_date,
            supplier: Some(supplier),
            customer: self.customer,
            lines: self.lines,
            discounts: self.discounts,
            charges: self.charges,
            outlays: self.outlays,
            payment: self.payment,
            notes: self.notes,
            addons: self.addons,
            ..Default::default()
        })
    }
}

/// Builder for Party (supplier/customer).
pub struct PartyBuilder {
    name: String,
    tax_id: Option<TaxIdentity>,
    addresses: Vec<Address>,
    emails: Vec<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
            addresses: Vec::new(),
            emails: Vec::new(),
        }
    }

    pub fn tax_id(mut self, country: impl Into<String>, code: impl Into<String>) -> Self {
        self.tax_id = Some(TaxIdentity {
            country: country.into(),
            zone: None,
            code: Some(code.into()),
        });
        self
    }

    /// Tax identity with a country only, for parties without a known code.
    pub fn tax_country(mut self, country: impl Into<String>) -> Self {
        self.tax_id = Some(TaxIdentity {
            country: country.into(),
            zone: None,
            code: None,
        });
        self
    }

    /// Sub-national zone of the tax identity. Ignored without a tax identity.
    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        if let Some(id) = &mut self.tax_id {
            id.zone = Some(zone.into());
        }
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            tax_id: self.tax_id,
            addresses: self.addresses,
            emails: self.emails,
        }
    }
}

/// Builder for Line.
pub struct LineBuilder {
    name: String,
    quantity: Decimal,
    price: Decimal,
    unit: Option<String>,
    reference: Option<String>,
    discount: Option<LineDiscount>,
    taxes: Vec<Combo>,
}

impl LineBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            unit: None,
            reference: None,
            discount: None,
            taxes: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Tax resolved from the regime's rate table.
    pub fn rate(mut self, category: impl Into<String>, rate: impl Into<String>) -> Self {
        self.taxes.push(Combo::rate(category, rate));
        self
    }

    /// Tax with an explicit percentage.
    pub fn percent(mut self, category: impl Into<String>, percent: Percent) -> Self {
        self.taxes.push(Combo::percent(category, percent));
        self
    }

    pub fn discount_percent(mut self, percent: Percent) -> Self {
        self.discount = Some(LineDiscount {
            percent: Some(percent),
            ..Default::default()
        });
        self
    }

    pub fn discount_amount(mut self, amount: Decimal) -> Self {
        self.discount = Some(LineDiscount {
            amount,
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Line {
        Line {
            index: 0,
            quantity: self.quantity,
            item: Item {
                name: self.name,
                price: self.price,
                unit: self.unit,
                reference: self.reference,
                ext: Default::default(),
            },
            sum: Decimal::ZERO,
            discount: self.discount,
            taxes: self.taxes,
            total: Decimal::ZERO,
        }
    }
}
