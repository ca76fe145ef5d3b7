use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::percent::Percent;
use crate::tax::{Combo, TaxTotal};

/// Keys identify tags, rates, means of payment and other enumerated values
/// (e.g. `"reverse-charge"`, `"standard"`).
pub type Key = String;

/// Extension codes keyed by extension name, kept sorted so output is
/// stable (e.g. `"untdid-tax-category" → "S"`).
pub type Extensions = BTreeMap<String, String>;

/// Free-form key/value data carried through untouched.
pub type Meta = BTreeMap<String, String>;

/// A payment claim for goods or services supplied by the supplier to the
/// customer. The root of every calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique document ID, opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Prefix used to group codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Sequential code used to identify the invoice in tax declarations.
    #[serde(default)]
    pub code: String,
    /// Document type.
    #[serde(rename = "type", default)]
    pub type_: InvoiceType,
    /// ISO 4217 currency for all totals.
    #[serde(default)]
    pub currency: String,
    /// Exchange rates carried for reference; never applied here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exchange_rates: Vec<ExchangeRate>,
    /// Tax configuration: included prices, tags and extension codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Tax>,
    /// Previous documents this one corrects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preceding: Vec<Preceding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(rename = "op_date", default, skip_serializing_if = "Option::is_none")]
    pub operation_date: Option<NaiveDate>,
    /// When taxes become accountable; the issue date is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Party>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Discount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<Charge>,
    /// Expenses paid by the supplier and re-invoiced without tax.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outlays: Vec<Outlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Ordering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    /// Calculated totals; replaced wholesale by every `calculate()` call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// Keys of the addons whose rules apply to this document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<Key>,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

/// Document type of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceType {
    /// A regular commercial invoice.
    #[default]
    Standard,
    /// A quote or pro forma, not a tax document.
    Proforma,
    /// Replaces a previous invoice entirely.
    Corrective,
    /// Reverses all or part of a previous invoice.
    CreditNote,
    /// Adds to a previous invoice.
    DebitNote,
}

impl InvoiceType {
    /// Key used when matching scenarios.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Proforma => "proforma",
            Self::Corrective => "corrective",
            Self::CreditNote => "credit-note",
            Self::DebitNote => "debit-note",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "standard" => Some(Self::Standard),
            "proforma" => Some(Self::Proforma),
            "corrective" => Some(Self::Corrective),
            "credit-note" => Some(Self::CreditNote),
            "debit-note" => Some(Self::DebitNote),
            _ => None,
        }
    }
}

/// Tax configuration of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    /// Category code whose tax is already included in prices (e.g. "VAT").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_include: Option<Key>,
    /// Document tags; each must be recognised by the regime.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Key>,
    /// Extension codes, including those resolved from scenarios.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

impl Tax {
    pub fn contains_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t == key)
    }
}

/// Currency conversion reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Reference to a document being corrected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preceding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: InvoiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Supplier, customer or any other party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxIdentity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
}

/// Tax identity of a party: the country (and optional zone) that selects
/// the regime, plus the local tax code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxIdentity {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

/// One sold item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 1-based position, assigned by `calculate()`.
    #[serde(rename = "i", default)]
    pub index: usize,
    pub quantity: Decimal,
    pub item: Item,
    /// `item.price × quantity`, calculated.
    #[serde(default)]
    pub sum: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<LineDiscount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<Combo>,
    /// `sum - discount`, calculated.
    #[serde(default)]
    pub total: Decimal,
}

/// Goods or service being sold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// Discount applied to a single line. When `percent` is set it is
/// authoritative and `amount` is recalculated from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineDiscount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Invoice-level discount. Percent-based discounts are taken from `base`,
/// or from the invoice sum when no base is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(rename = "i", default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<Combo>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// Invoice-level charge or surcharge, the mirror image of [`Discount`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    #[serde(rename = "i", default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<Combo>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// Reimbursed expense paid by the supplier on the customer's behalf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outlay {
    #[serde(rename = "i", default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Party>,
    pub amount: Decimal,
}

/// Ordering references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

/// Delivery details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Party>,
}

/// Date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// When, how and to whom the invoice should be paid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Terms>,
    /// Amounts already paid before the invoice was issued.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advances: Vec<Advance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Instructions>,
}

/// Payment terms with optional instalments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub due_dates: Vec<DueDate>,
}

/// One instalment. With a percent, the amount is taken from the payable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDate {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
}

/// A payment made in advance. With a percent, the amount is taken from
/// the invoice total with tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// How the payment should be made. `key` names the preferred means
/// (e.g. "credit-transfer", "card", "direct-debit+sepa").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    pub key: Key,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Remittance information linking the payment with the invoice.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credit_transfer: Vec<CreditTransfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_debit: Option<DirectDebit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub online: Vec<Online>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// Bank account for credit transfers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditTransfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    /// Account number when no IBAN is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Card reference data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub last4: String,
    pub holder: String,
}

/// Direct debit mandate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectDebit {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Online payment option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Online {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "addr")]
    pub address: String,
}

/// Unstructured note. `src` identifies where a generated note came from
/// and is what de-duplication compares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<Key>,
    pub text: String,
}

/// Note key for legal notices.
pub const NOTE_KEY_LEGAL: &str = "legal";

impl Note {
    /// A legal notice originating from `src`.
    pub fn legal(src: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: Some(NOTE_KEY_LEGAL.to_string()),
            code: None,
            src: Some(src.into()),
            text: text.into(),
        }
    }
}

/// Calculated totals. Entirely derived from the document and replaced
/// atomically by each calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of all line totals.
    pub sum: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<Decimal>,
    /// Tax already contained in prices, removed from `total`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_included: Option<Decimal>,
    /// Total before tax.
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<TaxTotal>,
    /// Total tax payable.
    pub tax: Decimal,
    pub total_with_tax: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlays: Option<Decimal>,
    pub payable: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advances: Option<Decimal>,
    /// Amount still to be paid after advances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Decimal>,
}
