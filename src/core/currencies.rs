//! ISO 4217 currency codes and their minor units.
//!
//! The minor unit count determines the precision of a currency's zero
//! amount, which every total is calculated against.

use rust_decimal::Decimal;

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    lookup(code).is_some()
}

/// Number of minor units (decimal places) used by the currency.
pub fn currency_units(code: &str) -> Option<u32> {
    lookup(code).map(|(_, units)| *units)
}

/// A zero amount carrying the currency's precision, e.g. `0.00` for EUR
/// and `0` for JPY. Unknown currencies default to two decimal places.
pub fn base_amount(code: &str) -> Decimal {
    Decimal::new(0, currency_units(code).unwrap_or(2))
}

fn lookup(code: &str) -> Option<&'static (&'static str, u32)> {
    CURRENCY_UNITS
        .binary_search_by(|(c, _)| c.cmp(&code))
        .ok()
        .map(|i| &CURRENCY_UNITS[i])
}

/// Common ISO 4217 currencies with their minor units.
/// Sorted for binary search.
static CURRENCY_UNITS: &[(&str, u32)] = &[
    ("AED", 2), // UAE Dirham
    ("AUD", 2), // Australian Dollar
    ("BGN", 2), // Bulgarian Lev
    ("BHD", 3), // Bahraini Dinar
    ("BRL", 2), // Brazilian Real
    ("CAD", 2), // Canadian Dollar
    ("CHF", 2), // Swiss Franc
    ("CLP", 0), // Chilean Peso
    ("CNY", 2), // Chinese Yuan
    ("COP", 2), // Colombian Peso
    ("CZK", 2), // Czech Koruna
    ("DKK", 2), // Danish Krone
    ("EUR", 2), // Euro
    ("GBP", 2), // Pound Sterling
    ("HKD", 2), // Hong Kong Dollar
    ("HUF", 2), // Hungarian Forint
    ("ISK", 0), // Icelandic Krona
    ("JOD", 3), // Jordanian Dinar
    ("JPY", 0), // Japanese Yen
    ("KRW", 0), // South Korean Won
    ("KWD", 3), // Kuwaiti Dinar
    ("MXN", 2), // Mexican Peso
    ("NOK", 2), // Norwegian Krone
    ("NZD", 2), // New Zealand Dollar
    ("OMR", 3), // Omani Rial
    ("PLN", 2), // Polish Zloty
    ("RON", 2), // Romanian Leu
    ("SAR", 2), // Saudi Riyal
    ("SEK", 2), // Swedish Krona
    ("SGD", 2), // Singapore Dollar
    ("TND", 3), // Tunisian Dinar
    ("TRY", 2), // Turkish Lira
    ("USD", 2), // US Dollar
    ("VND", 0), // Vietnamese Dong
    ("ZAR", 2), // South African Rand
];
