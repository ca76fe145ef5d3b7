//! UNTDID code lists used by EN 16931.
//!
//! UNTDID 5189 defines allowance reason codes, UNTDID 7161 charge reason
//! codes and UNTDID 4461 payment means. The key tables map the keys used
//! on documents to those codes.

/// Check whether `code` is a known UNTDID 5189 allowance reason code.
pub fn is_known_allowance_reason(code: &str) -> bool {
    ALLOWANCE_REASON_CODES.binary_search(&code).is_ok()
}

/// Check whether `code` is a known UNTDID 7161 charge reason code.
pub fn is_known_charge_reason(code: &str) -> bool {
    CHARGE_REASON_CODES.binary_search(&code).is_ok()
}

/// Allowance reason code for a discount key.
pub fn allowance_code(key: &str) -> Option<&'static str> {
    lookup(ALLOWANCE_KEYS, key)
}

/// Charge reason code for a charge key.
pub fn charge_code(key: &str) -> Option<&'static str> {
    lookup(CHARGE_KEYS, key)
}

/// Payment means code for a means key such as `"credit-transfer+sepa"`.
pub fn payment_means_code(key: &str) -> Option<&'static str> {
    lookup(PAYMENT_MEANS_KEYS, key)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .binary_search_by_key(&key, |(k, _)| *k)
        .ok()
        .map(|i| table[i].1)
}

/// UNTDID 5189 (sorted for binary search).
static ALLOWANCE_REASON_CODES: &[&str] = &[
    "100", // Special agreement
    "102", // Fixed long term
    "103", // Temporary
    "104", // Standard
    "105", // Yearly turnover
    "41",  // Bonus for works ahead of schedule
    "42",  // Other bonus
    "60",  // Manufacturer's consumer discount
    "62",  // Due to military status
    "63",  // Due to work accident
    "64",  // Special agreement
    "65",  // Production error discount
    "66",  // New outlet discount
    "67",  // Sample discount
    "68",  // End-of-range discount
    "70",  // Incoterm discount
    "71",  // Point of sales threshold allowance
    "88",  // Material surcharge/deduction
    "95",  // Discount
];

/// UNTDID 7161 (sorted for binary search).
static CHARGE_REASON_CODES: &[&str] = &[
    "AA",  // Advertising
    "AAA", // Telecommunication
    "AAC", // Technical modification
    "AAD", // Job-order production
    "AAE", // Outlays
    "AAF", // Off-premises
    "ABK", // Miscellaneous
    "ABL", // Additional packaging
    "ADR", // Other services
    "ADT", // Pick-up
    "AEW", // Environmental protection service
    "FC",  // Freight service
    "FI",  // Financing
    "FL",  // Flat rate
    "LA",  // Labelling
    "PC",  // Packing
    "TS",  // Testing
];

static ALLOWANCE_KEYS: &[(&str, &str)] = &[
    ("bonus", "42"),
    ("early-completion", "41"),
    ("end-of-range", "68"),
    ("incoterm", "70"),
    ("military", "62"),
    ("new-outlet", "66"),
    ("pos-threshold", "71"),
    ("production-error", "65"),
    ("sample", "67"),
    ("special-agreement", "64"),
    ("special-rebate", "100"),
    ("standard", "104"),
    ("temporary", "103"),
    ("work-accident", "63"),
    ("yearly-turnover", "105"),
];

static CHARGE_KEYS: &[(&str, &str)] = &[
    ("additional-packaging", "ABL"),
    ("advertising", "AA"),
    ("environmental-protection", "AEW"),
    ("financing", "FI"),
    ("flat-rate", "FL"),
    ("freight", "FC"),
    ("job-order-production", "AAD"),
    ("labelling", "LA"),
    ("miscellaneous", "ABK"),
    ("off-premises", "AAF"),
    ("other-services", "ADR"),
    ("outlays", "AAE"),
    ("packing", "PC"),
    ("pick-up", "ADT"),
    ("technical-modification", "AAC"),
    ("telecommunication", "AAA"),
    ("testing", "TS"),
];

/// UNTDID 4461 payment means.
static PAYMENT_MEANS_KEYS: &[(&str, &str)] = &[
    ("card", "48"),
    ("cash", "10"),
    ("cheque", "20"),
    ("credit-transfer", "30"),
    ("credit-transfer+sepa", "58"),
    ("debit-transfer", "31"),
    ("direct-debit", "49"),
    ("direct-debit+sepa", "59"),
    ("online", "68"),
    ("other", "ZZZ"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_allowance_codes() {
        assert!(is_known_allowance_reason("95"));
        assert!(is_known_allowance_reason("100"));
        assert!(!is_known_allowance_reason("99"));
        assert!(!is_known_allowance_reason(""));
    }

    #[test]
    fn known_charge_codes() {
        assert!(is_known_charge_reason("FC"));
        assert!(is_known_charge_reason("ABK"));
        assert!(!is_known_charge_reason("FREIGHT"));
    }

    #[test]
    fn key_lookups() {
        assert_eq!(allowance_code("sample"), Some("67"));
        assert_eq!(charge_code("freight"), Some("FC"));
        assert_eq!(payment_means_code("credit-transfer+sepa"), Some("58"));
        assert_eq!(payment_means_code("barter"), None);
    }

    #[test]
    fn tables_are_sorted() {
        for codes in [ALLOWANCE_REASON_CODES, CHARGE_REASON_CODES] {
            for w in codes.windows(2) {
                assert!(w[0] < w[1], "codes not sorted: {} >= {}", w[0], w[1]);
            }
        }
        for table in [ALLOWANCE_KEYS, CHARGE_KEYS, PAYMENT_MEANS_KEYS] {
            for w in table.windows(2) {
                assert!(w[0].0 < w[1].0, "keys not sorted: {} >= {}", w[0].0, w[1].0);
            }
            for (_, code) in table {
                assert!(
                    table == PAYMENT_MEANS_KEYS
                        || is_known_allowance_reason(code)
                        || is_known_charge_reason(code),
                    "unknown code {code}"
                );
            }
        }
    }
}
