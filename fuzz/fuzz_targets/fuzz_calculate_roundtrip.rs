#![no_main]

use libfuzzer_sys::fuzz_target;
use tarifa::core::Invoice;
use tarifa::tax::Registry;

fuzz_target!(|data: &[u8]| {
    let Ok(mut invoice) = serde_json::from_slice::<Invoice>(data) else {
        return;
    };
    if invoice.calculate(Registry::global()).is_err() {
        return;
    }
    // A calculated invoice must survive JSON and recalculate to the same totals.
    let json = serde_json::to_string(&invoice).unwrap();
    let mut parsed: Invoice = serde_json::from_str(&json).unwrap();
    parsed.calculate(Registry::global()).unwrap();
    assert_eq!(parsed.totals, invoice.totals);
});
