#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; errors are fine.
        if let Ok(mut obj) = tarifa::schema::Object::from_json(s) {
            let _ = obj.calculate(tarifa::tax::Registry::global());
            let _ = obj.validate(tarifa::tax::Registry::global());
            let _ = obj.to_json();
        }
    }
});
