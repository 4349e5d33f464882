#![no_main]

use alw_gen::extract::{extract_symbols, ApiFamily, SymbolSet};
use alw_gen::naming::BindingTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let mut symbols = SymbolSet::new();
    for family in ApiFamily::ALL {
        if let Ok(pattern) = family.matcher() {
            symbols.extend(extract_symbols(input, &pattern));
        }
    }

    // Arbitrary identifiers may collide; that must be an error, never a panic
    let _ = BindingTable::from_symbols(&symbols);
});
