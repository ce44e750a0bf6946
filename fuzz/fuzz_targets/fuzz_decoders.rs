//! Fuzz target for the built-in decoders.
//!
//! Every built-in decoder must either produce text or return a decode error
//! for arbitrary bytes; none may panic. `string`, `hex` and `base64` accept
//! every input.
//!
//! Run with: `cargo +nightly fuzz run fuzz_decoders`

#![no_main]

use badm::types::TypeRegistry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let registry = TypeRegistry::with_builtins();

    for name in ["string", "hex", "base64"] {
        let decoder = registry.resolve(name).expect("built-in type");
        decoder(data).expect("total decoder");
    }

    let uint64 = registry.resolve("uint64").expect("built-in type");
    assert_eq!(uint64(data).is_ok(), data.len() == 8);
});
