// Copyright (c) 2026 Veilstake
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;
use veilstake::core::types::Amount;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(a) = Amount::parse_decimal(s) {
            // Whatever parses must render back to the same value.
            assert_eq!(Amount::parse_decimal(&a.to_string()), Ok(a));
        }
    }
});
