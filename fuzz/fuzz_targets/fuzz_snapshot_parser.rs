//! Fuzz target for policy snapshot loading.
//!
//! Any input may be rejected, but loading must never panic, including on snapshots that parse
//! as JSON but describe an inconsistent policy (dangling members, malformed expressions).
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_snapshot_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = polquery_snapshot::fuzz::parse_snapshot(text);
    }
});
