//! Fuzz target for criterion comparison.
//!
//! Arbitrary patterns must surface as `QueryError`s, never as panics, and a compiled regex must
//! give the same answer on every call.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_criterion_compare
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use polquery_domain::{Criterion, QueryFlags};

#[derive(Arbitrary, Debug)]
struct CompareInput {
    pattern: Option<String>,
    regex: bool,
    targets: Vec<String>,
}

fuzz_target!(|input: CompareInput| {
    if input.targets.len() > 50 {
        return;
    }
    if input.pattern.as_ref().is_some_and(|p| p.len() > 256) {
        return;
    }

    let flags = if input.regex {
        QueryFlags::REGEX
    } else {
        QueryFlags::NONE
    };
    let criterion = Criterion::from_flags(input.pattern.as_deref(), flags).with_size_limit(1 << 16);

    for target in input.targets.iter().filter(|t| t.len() <= 512) {
        let first = criterion.compare(target);
        let second = criterion.compare(target);
        match (first, second) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => panic!("comparison changed between calls"),
        }
    }
});
