//! Explain registry for query error codes.
//!
//! Maps codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for an error code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the code.
    pub title: &'static str,
    /// When the engine reports it.
    pub description: &'static str,
    /// How to fix the query.
    pub remediation: &'static str,
}

/// Look up an explanation by code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        ids::CODE_INVALID_KIND_MASK => Some(Explanation {
            title: "Invalid symbol kind mask",
            description: "Type searches must be restricted to plain types, attributes, or both. \
                An empty mask, or one with bits outside those two, is rejected before the \
                policy is consulted.",
            remediation: "Pass `--symbols type`, `--symbols attribute`, or \
                `--symbols type,attribute` (or the equivalent `symbols` list in polquery.toml).",
        }),
        ids::CODE_BINARY_POLICY => Some(Explanation {
            title: "Syntactic query against a binary policy",
            description: "Syntactic type searches read attribute membership as written in the \
                policy source. Binary policies have already been expanded, so the query is \
                refused.",
            remediation: "Load a kernel source policy, or run a regular (non-syntactic) type \
                search instead.",
        }),
        ids::CODE_PATTERN_SYNTAX => Some(Explanation {
            title: "Malformed regular expression",
            description: "The search pattern could not be compiled as a regular expression.",
            remediation: "Fix the pattern, or drop `--regex` to match the name literally.",
        }),
        ids::CODE_PATTERN_TOO_LARGE => Some(Explanation {
            title: "Regular expression too large",
            description: "The compiled form of the pattern exceeds the configured size limit.",
            remediation: "Simplify the pattern (large counted repetitions are the usual cause) \
                or raise `regex_size_limit` in polquery.toml.",
        }),
        ids::CODE_ACCESSOR_FAILURE => Some(Explanation {
            title: "Policy accessor failure",
            description: "The policy store failed while the engine was walking it, for example \
                because a symbol handle referred to nothing. The underlying cause is reported \
                alongside this code.",
            remediation: "Check that the policy snapshot is complete and internally consistent.",
        }),
        ids::CODE_RUNTIME_ERROR => Some(Explanation {
            title: "Runtime error",
            description: "polquery could not complete the run (unreadable files, invalid \
                configuration, and similar).",
            remediation: "Read the error chain printed on stderr; it names the failing file or \
                query.",
        }),
        _ => None,
    }
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_INVALID_KIND_MASK,
        ids::CODE_BINARY_POLICY,
        ids::CODE_PATTERN_SYNTAX,
        ids::CODE_PATTERN_TOO_LARGE,
        ids::CODE_ACCESSOR_FAILURE,
        ids::CODE_RUNTIME_ERROR,
    ]
}
