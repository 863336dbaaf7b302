//! The `explain` use case: look up error code documentation.

use polquery_domain::QueryError;
use polquery_types::explain::{self, Explanation};
use polquery_types::ids;

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown code; includes the available ones.
    NotFound {
        identifier: String,
        available_codes: &'static [&'static str],
    },
}

pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push('\n');

    out
}

/// Stable code for a failed run: the engine's code when a [`QueryError`] caused it, otherwise
/// `runtime_error`.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<QueryError>())
        .map_or(ids::CODE_RUNTIME_ERROR, QueryError::code)
}

pub fn format_not_found(identifier: &str, codes: &[&'static str]) -> String {
    let mut out = format!("Unknown code: {identifier}\n\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }
    out
}
