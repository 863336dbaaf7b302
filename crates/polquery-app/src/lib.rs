//! Use case orchestration for polquery.
//!
//! This crate provides the application layer: use cases that coordinate the settings, snapshot,
//! and domain layers. It stays thin and delegates the matching itself to `polquery-domain`.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod query;
mod render;
mod run;

#[cfg(test)]
mod test_support;

pub use explain::{
    ExplainOutput, error_code, format_explanation, format_not_found, run_explain,
};
pub use query::{fingerprint_for_query, render_cond_expr, run_query};
pub use render::{render_text, serialize_report, write_report};
pub use run::{RunInput, RunOutput, policy_meta, run_all, run_config};
