//! Stable DTOs and IDs used across the polquery workspace.
//!
//! This crate is intentionally boring:
//! - symbol kinds, the type/attribute kind mask, and policy forms
//! - data types for the emitted query report
//! - stable string codes for query errors
//! - explain registry for those codes

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod kind;
pub mod report;

pub use explain::{Explanation, lookup_explanation};
pub use kind::{Capability, PolicyForm, SymbolKind, SymbolKindMask};
pub use report::{
    CapabilityEntry, MatchedSymbol, PolicyMeta, QueryReport, QueryResultEntry, QueryTarget,
    SCHEMA_QUERY_REPORT_V1, ToolMeta,
};
