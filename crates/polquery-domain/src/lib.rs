//! Pure symbol query engine (no IO).
//!
//! Input: a [`SymbolStore`] constructed elsewhere and a search [`Criterion`].
//! Output: sorted, duplicate-free candidate sets of policy symbols.

#![forbid(unsafe_code)]

pub mod candidates;
pub mod capability;
pub mod compare;
pub mod criterion;
pub mod error;
pub mod model;
pub mod obj_perm;
pub mod search;
pub mod store;
pub mod type_set;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use candidates::{CandidateSet, CandidateSetBuilder};
pub use capability::{capabilities, has_capability};
pub use compare::{
    ComponentMatcher, ContextMatcher, MlsRange, RangeMatch, SecurityContext, compare_any,
    compare_cond_expr_booleans, compare_context, compare_symbol_with_aliases,
};
pub use criterion::{Comparison, Criterion, MatchMode, QueryFlags};
pub use error::{ErrorKind, QueryError, QueryResult, StoreError, StoreResult};
pub use model::{CondExprDecl, PolicyModel, PolicyModelBuilder};
pub use obj_perm::{ObjPerm, sort_by_policy_order, sort_by_policy_order_with};
pub use search::{
    candidate_classes, candidate_roles, candidate_syntactic_types, candidate_types, expand_type,
    find_symbols,
};
pub use store::{CondExprNode, CondExprOp, CondId, StoreIter, Symbol, SymbolStore};
pub use type_set::{TypeSet, TypeSetSource, type_set_intersects_any};
