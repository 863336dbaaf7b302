//! Read-only accessor capability set over a compiled policy.
//!
//! The engine never sees a policy database directly; everything it needs goes through
//! [`SymbolStore`]. Stores are borrowed immutably for the duration of a query, so any number of
//! queries may read the same store at once.

use crate::error::{StoreError, StoreResult};
use polquery_types::{PolicyForm, SymbolKind};
use std::fmt;

/// Lazy, fallible sequence produced by a store accessor.
pub type StoreIter<'a, T> = Box<dyn Iterator<Item = StoreResult<T>> + 'a>;

/// Handle to a policy symbol.
///
/// `value` is the policy-internal number of the symbol within its table (1-based, as in the
/// kernel policy). Handles order by `(kind, value)`; that order is the identity order used to
/// finalize candidate sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    kind: SymbolKind,
    value: u32,
}

impl Symbol {
    pub const fn new(kind: SymbolKind, value: u32) -> Self {
        Symbol { kind, value }
    }

    pub const fn kind(self) -> SymbolKind {
        self.kind
    }

    pub const fn value(self) -> u32 {
        self.value
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.value)
    }
}

/// Handle to a conditional (`if (...) { ... }`) block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CondId(u32);

impl CondId {
    pub const fn new(value: u32) -> Self {
        CondId(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Operators of a conditional expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CondExprOp {
    Not,
    Or,
    And,
    Xor,
    Eq,
    Neq,
}

impl CondExprOp {
    pub fn token(self) -> &'static str {
        match self {
            CondExprOp::Not => "!",
            CondExprOp::Or => "||",
            CondExprOp::And => "&&",
            CondExprOp::Xor => "^",
            CondExprOp::Eq => "==",
            CondExprOp::Neq => "!=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "!" => Some(CondExprOp::Not),
            "||" => Some(CondExprOp::Or),
            "&&" => Some(CondExprOp::And),
            "^" => Some(CondExprOp::Xor),
            "==" => Some(CondExprOp::Eq),
            "!=" => Some(CondExprOp::Neq),
            _ => None,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, CondExprOp::Not)
    }
}

/// One node of a conditional expression, in reverse Polish order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CondExprNode {
    /// Reference to a boolean symbol.
    Bool(Symbol),
    Op(CondExprOp),
}

pub trait SymbolStore {
    fn policy_form(&self) -> PolicyForm;

    fn policy_version(&self) -> u32;

    fn mls_enabled(&self) -> bool;

    fn rules_loaded(&self) -> bool;

    /// Resolve a name within one table. Unknown names yield `Ok(None)`.
    ///
    /// A type alias resolves to its own alias entry (see [`SymbolStore::canonical_of`]); level
    /// and category aliases resolve straight to the canonical symbol.
    fn lookup(&self, kind: SymbolKind, name: &str) -> StoreResult<Option<Symbol>>;

    /// All canonical symbols of a table, in value order.
    fn enumerate(&self, kind: SymbolKind) -> StoreIter<'_, Symbol>;

    fn name_of(&self, symbol: Symbol) -> StoreResult<&str>;

    fn aliases_of(&self, symbol: Symbol) -> StoreIter<'_, &str>;

    fn is_alias(&self, symbol: Symbol) -> StoreResult<bool>;

    fn canonical_of(&self, alias: Symbol) -> StoreResult<Symbol>;

    fn is_attribute(&self, symbol: Symbol) -> StoreResult<bool>;

    /// Member types of an attribute.
    fn members_of(&self, attribute: Symbol) -> StoreIter<'_, Symbol>;

    /// Attributes a plain type belongs to.
    fn attributes_of(&self, ty: Symbol) -> StoreIter<'_, Symbol>;

    fn numeric_value(&self, symbol: Symbol) -> StoreResult<u32>;

    fn permissions_of(&self, class: Symbol) -> StoreIter<'_, &str>;

    fn conditionals(&self) -> StoreIter<'_, CondId>;

    fn cond_expr(&self, cond: CondId) -> StoreIter<'_, CondExprNode>;

    /// The canonical symbol for `symbol`, which is itself unless it is an alias.
    fn canonicalize(&self, symbol: Symbol) -> StoreResult<Symbol> {
        if self.is_alias(symbol)? {
            self.canonical_of(symbol)
        } else {
            Ok(symbol)
        }
    }

    /// Lookup followed by [`SymbolStore::canonicalize`].
    fn lookup_canonical(&self, kind: SymbolKind, name: &str) -> StoreResult<Option<Symbol>> {
        match self.lookup(kind, name)? {
            Some(symbol) => self.canonicalize(symbol).map(Some),
            None => Ok(None),
        }
    }
}

pub(crate) fn single_error<'a, T: 'a>(err: StoreError) -> StoreIter<'a, T> {
    Box::new(std::iter::once(Err(err)))
}
