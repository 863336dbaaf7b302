use polquery_types::{PolicyForm, SymbolKind, ids};
use thiserror::Error;

/// Failure reported by a [`SymbolStore`](crate::store::SymbolStore) accessor.
///
/// A name that simply does not exist is *not* an error for lookups (they return `Ok(None)`);
/// `NotFound` is reserved for references that must resolve, such as attribute members while a
/// model is being built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} `{name}` not found")]
    NotFound { kind: SymbolKind, name: String },

    #[error("no {kind} with value {value}")]
    InvalidSymbol { kind: SymbolKind, value: u32 },

    #[error("no conditional with value {0}")]
    InvalidConditional(u32),

    #[error("{kind} `{name}` is declared more than once")]
    Duplicate { kind: SymbolKind, name: String },

    #[error("`{name}` cannot be an attribute member: {reason}")]
    InvalidMember { name: String, reason: &'static str },

    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse classification of [`QueryError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query itself is unusable (bad kind mask, wrong policy form).
    Configuration,
    PatternSyntax,
    Allocation,
    /// The policy store failed underneath the engine.
    Accessor,
}

/// Error returned by every engine operation.
///
/// Any error aborts the operation in progress; no partially built result is ever returned.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid symbol kind mask {0:#x} (expected a non-empty subset of type|attribute)")]
    InvalidKindMask(u32),

    #[error("syntactic type queries require a source policy, but the loaded policy is {0}")]
    BinaryPolicy(PolicyForm),

    #[error("invalid regular expression `{pattern}`: {message}")]
    PatternSyntax { pattern: String, message: String },

    #[error("regular expression `{pattern}` exceeds the compiled size limit of {limit} bytes")]
    PatternTooLarge { pattern: String, limit: usize },

    #[error("policy accessor failed")]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidKindMask(_) | QueryError::BinaryPolicy(_) => {
                ErrorKind::Configuration
            }
            QueryError::PatternSyntax { .. } => ErrorKind::PatternSyntax,
            QueryError::PatternTooLarge { .. } => ErrorKind::Allocation,
            QueryError::Store(_) => ErrorKind::Accessor,
        }
    }

    /// Stable code, see [`polquery_types::ids`].
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidKindMask(_) => ids::CODE_INVALID_KIND_MASK,
            QueryError::BinaryPolicy(_) => ids::CODE_BINARY_POLICY,
            QueryError::PatternSyntax { .. } => ids::CODE_PATTERN_SYNTAX,
            QueryError::PatternTooLarge { .. } => ids::CODE_PATTERN_TOO_LARGE,
            QueryError::Store(_) => ids::CODE_ACCESSOR_FAILURE,
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
