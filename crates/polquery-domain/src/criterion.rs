//! Search criteria and the string comparator.

use crate::error::{QueryError, QueryResult};
use regex::{Regex, RegexBuilder};
use std::cell::OnceCell;
use std::ops::BitOr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Unanchored regular expression search.
    Regex,
}

/// Outcome of a successful comparison.
///
/// Failures are the `Err` side of [`QueryResult`], so a `NoMatch` can never be confused with an
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    NoMatch,
    Match,
}

impl Comparison {
    pub fn is_match(self) -> bool {
        matches!(self, Comparison::Match)
    }
}

impl From<bool> for Comparison {
    fn from(matched: bool) -> Self {
        if matched {
            Comparison::Match
        } else {
            Comparison::NoMatch
        }
    }
}

/// Option bits shared by the fields of one query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryFlags(u32);

impl QueryFlags {
    pub const NONE: QueryFlags = QueryFlags(0);
    pub const REGEX: QueryFlags = QueryFlags(0x1);
    /// Expand attributes to members and types to their attributes.
    pub const INDIRECT: QueryFlags = QueryFlags(0x2);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: QueryFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, flag: QueryFlags, on: bool) {
        if on {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

impl BitOr for QueryFlags {
    type Output = QueryFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        QueryFlags(self.0 | rhs.0)
    }
}

/// A pattern plus how to match it.
///
/// An absent or empty pattern is a wildcard. In regex mode the pattern is compiled on first use
/// and the compiled form is kept until the pattern or the mode changes. The cache makes a
/// criterion `!Sync`; give each thread its own.
#[derive(Clone, Debug, Default)]
pub struct Criterion {
    pattern: Option<String>,
    mode: MatchMode,
    size_limit: Option<usize>,
    compiled: OnceCell<Regex>,
}

impl Criterion {
    pub fn new(pattern: Option<&str>, mode: MatchMode) -> Self {
        Criterion {
            pattern: normalize(pattern),
            mode,
            size_limit: None,
            compiled: OnceCell::new(),
        }
    }

    pub fn exact(pattern: &str) -> Self {
        Self::new(Some(pattern), MatchMode::Exact)
    }

    pub fn regex(pattern: &str) -> Self {
        Self::new(Some(pattern), MatchMode::Regex)
    }

    /// Wildcard criterion.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn from_flags(pattern: Option<&str>, flags: QueryFlags) -> Self {
        let mode = if flags.contains(QueryFlags::REGEX) {
            MatchMode::Regex
        } else {
            MatchMode::Exact
        };
        Self::new(pattern, mode)
    }

    /// Caps the compiled program size; exceeding it is reported as
    /// [`QueryError::PatternTooLarge`].
    pub fn with_size_limit(mut self, bytes: usize) -> Self {
        self.size_limit = Some(bytes);
        self.compiled = OnceCell::new();
        self
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_regex(&self) -> bool {
        self.mode == MatchMode::Regex
    }

    pub fn is_wildcard(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn set_pattern(&mut self, pattern: Option<&str>) {
        self.pattern = normalize(pattern);
        self.compiled = OnceCell::new();
    }

    pub fn set_regex(&mut self, regex: bool) {
        let mode = if regex {
            MatchMode::Regex
        } else {
            MatchMode::Exact
        };
        if mode != self.mode {
            self.mode = mode;
            self.compiled = OnceCell::new();
        }
    }

    /// Whether a compiled regex is currently cached.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Compiles the pattern now instead of on first comparison. A no-op for exact and wildcard
    /// criteria.
    pub fn compile(&self) -> QueryResult<()> {
        match (&self.pattern, self.mode) {
            (Some(pattern), MatchMode::Regex) => self.compiled_regex(pattern).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn compare(&self, target: &str) -> QueryResult<Comparison> {
        let Some(pattern) = self.pattern.as_deref() else {
            return Ok(Comparison::Match);
        };
        match self.mode {
            MatchMode::Exact => Ok(Comparison::from(target.as_bytes() == pattern.as_bytes())),
            MatchMode::Regex => Ok(Comparison::from(
                self.compiled_regex(pattern)?.is_match(target),
            )),
        }
    }

    fn compiled_regex(&self, pattern: &str) -> QueryResult<&Regex> {
        if let Some(re) = self.compiled.get() {
            return Ok(re);
        }
        let re = compile_pattern(pattern, self.size_limit)?;
        Ok(self.compiled.get_or_init(move || re))
    }
}

fn normalize(pattern: Option<&str>) -> Option<String> {
    pattern.filter(|p| !p.is_empty()).map(str::to_string)
}

fn compile_pattern(pattern: &str, size_limit: Option<usize>) -> QueryResult<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    if let Some(limit) = size_limit {
        builder.size_limit(limit);
    }
    builder.build().map_err(|err| match err {
        regex::Error::CompiledTooBig(limit) => QueryError::PatternTooLarge {
            pattern: pattern.to_string(),
            limit,
        },
        other => QueryError::PatternSyntax {
            pattern: pattern.to_string(),
            message: other.to_string(),
        },
    })
}
