//! Comparators layered over [`Criterion::compare`].

use crate::criterion::{Comparison, Criterion};
use crate::error::{QueryResult, StoreResult};
use crate::store::{CondExprNode, Symbol, SymbolStore};

/// Compares each name of a lazy sequence until one matches.
///
/// Short-circuits on the first match or error; names after that point are never pulled from the
/// iterator. Items may be owned (`String`) or borrowed (`&str`); an owned name is dropped as soon
/// as it has been compared. An empty sequence matches only a wildcard criterion.
pub fn compare_any<I, S>(names: I, criterion: &Criterion) -> QueryResult<Comparison>
where
    I: IntoIterator<Item = StoreResult<S>>,
    S: AsRef<str>,
{
    if criterion.is_wildcard() {
        return Ok(Comparison::Match);
    }
    for name in names {
        let name = name?;
        if criterion.compare(name.as_ref())?.is_match() {
            return Ok(Comparison::Match);
        }
    }
    Ok(Comparison::NoMatch)
}

/// Compares the canonical name of `symbol`, then its aliases.
pub fn compare_symbol_with_aliases<S>(
    store: &S,
    symbol: Symbol,
    criterion: &Criterion,
) -> QueryResult<Comparison>
where
    S: SymbolStore + ?Sized,
{
    if criterion.compare(store.name_of(symbol)?)?.is_match() {
        return Ok(Comparison::Match);
    }
    compare_any(store.aliases_of(symbol), criterion)
}

/// Matches when any boolean referenced by the expression matches. Operator nodes are skipped.
pub fn compare_cond_expr_booleans<S, I>(
    store: &S,
    expr: I,
    criterion: &Criterion,
) -> QueryResult<Comparison>
where
    S: SymbolStore + ?Sized,
    I: IntoIterator<Item = StoreResult<CondExprNode>>,
{
    for node in expr {
        let CondExprNode::Bool(boolean) = node? else {
            continue;
        };
        if criterion.compare(store.name_of(boolean)?)?.is_match() {
            return Ok(Comparison::Match);
        }
    }
    Ok(Comparison::NoMatch)
}

/// An MLS range `low - high`. A single level has `low == high`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MlsRange {
    pub low: String,
    pub high: String,
}

impl MlsRange {
    pub fn single(level: &str) -> Self {
        MlsRange {
            low: level.to_string(),
            high: level.to_string(),
        }
    }
}

/// `user:role:type[:range]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityContext {
    pub user: String,
    pub role: String,
    pub type_: String,
    pub range: Option<MlsRange>,
}

impl SecurityContext {
    pub fn new(user: &str, role: &str, type_: &str) -> Self {
        SecurityContext {
            user: user.to_string(),
            role: role.to_string(),
            type_: type_.to_string(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: MlsRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// How the MLS range of a search context is compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeMatch {
    #[default]
    Exact,
    /// Range components are not compared.
    Ignore,
}

/// Full context comparison, supplied by the caller.
pub trait ContextMatcher {
    fn compare(
        &self,
        target: &SecurityContext,
        search: &SecurityContext,
        range: RangeMatch,
    ) -> QueryResult<Comparison>;
}

/// Compares each component literally; an empty search component, or an absent search range,
/// matches anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComponentMatcher;

impl ContextMatcher for ComponentMatcher {
    fn compare(
        &self,
        target: &SecurityContext,
        search: &SecurityContext,
        range: RangeMatch,
    ) -> QueryResult<Comparison> {
        let fields = [
            (&target.user, &search.user),
            (&target.role, &search.role),
            (&target.type_, &search.type_),
        ];
        for (have, want) in fields {
            if !Criterion::exact(want).compare(have)?.is_match() {
                return Ok(Comparison::NoMatch);
            }
        }
        let range_ok = match (range, &search.range) {
            (RangeMatch::Ignore, _) | (_, None) => true,
            (RangeMatch::Exact, Some(want)) => target.range.as_ref() == Some(want),
        };
        Ok(Comparison::from(range_ok))
    }
}

/// An absent search context is a wildcard; otherwise `matcher` decides.
pub fn compare_context<M>(
    matcher: &M,
    target: &SecurityContext,
    search: Option<&SecurityContext>,
    range: RangeMatch,
) -> QueryResult<Comparison>
where
    M: ContextMatcher + ?Sized,
{
    match search {
        None => Ok(Comparison::Match),
        Some(search) => matcher.compare(target, search, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QueryError, StoreError};
    use crate::store::{CondExprOp, CondId};
    use crate::test_support::{sym, targeted_policy};
    use polquery_types::SymbolKind;
    use std::cell::Cell;

    #[test]
    fn compare_any_short_circuits_on_first_match() {
        let pulled = Cell::new(0);
        let names = ["a", "b", "c", "d"].into_iter().map(|n| {
            pulled.set(pulled.get() + 1);
            Ok::<_, StoreError>(n)
        });
        let result = compare_any(names, &Criterion::exact("b")).unwrap();
        assert_eq!(result, Comparison::Match);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn compare_any_accepts_owned_names() {
        let names = vec![Ok::<_, StoreError>("x".to_string()), Ok("y".to_string())];
        assert!(compare_any(names, &Criterion::regex("^y$")).unwrap().is_match());
    }

    /// Owned name that records when it is released.
    struct Tracked<'a> {
        name: &'static str,
        drops: &'a Cell<usize>,
    }

    impl AsRef<str> for Tracked<'_> {
        fn as_ref(&self) -> &str {
            self.name
        }
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn compare_any_releases_examined_owned_names() {
        let pulled = Cell::new(0);
        let drops = Cell::new(0);
        let names = ["x", "y", "z"].into_iter().map(|name| {
            pulled.set(pulled.get() + 1);
            Ok::<_, StoreError>(Tracked {
                name,
                drops: &drops,
            })
        });

        let result = compare_any(names, &Criterion::exact("y")).unwrap();
        assert_eq!(result, Comparison::Match);
        // `z` is never produced; both examined names have been released.
        assert_eq!(pulled.get(), 2);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn compare_any_releases_every_name_on_no_match() {
        let drops = Cell::new(0);
        let names = ["x", "y", "z"].into_iter().map(|name| {
            Ok::<_, StoreError>(Tracked {
                name,
                drops: &drops,
            })
        });
        let result = compare_any(names, &Criterion::exact("w")).unwrap();
        assert_eq!(result, Comparison::NoMatch);
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn compare_any_empty_sequence() {
        let empty = std::iter::empty::<StoreResult<&str>>();
        assert_eq!(
            compare_any(empty, &Criterion::exact("x")).unwrap(),
            Comparison::NoMatch
        );
        let empty = std::iter::empty::<StoreResult<&str>>();
        assert_eq!(
            compare_any(empty, &Criterion::any()).unwrap(),
            Comparison::Match
        );
    }

    #[test]
    fn compare_any_stops_at_error() {
        let pulled = Cell::new(0);
        let names = [
            Ok("a"),
            Err(StoreError::Backend("boom".to_string())),
            Ok("c"),
        ]
        .into_iter()
        .inspect(|_| pulled.set(pulled.get() + 1));
        let err = compare_any(names, &Criterion::exact("c")).unwrap_err();
        assert!(matches!(err, QueryError::Store(StoreError::Backend(_))));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn alias_match_qualifies_symbol() {
        let store = targeted_policy();
        let httpd = sym(&store, SymbolKind::Type, "httpd_t");
        assert!(
            compare_symbol_with_aliases(&store, httpd, &Criterion::exact("apache_t"))
                .unwrap()
                .is_match()
        );
        assert!(
            compare_symbol_with_aliases(&store, httpd, &Criterion::regex("^web"))
                .unwrap()
                .is_match()
        );
        assert!(
            !compare_symbol_with_aliases(&store, httpd, &Criterion::exact("sshd_t"))
                .unwrap()
                .is_match()
        );
        assert!(
            compare_symbol_with_aliases(&store, httpd, &Criterion::any())
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn level_aliases_are_compared() {
        let store = targeted_policy();
        let s0 = sym(&store, SymbolKind::Level, "s0");
        assert!(
            compare_symbol_with_aliases(&store, s0, &Criterion::exact("low"))
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn foreign_symbol_is_accessor_failure() {
        let store = targeted_policy();
        let bogus = Symbol::new(SymbolKind::Category, 999);
        let err = compare_symbol_with_aliases(&store, bogus, &Criterion::exact("c0")).unwrap_err();
        assert!(matches!(err, QueryError::Store(_)));
    }

    #[test]
    fn cond_expr_matches_referenced_booleans_only() {
        let store = targeted_policy();
        let expr = || store.cond_expr(CondId::new(1));
        assert!(
            compare_cond_expr_booleans(&store, expr(), &Criterion::exact("httpd_enable_cgi"))
                .unwrap()
                .is_match()
        );
        // Operator tokens are never compared.
        assert!(
            !compare_cond_expr_booleans(&store, expr(), &Criterion::exact("&&"))
                .unwrap()
                .is_match()
        );
        let ops_only = [Ok(CondExprNode::Op(CondExprOp::Not))];
        assert!(
            !compare_cond_expr_booleans(&store, ops_only, &Criterion::any())
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn absent_search_context_is_wildcard() {
        let target = SecurityContext::new("system_u", "system_r", "httpd_t");
        assert!(
            compare_context(&ComponentMatcher, &target, None, RangeMatch::Exact)
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn component_matcher_compares_fields_and_range() {
        let target = SecurityContext::new("system_u", "system_r", "httpd_t")
            .with_range(MlsRange::single("s0"));

        let partial = SecurityContext::new("", "", "httpd_t");
        assert!(
            compare_context(&ComponentMatcher, &target, Some(&partial), RangeMatch::Exact)
                .unwrap()
                .is_match()
        );

        let other_type = SecurityContext::new("system_u", "", "sshd_t");
        assert!(
            !compare_context(&ComponentMatcher, &target, Some(&other_type), RangeMatch::Exact)
                .unwrap()
                .is_match()
        );

        let ranged = SecurityContext::new("", "", "").with_range(MlsRange {
            low: "s0".to_string(),
            high: "s1".to_string(),
        });
        assert!(
            !compare_context(&ComponentMatcher, &target, Some(&ranged), RangeMatch::Exact)
                .unwrap()
                .is_match()
        );
        assert!(
            compare_context(&ComponentMatcher, &target, Some(&ranged), RangeMatch::Ignore)
                .unwrap()
                .is_match()
        );
    }
}
