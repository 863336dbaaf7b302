//! Candidate-set builders.
//!
//! Each builder resolves a [`Criterion`] against one symbol table and returns a sorted,
//! duplicate-free [`CandidateSet`]. A criterion in exact mode is a name lookup (an unknown or
//! absent name gives an empty set); in regex mode every symbol of the table is compared, aliases
//! included. Any error aborts the build and nothing partial is returned.

use crate::candidates::{CandidateSet, CandidateSetBuilder};
use crate::compare::compare_symbol_with_aliases;
use crate::criterion::Criterion;
use crate::error::{QueryError, QueryResult, StoreResult};
use crate::store::{Symbol, SymbolStore};
use polquery_types::{SymbolKind, SymbolKindMask};

/// Types and attributes matching `criterion`.
///
/// Candidates are filtered by `kinds` and then, when `indirect` is set, every survivor is
/// expanded: attributes to their member types and types to the attributes they belong to. The
/// expansion is not filtered again, so `kinds = TYPE` with `indirect` also returns the attributes
/// of every matched type.
pub fn candidate_types<S>(
    store: &S,
    criterion: &Criterion,
    indirect: bool,
    kinds: SymbolKindMask,
) -> QueryResult<CandidateSet<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    check_mask(kinds)?;
    let mut set = seed_types(store, criterion)?;
    filter_kinds(store, &mut set, kinds)?;
    expand(store, &mut set, |_| indirect)?;
    Ok(set.finish())
}

/// Like [`candidate_types`], restricted to source policies.
///
/// Attributes always expand to their members here, while types expand to their attributes only
/// when `indirect` is set.
pub fn candidate_syntactic_types<S>(
    store: &S,
    criterion: &Criterion,
    indirect: bool,
    kinds: SymbolKindMask,
) -> QueryResult<CandidateSet<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    let form = store.policy_form();
    if form.is_binary() {
        return Err(QueryError::BinaryPolicy(form));
    }
    check_mask(kinds)?;
    let mut set = seed_types(store, criterion)?;
    filter_kinds(store, &mut set, kinds)?;
    expand(store, &mut set, |is_attr| is_attr || indirect)?;
    Ok(set.finish())
}

pub fn candidate_roles<S>(store: &S, criterion: &Criterion) -> QueryResult<CandidateSet<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    let mut set = CandidateSetBuilder::new();
    if !criterion.is_regex() {
        if let Some(name) = criterion.pattern()
            && let Some(role) = store.lookup(SymbolKind::Role, name)?
        {
            set.push(role);
        }
        return Ok(set.finish());
    }
    for role in store.enumerate(SymbolKind::Role) {
        let role = role?;
        if criterion.compare(store.name_of(role)?)?.is_match() {
            set.push(role);
        }
    }
    Ok(set.finish())
}

/// Classes named literally. Names that do not resolve are skipped.
pub fn candidate_classes<S, I, N>(store: &S, names: I) -> QueryResult<CandidateSet<Symbol>>
where
    S: SymbolStore + ?Sized,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let mut set = CandidateSetBuilder::new();
    for name in names {
        if let Some(class) = store.lookup(SymbolKind::Class, name.as_ref())? {
            set.push(class);
        }
    }
    Ok(set.finish())
}

/// Every canonical symbol of `kind` whose name, or any alias, matches `criterion`.
///
/// Unlike the builders above this is a plain scan: a wildcard returns the whole table.
pub fn find_symbols<S>(
    store: &S,
    kind: SymbolKind,
    criterion: &Criterion,
) -> QueryResult<CandidateSet<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    let mut set = CandidateSetBuilder::new();
    for symbol in store.enumerate(kind) {
        let symbol = symbol?;
        let hit = if kind.supports_aliases() {
            compare_symbol_with_aliases(store, symbol, criterion)?
        } else {
            criterion.compare(store.name_of(symbol)?)?
        };
        if hit.is_match() {
            set.push(symbol);
        }
    }
    Ok(set.finish())
}

/// A plain type as itself, an attribute as its member types.
pub fn expand_type<S>(store: &S, ty: Symbol) -> QueryResult<Vec<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    let ty = store.canonicalize(ty)?;
    if store.is_attribute(ty)? {
        Ok(store.members_of(ty).collect::<StoreResult<Vec<_>>>()?)
    } else {
        Ok(vec![ty])
    }
}

fn check_mask(kinds: SymbolKindMask) -> QueryResult<()> {
    if kinds.is_valid() {
        Ok(())
    } else {
        Err(QueryError::InvalidKindMask(kinds.bits()))
    }
}

fn seed_types<S>(store: &S, criterion: &Criterion) -> QueryResult<CandidateSetBuilder<Symbol>>
where
    S: SymbolStore + ?Sized,
{
    let mut set = CandidateSetBuilder::new();
    if !criterion.is_regex() {
        if let Some(name) = criterion.pattern()
            && let Some(ty) = store.lookup_canonical(SymbolKind::Type, name)?
        {
            set.push(ty);
        }
        return Ok(set);
    }
    for ty in store.enumerate(SymbolKind::Type) {
        let ty = ty?;
        if compare_symbol_with_aliases(store, ty, criterion)?.is_match() {
            set.push(store.canonicalize(ty)?);
        }
    }
    Ok(set)
}

fn filter_kinds<S>(
    store: &S,
    set: &mut CandidateSetBuilder<Symbol>,
    kinds: SymbolKindMask,
) -> QueryResult<()>
where
    S: SymbolStore + ?Sized,
{
    set.try_retain(|ty| {
        Ok(if store.is_attribute(*ty)? {
            kinds.includes_attributes()
        } else {
            kinds.includes_types()
        })
    })
}

/// Appends the expansion of every candidate present on entry for which `expands(is_attribute)`
/// holds.
fn expand<S>(
    store: &S,
    set: &mut CandidateSetBuilder<Symbol>,
    expands: impl Fn(bool) -> bool,
) -> QueryResult<()>
where
    S: SymbolStore + ?Sized,
{
    let seeds = set.as_slice().to_vec();
    for ty in seeds {
        if store.is_alias(ty)? {
            continue;
        }
        let is_attr = store.is_attribute(ty)?;
        if !expands(is_attr) {
            continue;
        }
        let related = if is_attr {
            store.members_of(ty)
        } else {
            store.attributes_of(ty)
        };
        for other in related {
            set.push(other?);
        }
    }
    Ok(())
}
