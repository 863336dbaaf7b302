//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Comparator semantics (exact equality, wildcard criteria)
//! - Candidate-set determinism and uniqueness over generated policies
//! - Type-set and ObjPerm edge cases

use crate::candidates::CandidateSetBuilder;
use crate::compare::{compare_any, compare_symbol_with_aliases};
use crate::criterion::{Comparison, Criterion};
use crate::error::StoreResult;
use crate::model::PolicyModel;
use crate::obj_perm::ObjPerm;
use crate::search::{candidate_syntactic_types, candidate_types, expand_type};
use crate::store::{Symbol, SymbolStore};
use crate::type_set::{TypeSet, type_set_intersects_any};
use polquery_types::{PolicyForm, SymbolKind, SymbolKindMask};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").unwrap()
}

fn arb_mask() -> impl Strategy<Value = SymbolKindMask> {
    prop_oneof![
        Just(SymbolKindMask::TYPE),
        Just(SymbolKindMask::ATTRIBUTE),
        Just(SymbolKindMask::BOTH),
    ]
}

/// Types `t0..tN` (each with alias `tN_alias` when flagged) and attributes `a0..aM` whose
/// members are chosen by bitmask.
fn arb_policy() -> impl Strategy<Value = PolicyModel> {
    (
        prop::collection::vec(any::<bool>(), 1..8),
        prop::collection::vec(any::<u8>(), 0..4),
    )
        .prop_map(|(aliased, attrs)| {
            let type_names: Vec<String> = (0..aliased.len()).map(|i| format!("t{i}")).collect();
            let alias_names: Vec<String> = type_names.iter().map(|t| format!("{t}_alias")).collect();
            let mut builder = PolicyModel::builder(PolicyForm::KernelSource);
            for (i, name) in type_names.iter().enumerate() {
                if aliased[i] {
                    builder = builder.add_type(name, &[alias_names[i].as_str()]);
                } else {
                    builder = builder.add_type(name, &[]);
                }
            }
            for (a, bits) in attrs.iter().enumerate() {
                let members: Vec<&str> = type_names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| bits & (1 << i) != 0)
                    .map(|(_, n)| n.as_str())
                    .collect();
                builder = builder.add_attribute(&format!("a{a}"), &members);
            }
            builder.build().expect("generated policy is valid")
        })
}

// ============================================================================
// Comparator properties
// ============================================================================

proptest! {
    #[test]
    fn exact_matches_iff_equal(target in arb_name(), pattern in arb_name()) {
        let hit = Criterion::exact(&pattern).compare(&target).unwrap();
        prop_assert_eq!(hit.is_match(), target.as_bytes() == pattern.as_bytes());
    }

    #[test]
    fn wildcard_always_matches(targets in prop::collection::vec(arb_name(), 0..5), regex in any::<bool>()) {
        let criterion = if regex { Criterion::regex("") } else { Criterion::any() };
        for target in &targets {
            prop_assert_eq!(criterion.compare(target).unwrap(), Comparison::Match);
        }
        let seq = targets.iter().map(|t| Ok::<_, crate::error::StoreError>(t.as_str()));
        prop_assert_eq!(compare_any(seq, &criterion).unwrap(), Comparison::Match);
    }

    #[test]
    fn wildcard_matches_every_symbol(policy in arb_policy()) {
        for ty in policy.enumerate(SymbolKind::Type) {
            let ty = ty.unwrap();
            prop_assert!(compare_symbol_with_aliases(&policy, ty, &Criterion::any()).unwrap().is_match());
        }
    }

    #[test]
    fn candidate_types_sorted_unique_and_repeatable(
        policy in arb_policy(),
        pattern in "[at][0-9]?",
        indirect in any::<bool>(),
        mask in arb_mask(),
    ) {
        let criterion = Criterion::regex(&pattern);
        let first = candidate_types(&policy, &criterion, indirect, mask).unwrap();
        let second = candidate_types(&policy, &criterion, indirect, mask).unwrap();
        prop_assert!(first.as_slice().windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(&first, &second);
        for symbol in &first {
            prop_assert!(!policy.is_alias(*symbol).unwrap());
        }
    }

    #[test]
    fn syntactic_equals_semantic_when_indirect(
        policy in arb_policy(),
        pattern in "[at][0-9]?",
        mask in arb_mask(),
    ) {
        let criterion = Criterion::regex(&pattern);
        let semantic = candidate_types(&policy, &criterion, true, mask).unwrap();
        let syntactic = candidate_syntactic_types(&policy, &criterion, true, mask).unwrap();
        prop_assert_eq!(semantic, syntactic);
    }

    #[test]
    fn literal_alias_and_name_agree(policy in arb_policy()) {
        for ty in policy.enumerate(SymbolKind::Type) {
            let ty = ty.unwrap();
            let name = policy.name_of(ty).unwrap().to_string();
            let by_name = candidate_types(&policy, &Criterion::exact(&name), false, SymbolKindMask::BOTH).unwrap();
            prop_assert_eq!(by_name.as_slice(), &[ty]);
            let aliases: Vec<String> = policy
                .aliases_of(ty)
                .map(|a| a.map(str::to_string))
                .collect::<StoreResult<_>>()
                .unwrap();
            for alias in aliases {
                let by_alias = candidate_types(&policy, &Criterion::exact(&alias), false, SymbolKindMask::BOTH).unwrap();
                prop_assert_eq!(by_alias.as_slice(), &[ty]);
            }
        }
    }

    #[test]
    fn expand_type_never_yields_aliases_or_attributes(policy in arb_policy()) {
        for ty in policy.enumerate(SymbolKind::Type) {
            let ty = ty.unwrap();
            let expanded = expand_type(&policy, ty).unwrap();
            if !policy.is_attribute(ty).unwrap() {
                prop_assert_eq!(&expanded, &vec![ty]);
            }
            for member in expanded {
                prop_assert!(!policy.is_alias(member).unwrap());
                prop_assert!(!policy.is_attribute(member).unwrap());
            }
        }
    }

    #[test]
    fn finish_is_idempotent(values in prop::collection::vec(0u32..20, 0..30)) {
        let mut b = CandidateSetBuilder::new();
        b.extend(values.iter().map(|v| Symbol::new(SymbolKind::Role, *v)));
        let once = b.finish();
        let mut again = CandidateSetBuilder::new();
        again.extend(once.iter().copied());
        prop_assert_eq!(again.finish(), once);
    }

    #[test]
    fn empty_candidates_never_intersect(
        members in prop::collection::vec(1u32..50, 0..10),
        complemented in any::<bool>(),
    ) {
        let members: Vec<Symbol> = members.into_iter().map(|v| Symbol::new(SymbolKind::Type, v)).collect();
        let set = TypeSet { included: members.clone(), excluded: members, complemented };
        prop_assert!(!type_set_intersects_any(&set, &[]).unwrap());
    }

    #[test]
    fn null_perm_always_clears(perms in prop::collection::vec(arb_name(), 0..8)) {
        let mut op = ObjPerm::new();
        op.set_class_name(Some("file"));
        for perm in &perms {
            op.append_perm(Some(perm));
        }
        let mut unique = perms.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(op.perms().len(), unique.len());
        op.append_perm(None);
        prop_assert!(op.perms().is_empty());
    }
}
