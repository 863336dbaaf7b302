use crate::store::SymbolStore;
use polquery_types::{Capability, PolicyForm};

/// First policy version with conditional policy.
pub const POLICY_VERSION_CONDITIONALS: u32 = 16;

pub fn has_capability<S>(store: &S, capability: Capability) -> bool
where
    S: SymbolStore + ?Sized,
{
    let form = store.policy_form();
    match capability {
        Capability::AttributeNames | Capability::SyntacticRules => {
            matches!(form, PolicyForm::KernelSource | PolicyForm::ModuleBinary)
        }
        Capability::LineNumbers => form == PolicyForm::KernelSource,
        Capability::Conditionals => {
            form == PolicyForm::ModuleBinary
                || store.policy_version() >= POLICY_VERSION_CONDITIONALS
        }
        Capability::Mls => store.mls_enabled(),
        Capability::Modules => form == PolicyForm::ModuleBinary,
        Capability::RulesLoaded => store.rules_loaded(),
    }
}

/// Every capability with its availability, in [`Capability::ALL`] order.
pub fn capabilities<S>(store: &S) -> Vec<(Capability, bool)>
where
    S: SymbolStore + ?Sized,
{
    Capability::ALL
        .iter()
        .map(|&cap| (cap, has_capability(store, cap)))
        .collect()
}
