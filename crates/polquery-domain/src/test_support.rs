use crate::candidates::CandidateSet;
use crate::error::{StoreError, StoreResult};
use crate::model::{CondExprDecl, PolicyModel};
use crate::store::{
    CondExprNode, CondExprOp, CondId, StoreIter, Symbol, SymbolStore, single_error,
};
use polquery_types::{PolicyForm, SymbolKind};
use std::cell::Cell;

/// `httpd_t` and `sshd_t`, both members of `domain`.
pub fn scenario_policy(form: PolicyForm) -> PolicyModel {
    PolicyModel::builder(form)
        .version(24)
        .add_type("httpd_t", &[])
        .add_type("sshd_t", &[])
        .add_attribute("domain", &["httpd_t", "sshd_t"])
        .build()
        .expect("scenario policy")
}

/// A small targeted-style source policy touching every table.
pub fn targeted_policy() -> PolicyModel {
    PolicyModel::builder(PolicyForm::KernelSource)
        .version(24)
        .mls(true)
        .add_type("httpd_t", &["apache_t", "web_server_t"])
        .add_type("sshd_t", &[])
        .add_type("user_t", &[])
        .add_type("shadow_t", &[])
        .add_attribute("domain", &["httpd_t", "sshd_t"])
        .add_attribute("web_domain", &["apache_t"])
        .add_attribute("file_type", &["shadow_t"])
        .add_role("object_r")
        .add_role("system_r")
        .add_role("staff_r")
        .add_class("file", &["read", "write", "getattr"])
        .add_class("dir", &["search", "read"])
        .add_class("process", &["transition", "signal"])
        .add_level("s0", &["low"])
        .add_level("s1", &["high"])
        .add_category("c0", &[])
        .add_category("c1", &["finance"])
        .add_boolean("httpd_enable_cgi")
        .add_boolean("allow_ssh")
        .add_conditional(vec![
            CondExprDecl::Bool("httpd_enable_cgi".to_string()),
            CondExprDecl::Bool("allow_ssh".to_string()),
            CondExprDecl::Op(CondExprOp::And),
        ])
        .build()
        .expect("targeted policy")
}

pub fn sym<S: SymbolStore + ?Sized>(store: &S, kind: SymbolKind, name: &str) -> Symbol {
    store
        .lookup(kind, name)
        .expect("lookup")
        .unwrap_or_else(|| panic!("{kind} `{name}` missing"))
}

pub fn names<S: SymbolStore + ?Sized>(store: &S, symbols: StoreIter<'_, Symbol>) -> Vec<String> {
    symbols
        .map(|s| store.name_of(s.expect("symbol")).expect("name").to_string())
        .collect()
}

pub fn set_names<S: SymbolStore + ?Sized>(store: &S, set: &CandidateSet<Symbol>) -> Vec<String> {
    set.iter()
        .map(|s| store.name_of(*s).expect("name").to_string())
        .collect()
}

/// A [`PolicyModel`] behind a store that counts every accessor call and can be told to fail
/// whole accessor families with [`StoreError::Backend`].
pub struct FailingStore {
    inner: PolicyModel,
    fail_enumerate: bool,
    fail_membership: bool,
    calls: Cell<usize>,
}

impl FailingStore {
    pub fn new(inner: PolicyModel) -> Self {
        FailingStore {
            inner,
            fail_enumerate: false,
            fail_membership: false,
            calls: Cell::new(0),
        }
    }

    /// `enumerate` yields an error instead of symbols.
    pub fn failing_enumerate(mut self) -> Self {
        self.fail_enumerate = true;
        self
    }

    /// `members_of` and `attributes_of` yield an error instead of symbols.
    pub fn failing_membership(mut self) -> Self {
        self.fail_membership = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn touch(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn boom<'a, T: 'a>() -> StoreIter<'a, T> {
        single_error(StoreError::Backend("boom".to_string()))
    }
}

impl SymbolStore for FailingStore {
    fn policy_form(&self) -> PolicyForm {
        self.touch();
        self.inner.policy_form()
    }

    fn policy_version(&self) -> u32 {
        self.touch();
        self.inner.policy_version()
    }

    fn mls_enabled(&self) -> bool {
        self.touch();
        self.inner.mls_enabled()
    }

    fn rules_loaded(&self) -> bool {
        self.touch();
        self.inner.rules_loaded()
    }

    fn lookup(&self, kind: SymbolKind, name: &str) -> StoreResult<Option<Symbol>> {
        self.touch();
        self.inner.lookup(kind, name)
    }

    fn enumerate(&self, kind: SymbolKind) -> StoreIter<'_, Symbol> {
        self.touch();
        if self.fail_enumerate {
            return Self::boom();
        }
        self.inner.enumerate(kind)
    }

    fn name_of(&self, symbol: Symbol) -> StoreResult<&str> {
        self.touch();
        self.inner.name_of(symbol)
    }

    fn aliases_of(&self, symbol: Symbol) -> StoreIter<'_, &str> {
        self.touch();
        self.inner.aliases_of(symbol)
    }

    fn is_alias(&self, symbol: Symbol) -> StoreResult<bool> {
        self.touch();
        self.inner.is_alias(symbol)
    }

    fn canonical_of(&self, alias: Symbol) -> StoreResult<Symbol> {
        self.touch();
        self.inner.canonical_of(alias)
    }

    fn is_attribute(&self, symbol: Symbol) -> StoreResult<bool> {
        self.touch();
        self.inner.is_attribute(symbol)
    }

    fn members_of(&self, attribute: Symbol) -> StoreIter<'_, Symbol> {
        self.touch();
        if self.fail_membership {
            return Self::boom();
        }
        self.inner.members_of(attribute)
    }

    fn attributes_of(&self, ty: Symbol) -> StoreIter<'_, Symbol> {
        self.touch();
        if self.fail_membership {
            return Self::boom();
        }
        self.inner.attributes_of(ty)
    }

    fn numeric_value(&self, symbol: Symbol) -> StoreResult<u32> {
        self.touch();
        self.inner.numeric_value(symbol)
    }

    fn permissions_of(&self, class: Symbol) -> StoreIter<'_, &str> {
        self.touch();
        self.inner.permissions_of(class)
    }

    fn conditionals(&self) -> StoreIter<'_, CondId> {
        self.touch();
        self.inner.conditionals()
    }

    fn cond_expr(&self, cond: CondId) -> StoreIter<'_, CondExprNode> {
        self.touch();
        self.inner.cond_expr(cond)
    }
}
