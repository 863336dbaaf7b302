//! In-memory symbol tables implementing [`SymbolStore`].
//!
//! The model is constructed elsewhere (snapshot loader, tests) through [`PolicyModelBuilder`],
//! which validates every cross reference once so that accessors only fail on foreign handles.

use crate::error::{StoreError, StoreResult};
use crate::store::{CondExprNode, CondExprOp, CondId, StoreIter, Symbol, SymbolStore, single_error};
use polquery_types::{PolicyForm, SymbolKind};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Detail {
    Type { attributes: Vec<u32> },
    Attribute { members: Vec<u32> },
    TypeAlias { primary: u32 },
    Class { permissions: Vec<String> },
    Plain,
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    aliases: Vec<String>,
    detail: Detail,
}

#[derive(Clone, Debug)]
pub struct PolicyModel {
    form: PolicyForm,
    version: u32,
    mls: bool,
    rules_loaded: bool,
    tables: BTreeMap<SymbolKind, Vec<Entry>>,
    names: BTreeMap<SymbolKind, BTreeMap<String, u32>>,
    conditionals: Vec<Vec<CondExprNode>>,
}

impl PolicyModel {
    pub fn builder(form: PolicyForm) -> PolicyModelBuilder {
        PolicyModelBuilder::new(form)
    }

    /// Number of canonical symbols in a table.
    pub fn count(&self, kind: SymbolKind) -> usize {
        self.table(kind)
            .iter()
            .filter(|e| !matches!(e.detail, Detail::TypeAlias { .. }))
            .count()
    }

    fn table(&self, kind: SymbolKind) -> &[Entry] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn entry(&self, symbol: Symbol) -> StoreResult<&Entry> {
        symbol
            .value()
            .checked_sub(1)
            .and_then(|idx| self.table(symbol.kind()).get(idx as usize))
            .ok_or(StoreError::InvalidSymbol {
                kind: symbol.kind(),
                value: symbol.value(),
            })
    }

    fn insert(&mut self, kind: SymbolKind, entry: Entry) -> StoreResult<u32> {
        let table = self.tables.entry(kind).or_default();
        let value = table.len() as u32 + 1;
        self.bind(kind, &entry.name, value)?;
        self.tables.entry(kind).or_default().push(entry);
        Ok(value)
    }

    fn bind(&mut self, kind: SymbolKind, name: &str, value: u32) -> StoreResult<()> {
        let names = self.names.entry(kind).or_default();
        if names.contains_key(name) {
            return Err(StoreError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
        names.insert(name.to_string(), value);
        Ok(())
    }

    fn resolve(&self, kind: SymbolKind, name: &str) -> StoreResult<u32> {
        self.names
            .get(&kind)
            .and_then(|names| names.get(name))
            .copied()
            .ok_or_else(|| StoreError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    fn type_entry_mut(&mut self, value: u32) -> &mut Entry {
        // Values handed out by `insert` always index into the table.
        &mut self.tables.entry(SymbolKind::Type).or_default()[value as usize - 1]
    }
}

impl SymbolStore for PolicyModel {
    fn policy_form(&self) -> PolicyForm {
        self.form
    }

    fn policy_version(&self) -> u32 {
        self.version
    }

    fn mls_enabled(&self) -> bool {
        self.mls
    }

    fn rules_loaded(&self) -> bool {
        self.rules_loaded
    }

    fn lookup(&self, kind: SymbolKind, name: &str) -> StoreResult<Option<Symbol>> {
        Ok(self
            .names
            .get(&kind)
            .and_then(|names| names.get(name))
            .map(|value| Symbol::new(kind, *value)))
    }

    fn enumerate(&self, kind: SymbolKind) -> StoreIter<'_, Symbol> {
        Box::new(
            self.table(kind)
                .iter()
                .enumerate()
                .filter(|(_, e)| !matches!(e.detail, Detail::TypeAlias { .. }))
                .map(move |(idx, _)| Ok(Symbol::new(kind, idx as u32 + 1))),
        )
    }

    fn name_of(&self, symbol: Symbol) -> StoreResult<&str> {
        self.entry(symbol).map(|e| e.name.as_str())
    }

    fn aliases_of(&self, symbol: Symbol) -> StoreIter<'_, &str> {
        match self.entry(symbol) {
            Ok(entry) => Box::new(entry.aliases.iter().map(|a| Ok(a.as_str()))),
            Err(err) => single_error(err),
        }
    }

    fn is_alias(&self, symbol: Symbol) -> StoreResult<bool> {
        self.entry(symbol)
            .map(|e| matches!(e.detail, Detail::TypeAlias { .. }))
    }

    fn canonical_of(&self, alias: Symbol) -> StoreResult<Symbol> {
        match self.entry(alias)?.detail {
            Detail::TypeAlias { primary } => Ok(Symbol::new(SymbolKind::Type, primary)),
            _ => Ok(alias),
        }
    }

    fn is_attribute(&self, symbol: Symbol) -> StoreResult<bool> {
        self.entry(symbol)
            .map(|e| matches!(e.detail, Detail::Attribute { .. }))
    }

    fn members_of(&self, attribute: Symbol) -> StoreIter<'_, Symbol> {
        match self.entry(attribute) {
            Ok(Entry {
                detail: Detail::Attribute { members },
                ..
            }) => Box::new(
                members
                    .iter()
                    .map(|v| Ok(Symbol::new(SymbolKind::Type, *v))),
            ),
            Ok(_) => Box::new(std::iter::empty()),
            Err(err) => single_error(err),
        }
    }

    fn attributes_of(&self, ty: Symbol) -> StoreIter<'_, Symbol> {
        match self.entry(ty) {
            Ok(Entry {
                detail: Detail::Type { attributes },
                ..
            }) => Box::new(
                attributes
                    .iter()
                    .map(|v| Ok(Symbol::new(SymbolKind::Type, *v))),
            ),
            Ok(_) => Box::new(std::iter::empty()),
            Err(err) => single_error(err),
        }
    }

    fn numeric_value(&self, symbol: Symbol) -> StoreResult<u32> {
        self.entry(symbol).map(|_| symbol.value())
    }

    fn permissions_of(&self, class: Symbol) -> StoreIter<'_, &str> {
        match self.entry(class) {
            Ok(Entry {
                detail: Detail::Class { permissions },
                ..
            }) => Box::new(permissions.iter().map(|p| Ok(p.as_str()))),
            Ok(_) => Box::new(std::iter::empty()),
            Err(err) => single_error(err),
        }
    }

    fn conditionals(&self) -> StoreIter<'_, CondId> {
        Box::new((1..=self.conditionals.len() as u32).map(|v| Ok(CondId::new(v))))
    }

    fn cond_expr(&self, cond: CondId) -> StoreIter<'_, CondExprNode> {
        match cond
            .value()
            .checked_sub(1)
            .and_then(|idx| self.conditionals.get(idx as usize))
        {
            Some(nodes) => Box::new(nodes.iter().copied().map(Ok)),
            None => single_error(StoreError::InvalidConditional(cond.value())),
        }
    }
}

/// Conditional expression node as declared, before booleans are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CondExprDecl {
    Bool(String),
    Op(CondExprOp),
}

#[derive(Clone, Debug)]
enum TypeDecl {
    Type { name: String, aliases: Vec<String> },
    Attribute { name: String, members: Vec<String> },
}

/// Collects declarations and produces a validated [`PolicyModel`].
///
/// Values are assigned in declaration order per table. A type's aliases receive the values
/// right after the type itself.
#[derive(Clone, Debug)]
pub struct PolicyModelBuilder {
    form: PolicyForm,
    version: u32,
    mls: bool,
    rules_loaded: bool,
    types: Vec<TypeDecl>,
    roles: Vec<String>,
    classes: Vec<(String, Vec<String>)>,
    levels: Vec<(String, Vec<String>)>,
    categories: Vec<(String, Vec<String>)>,
    booleans: Vec<String>,
    conditionals: Vec<Vec<CondExprDecl>>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PolicyModelBuilder {
    pub fn new(form: PolicyForm) -> Self {
        PolicyModelBuilder {
            form,
            version: 0,
            mls: false,
            rules_loaded: false,
            types: Vec::new(),
            roles: Vec::new(),
            classes: Vec::new(),
            levels: Vec::new(),
            categories: Vec::new(),
            booleans: Vec::new(),
            conditionals: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn mls(mut self, enabled: bool) -> Self {
        self.mls = enabled;
        self
    }

    pub fn rules_loaded(mut self, loaded: bool) -> Self {
        self.rules_loaded = loaded;
        self
    }

    pub fn add_type(mut self, name: &str, aliases: &[&str]) -> Self {
        self.types.push(TypeDecl::Type {
            name: name.to_string(),
            aliases: owned(aliases),
        });
        self
    }

    /// Members may be named by alias; they are stored as their primary type.
    pub fn add_attribute(mut self, name: &str, members: &[&str]) -> Self {
        self.types.push(TypeDecl::Attribute {
            name: name.to_string(),
            members: owned(members),
        });
        self
    }

    pub fn add_role(mut self, name: &str) -> Self {
        self.roles.push(name.to_string());
        self
    }

    pub fn add_class(mut self, name: &str, permissions: &[&str]) -> Self {
        self.classes.push((name.to_string(), owned(permissions)));
        self
    }

    pub fn add_level(mut self, name: &str, aliases: &[&str]) -> Self {
        self.levels.push((name.to_string(), owned(aliases)));
        self
    }

    pub fn add_category(mut self, name: &str, aliases: &[&str]) -> Self {
        self.categories.push((name.to_string(), owned(aliases)));
        self
    }

    pub fn add_boolean(mut self, name: &str) -> Self {
        self.booleans.push(name.to_string());
        self
    }

    pub fn add_conditional(mut self, expr: Vec<CondExprDecl>) -> Self {
        self.conditionals.push(expr);
        self
    }

    pub fn build(self) -> StoreResult<PolicyModel> {
        let mut model = PolicyModel {
            form: self.form,
            version: self.version,
            mls: self.mls,
            rules_loaded: self.rules_loaded,
            tables: BTreeMap::new(),
            names: BTreeMap::new(),
            conditionals: Vec::new(),
        };

        for decl in &self.types {
            match decl {
                TypeDecl::Type { name, aliases } => {
                    let primary = model.insert(
                        SymbolKind::Type,
                        Entry {
                            name: name.clone(),
                            aliases: aliases.clone(),
                            detail: Detail::Type {
                                attributes: Vec::new(),
                            },
                        },
                    )?;
                    for alias in aliases {
                        model.insert(
                            SymbolKind::Type,
                            Entry {
                                name: alias.clone(),
                                aliases: Vec::new(),
                                detail: Detail::TypeAlias { primary },
                            },
                        )?;
                    }
                }
                TypeDecl::Attribute { name, .. } => {
                    model.insert(
                        SymbolKind::Type,
                        Entry {
                            name: name.clone(),
                            aliases: Vec::new(),
                            detail: Detail::Attribute {
                                members: Vec::new(),
                            },
                        },
                    )?;
                }
            }
        }

        for decl in &self.types {
            let TypeDecl::Attribute { name, members } = decl else {
                continue;
            };
            let attr = model.resolve(SymbolKind::Type, name)?;
            for member in members {
                let value = model.resolve(SymbolKind::Type, member)?;
                let value = match model.type_entry_mut(value).detail {
                    Detail::TypeAlias { primary } => primary,
                    Detail::Attribute { .. } => {
                        return Err(StoreError::InvalidMember {
                            name: member.clone(),
                            reason: "attributes cannot contain attributes",
                        });
                    }
                    _ => value,
                };
                if let Detail::Attribute { members } = &mut model.type_entry_mut(attr).detail {
                    if members.contains(&value) {
                        continue;
                    }
                    members.push(value);
                }
                if let Detail::Type { attributes } = &mut model.type_entry_mut(value).detail {
                    attributes.push(attr);
                }
            }
        }

        for role in &self.roles {
            model.insert(SymbolKind::Role, plain(role))?;
        }

        for (name, permissions) in &self.classes {
            let mut unique: Vec<String> = Vec::with_capacity(permissions.len());
            for perm in permissions {
                if !unique.contains(perm) {
                    unique.push(perm.clone());
                }
            }
            model.insert(
                SymbolKind::Class,
                Entry {
                    name: name.clone(),
                    aliases: Vec::new(),
                    detail: Detail::Class {
                        permissions: unique,
                    },
                },
            )?;
        }

        for (kind, decls) in [
            (SymbolKind::Level, &self.levels),
            (SymbolKind::Category, &self.categories),
        ] {
            for (name, aliases) in decls {
                let value = model.insert(
                    kind,
                    Entry {
                        name: name.clone(),
                        aliases: aliases.clone(),
                        detail: Detail::Plain,
                    },
                )?;
                for alias in aliases {
                    model.bind(kind, alias, value)?;
                }
            }
        }

        for boolean in &self.booleans {
            model.insert(SymbolKind::Boolean, plain(boolean))?;
        }

        for expr in &self.conditionals {
            let mut nodes = Vec::with_capacity(expr.len());
            for decl in expr {
                nodes.push(match decl {
                    CondExprDecl::Bool(name) => CondExprNode::Bool(Symbol::new(
                        SymbolKind::Boolean,
                        model.resolve(SymbolKind::Boolean, name)?,
                    )),
                    CondExprDecl::Op(op) => CondExprNode::Op(*op),
                });
            }
            model.conditionals.push(nodes);
        }

        Ok(model)
    }
}

fn plain(name: &str) -> Entry {
    Entry {
        name: name.to_string(),
        aliases: Vec::new(),
        detail: Detail::Plain,
    }
}
