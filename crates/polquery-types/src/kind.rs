use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Symbol tables of a compiled policy.
///
/// Types and attributes share one table (`Type`), as they do in the kernel policy; whether a
/// given entry is an attribute is a property of the entry, not of the table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Type,
    Role,
    Class,
    Level,
    Category,
    Boolean,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Role => "role",
            SymbolKind::Class => "class",
            SymbolKind::Level => "level",
            SymbolKind::Category => "category",
            SymbolKind::Boolean => "boolean",
        }
    }

    /// Kinds whose entries may carry alias names.
    pub fn supports_aliases(self) -> bool {
        matches!(
            self,
            SymbolKind::Type | SymbolKind::Level | SymbolKind::Category
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restricts type searches to plain types, attributes, or both.
///
/// The raw bits are kept as given so that an invalid mask can be carried to the engine and
/// rejected there; use [`SymbolKindMask::is_valid`] to check one up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SymbolKindMask(u32);

impl SymbolKindMask {
    pub const TYPE: SymbolKindMask = SymbolKindMask(0x1);
    pub const ATTRIBUTE: SymbolKindMask = SymbolKindMask(0x2);
    pub const BOTH: SymbolKindMask = SymbolKindMask(0x3);

    pub const fn from_bits(bits: u32) -> Self {
        SymbolKindMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Non-empty and no bits outside `TYPE | ATTRIBUTE`.
    pub const fn is_valid(self) -> bool {
        self.0 != 0 && self.0 & !Self::BOTH.0 == 0
    }

    pub const fn includes_types(self) -> bool {
        self.0 & Self::TYPE.0 != 0
    }

    pub const fn includes_attributes(self) -> bool {
        self.0 & Self::ATTRIBUTE.0 != 0
    }

    /// Accepts `type`/`types` and `attribute`/`attributes`/`attr`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "type" | "types" => Some(Self::TYPE),
            "attribute" | "attributes" | "attr" => Some(Self::ATTRIBUTE),
            "both" | "all" => Some(Self::BOTH),
            _ => None,
        }
    }

    /// Stable names of the set bits, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.includes_types() {
            out.push("type");
        }
        if self.includes_attributes() {
            out.push("attribute");
        }
        out
    }
}

impl BitOr for SymbolKindMask {
    type Output = SymbolKindMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        SymbolKindMask(self.0 | rhs.0)
    }
}

/// How the loaded policy was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyForm {
    /// `policy.conf` style source, compiled in memory.
    KernelSource,
    /// A kernel binary policy (`policy.N`).
    KernelBinary,
    /// A binary policy module (`.pp`).
    ModuleBinary,
}

impl PolicyForm {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyForm::KernelSource => "kernel_source",
            PolicyForm::KernelBinary => "kernel_binary",
            PolicyForm::ModuleBinary => "module_binary",
        }
    }

    /// Everything except kernel source counts as binary.
    pub fn is_binary(self) -> bool {
        !matches!(self, PolicyForm::KernelSource)
    }
}

impl fmt::Display for PolicyForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional features a loaded policy may or may not provide.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Attribute names survived compilation.
    AttributeNames,
    /// Syntactic (pre-expansion) rules are available.
    SyntacticRules,
    /// Rules carry source line numbers.
    LineNumbers,
    /// Conditional policy is supported.
    Conditionals,
    Mls,
    Modules,
    /// Access vector rules were loaded along with the symbols.
    RulesLoaded,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::AttributeNames,
        Capability::SyntacticRules,
        Capability::LineNumbers,
        Capability::Conditionals,
        Capability::Mls,
        Capability::Modules,
        Capability::RulesLoaded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::AttributeNames => "attribute_names",
            Capability::SyntacticRules => "syntactic_rules",
            Capability::LineNumbers => "line_numbers",
            Capability::Conditionals => "conditionals",
            Capability::Mls => "mls",
            Capability::Modules => "modules",
            Capability::RulesLoaded => "rules_loaded",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
