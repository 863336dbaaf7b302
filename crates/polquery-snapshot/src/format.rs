use polquery_types::PolicyForm;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_SNAPSHOT_V1: &str = "polquery.snapshot.v1";

/// JSON dump of a compiled policy's symbol tables.
///
/// Declaration order is significant: it assigns each symbol's policy value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PolicySnapshotV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub form: PolicyForm,

    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub mls: bool,

    #[serde(default)]
    pub rules_loaded: bool,

    #[serde(default)]
    pub types: Vec<AliasedDecl>,

    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub classes: Vec<ClassDecl>,

    #[serde(default)]
    pub levels: Vec<AliasedDecl>,

    #[serde(default)]
    pub categories: Vec<AliasedDecl>,

    #[serde(default)]
    pub booleans: Vec<String>,

    #[serde(default)]
    pub conditionals: Vec<ConditionalDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AliasedDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AttributeDecl {
    pub name: String,
    /// Member types, by name or alias.
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConditionalDecl {
    /// Reverse Polish tokens: boolean names and `!`, `&&`, `||`, `^`, `==`, `!=`.
    pub expr: Vec<String>,
}
