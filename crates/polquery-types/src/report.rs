use crate::kind::{Capability, PolicyForm};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for query reports.
pub const SCHEMA_QUERY_REPORT_V1: &str = "polquery.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// What a query searches for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum QueryTarget {
    /// Types and attributes, with optional indirect expansion.
    Type,
    /// Types and attributes as written in a source policy.
    SyntacticType,
    Role,
    /// Object classes named literally.
    Class,
    Level,
    Category,
    Boolean,
    /// Conditional expressions that reference a matching boolean.
    Conditional,
}

impl QueryTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryTarget::Type => "type",
            QueryTarget::SyntacticType => "syntactic_type",
            QueryTarget::Role => "role",
            QueryTarget::Class => "class",
            QueryTarget::Level => "level",
            QueryTarget::Category => "category",
            QueryTarget::Boolean => "boolean",
            QueryTarget::Conditional => "conditional",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "type" => Some(QueryTarget::Type),
            "syntactic_type" | "syntactic-type" => Some(QueryTarget::SyntacticType),
            "role" => Some(QueryTarget::Role),
            "class" => Some(QueryTarget::Class),
            "level" | "sensitivity" => Some(QueryTarget::Level),
            "category" => Some(QueryTarget::Category),
            "boolean" | "bool" => Some(QueryTarget::Boolean),
            "conditional" | "cond" => Some(QueryTarget::Conditional),
            _ => None,
        }
    }

    /// Targets whose results are types and attributes.
    pub fn is_type_search(self) -> bool {
        matches!(self, QueryTarget::Type | QueryTarget::SyntacticType)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityEntry {
    pub capability: Capability,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyMeta {
    pub form: PolicyForm,
    pub version: u32,
    pub capabilities: Vec<CapabilityEntry>,
}

/// One element of a query result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchedSymbol {
    /// Canonical name; for conditionals, the rendered expression.
    pub name: String,
    /// `type`, `attribute`, `role`, `class`, `level`, `category`, `boolean`, or `conditional`.
    pub kind: String,
    /// Policy-internal value of the symbol.
    pub value: u32,
    /// Permissions of a matched class.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QueryResultEntry {
    pub name: String,
    pub target: QueryTarget,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    pub regex: bool,
    pub indirect: bool,

    /// Type/attribute restriction for type searches; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,

    /// Literal class names for class searches; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    pub matches: Vec<MatchedSymbol>,

    /// Stable SHA-256 over the query name, target, and matched names.
    pub fingerprint: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryReport {
    pub schema: String,
    pub tool: ToolMeta,

    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,

    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,

    pub policy: PolicyMeta,
    pub queries: Vec<QueryResultEntry>,
}
