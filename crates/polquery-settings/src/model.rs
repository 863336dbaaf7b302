use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_CONFIG_V1: &str = "polquery.config.v1";

/// `polquery.toml` schema v1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolqueryConfigV1 {
    /// Optional schema string for tooling (`polquery.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Preset for the defaults: `types` (default), `attributes`, or `all`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Upper bound, in bytes, on a compiled regular expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_size_limit: Option<usize>,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Map of query name -> query.
    #[serde(default)]
    pub queries: BTreeMap<String, QueryConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect: Option<bool>,

    /// `type` and/or `attribute`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// `type`, `syntactic-type`, `role`, `class`, `level`, `category`, `boolean`, or
    /// `conditional`. Defaults to `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,

    /// Class names for `target = "class"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}
