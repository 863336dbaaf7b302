//! Config parsing and profile/query resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{DefaultsConfig, PolqueryConfigV1, QueryConfig, SCHEMA_CONFIG_V1};
pub use presets::{QueryDefaults, preset};
pub use resolve::{Overrides, ResolvedConfig, ResolvedQuery};

/// Parse `polquery.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<PolqueryConfigV1> {
    let cfg: PolqueryConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the queries the engine runs (profile + defaults + per-query settings + overrides).
pub fn resolve_config(
    cfg: PolqueryConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
