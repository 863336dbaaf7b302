//! The `run` use case: load a policy, resolve the configured queries, and produce a report.

use crate::query::run_query;
use anyhow::Context;
use camino::Utf8Path;
use polquery_domain::{SymbolStore, capabilities};
use polquery_settings::{Overrides, PolqueryConfigV1, ResolvedConfig};
use polquery_types::{CapabilityEntry, PolicyMeta, QueryReport, SCHEMA_QUERY_REPORT_V1, ToolMeta};
use time::OffsetDateTime;
use tracing::info;

/// Input for the run use case.
#[derive(Clone, Debug)]
pub struct RunInput<'a> {
    /// Policy snapshot path.
    pub policy_path: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the run use case.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub report: QueryReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

pub fn run_config(input: RunInput<'_>) -> anyhow::Result<RunOutput> {
    // Empty config is allowed; it simply has no queries.
    let cfg = if input.config_text.trim().is_empty() {
        PolqueryConfigV1::default()
    } else {
        polquery_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        polquery_settings::resolve_config(cfg, input.overrides).context("resolve config")?;

    let model =
        polquery_snapshot::load_policy_snapshot(input.policy_path).context("load policy")?;

    let report = run_all(&model, &resolved)?;
    Ok(RunOutput {
        report,
        resolved_config: resolved,
    })
}

/// Run every resolved query in order. The first failing query aborts the run.
pub fn run_all<S>(store: &S, resolved: &ResolvedConfig) -> anyhow::Result<QueryReport>
where
    S: SymbolStore + ?Sized,
{
    let started_at = OffsetDateTime::now_utc();

    let mut queries = Vec::with_capacity(resolved.queries.len());
    for query in &resolved.queries {
        queries.push(run_query(store, query)?);
    }

    let finished_at = OffsetDateTime::now_utc();
    info!(
        profile = %resolved.profile,
        queries = queries.len(),
        elapsed_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64,
        "run finished"
    );

    Ok(QueryReport {
        schema: SCHEMA_QUERY_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "polquery".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        policy: policy_meta(store),
        queries,
    })
}

pub fn policy_meta<S>(store: &S) -> PolicyMeta
where
    S: SymbolStore + ?Sized,
{
    PolicyMeta {
        form: store.policy_form(),
        version: store.policy_version(),
        capabilities: capabilities(store)
            .into_iter()
            .map(|(capability, available)| CapabilityEntry {
                capability,
                available,
            })
            .collect(),
    }
}
