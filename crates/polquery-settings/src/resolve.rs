use crate::model::{PolqueryConfigV1, QueryConfig, SCHEMA_CONFIG_V1};
use crate::presets::{self, QueryDefaults};
use anyhow::Context;
use polquery_domain::{Criterion, QueryFlags};
use polquery_types::{QueryTarget, SymbolKindMask};

const PROFILES: [&str; 3] = ["types", "attributes", "all"];

/// Command-line overrides; they win over everything in the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub regex: Option<bool>,
    pub indirect: Option<bool>,
    pub symbols: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub profile: String,
    /// In query-name order.
    pub queries: Vec<ResolvedQuery>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub name: String,
    pub target: QueryTarget,
    pub pattern: Option<String>,
    pub flags: QueryFlags,
    pub kinds: SymbolKindMask,
    pub classes: Vec<String>,
    pub regex_size_limit: Option<usize>,
}

impl ResolvedQuery {
    pub fn is_regex(&self) -> bool {
        self.flags.contains(QueryFlags::REGEX)
    }

    pub fn is_indirect(&self) -> bool {
        self.flags.contains(QueryFlags::INDIRECT)
    }

    /// A fresh criterion for this query; each run compiles its own regex.
    pub fn criterion(&self) -> Criterion {
        let criterion = Criterion::from_flags(self.pattern.as_deref(), self.flags);
        match self.regex_size_limit {
            Some(limit) => criterion.with_size_limit(limit),
            None => criterion,
        }
    }
}

pub fn resolve_config(
    cfg: PolqueryConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "types".to_string());
    if !PROFILES.contains(&profile.as_str()) {
        anyhow::bail!("unknown profile: {profile} (expected types|attributes|all)");
    }

    let mut defaults = presets::preset(&profile);
    if let Some(regex) = cfg.defaults.regex {
        defaults.flags.set(QueryFlags::REGEX, regex);
    }
    if let Some(indirect) = cfg.defaults.indirect {
        defaults.flags.set(QueryFlags::INDIRECT, indirect);
    }
    if let Some(symbols) = cfg.defaults.symbols.as_deref() {
        defaults.kinds = parse_symbols(symbols).context("invalid defaults.symbols")?;
    }

    let mut queries = Vec::with_capacity(cfg.queries.len());
    for (name, qc) in &cfg.queries {
        let query = resolve_query(name, qc, &defaults, &overrides, cfg.regex_size_limit)
            .with_context(|| format!("invalid query `{name}`"))?;
        queries.push(query);
    }

    Ok(ResolvedConfig {
        profile: defaults.profile,
        queries,
    })
}

fn resolve_query(
    name: &str,
    qc: &QueryConfig,
    defaults: &QueryDefaults,
    overrides: &Overrides,
    regex_size_limit: Option<usize>,
) -> anyhow::Result<ResolvedQuery> {
    let target = match qc.target.as_deref() {
        None => QueryTarget::Type,
        Some(t) => parse_target(t)?,
    };

    let mut flags = defaults.flags;
    if let Some(regex) = overrides.regex.or(qc.regex) {
        flags.set(QueryFlags::REGEX, regex);
    }
    if let Some(indirect) = overrides.indirect.or(qc.indirect) {
        flags.set(QueryFlags::INDIRECT, indirect);
    }

    let kinds = match overrides.symbols.as_deref().or(qc.symbols.as_deref()) {
        Some(symbols) => parse_symbols(symbols)?,
        None => defaults.kinds,
    };

    let pattern = qc.pattern.clone().filter(|p| !p.is_empty());

    if target == QueryTarget::Class {
        if qc.classes.is_empty() {
            anyhow::bail!("class queries need a non-empty `classes` list");
        }
        if pattern.is_some() {
            anyhow::bail!("class queries match `classes` literally and take no `pattern`");
        }
    } else if !qc.classes.is_empty() {
        anyhow::bail!("`classes` is only valid with target = \"class\"");
    }

    let literal_lookup = matches!(
        target,
        QueryTarget::Type | QueryTarget::SyntacticType | QueryTarget::Role
    );
    if literal_lookup && pattern.is_none() && !flags.contains(QueryFlags::REGEX) {
        anyhow::bail!("a literal {} query needs a `pattern`", target.as_str());
    }

    let query = ResolvedQuery {
        name: name.to_string(),
        target,
        pattern,
        flags,
        kinds,
        classes: qc.classes.clone(),
        regex_size_limit,
    };

    query
        .criterion()
        .compile()
        .with_context(|| format!("bad pattern {:?}", query.pattern.as_deref().unwrap_or("")))?;

    Ok(query)
}

fn parse_target(v: &str) -> anyhow::Result<QueryTarget> {
    QueryTarget::from_name(v).with_context(|| {
        format!(
            "unknown target: {v} (expected type|syntactic-type|role|class|level|category|boolean|conditional)"
        )
    })
}

fn parse_symbols(names: &[String]) -> anyhow::Result<SymbolKindMask> {
    if names.is_empty() {
        anyhow::bail!("symbols must name at least one of type|attribute");
    }
    let mut mask = SymbolKindMask::from_bits(0);
    for name in names {
        let bit = SymbolKindMask::from_name(name)
            .with_context(|| format!("unknown symbol kind: {name} (expected type|attribute)"))?;
        mask = mask | bit;
    }
    Ok(mask)
}
