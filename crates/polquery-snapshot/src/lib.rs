//! Policy adapter: read a JSON symbol-table snapshot into a [`PolicyModel`].
//!
//! This crate is allowed to do filesystem IO. It does not compile policies; the snapshot is
//! produced by an external dump of an already compiled policy.

#![forbid(unsafe_code)]

mod format;

use anyhow::Context;
use camino::Utf8Path;
use polquery_domain::{CondExprDecl, CondExprOp, PolicyModel, PolicyModelBuilder};
use tracing::debug;

pub use format::{
    AliasedDecl, AttributeDecl, ClassDecl, ConditionalDecl, PolicySnapshotV1, SCHEMA_SNAPSHOT_V1,
};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
pub mod fuzz {
    /// Parse arbitrary text as a snapshot and build the model.
    ///
    /// Returns `Err(...)` on anything that is not a valid snapshot. **Never panics** on any
    /// input.
    pub fn parse_snapshot(text: &str) -> anyhow::Result<()> {
        let _ = super::parse_policy_snapshot(text)?;
        Ok(())
    }
}

/// Read and build the snapshot at `path`.
pub fn load_policy_snapshot(path: &Utf8Path) -> anyhow::Result<PolicyModel> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let model = parse_policy_snapshot(&text).with_context(|| format!("load policy {path}"))?;
    debug!(%path, "policy snapshot loaded");
    Ok(model)
}

pub fn parse_policy_snapshot(text: &str) -> anyhow::Result<PolicyModel> {
    let snapshot: PolicySnapshotV1 =
        serde_json::from_str(text).context("parse policy snapshot json")?;
    build_model(&snapshot)
}

/// Validate a decoded snapshot and turn it into a model.
pub fn build_model(snapshot: &PolicySnapshotV1) -> anyhow::Result<PolicyModel> {
    if let Some(schema) = snapshot.schema.as_deref()
        && schema != SCHEMA_SNAPSHOT_V1
    {
        anyhow::bail!("unsupported snapshot schema: {schema} (expected {SCHEMA_SNAPSHOT_V1})");
    }

    let mut builder: PolicyModelBuilder = PolicyModel::builder(snapshot.form)
        .version(snapshot.version)
        .mls(snapshot.mls)
        .rules_loaded(snapshot.rules_loaded);

    for ty in &snapshot.types {
        builder = builder.add_type(&ty.name, &borrowed(&ty.aliases));
    }
    for attr in &snapshot.attributes {
        builder = builder.add_attribute(&attr.name, &borrowed(&attr.members));
    }
    for role in &snapshot.roles {
        builder = builder.add_role(role);
    }
    for class in &snapshot.classes {
        builder = builder.add_class(&class.name, &borrowed(&class.permissions));
    }
    for level in &snapshot.levels {
        builder = builder.add_level(&level.name, &borrowed(&level.aliases));
    }
    for category in &snapshot.categories {
        builder = builder.add_category(&category.name, &borrowed(&category.aliases));
    }
    for boolean in &snapshot.booleans {
        builder = builder.add_boolean(boolean);
    }
    for (idx, cond) in snapshot.conditionals.iter().enumerate() {
        let expr = parse_cond_expr(&cond.expr)
            .with_context(|| format!("conditional #{}", idx + 1))?;
        builder = builder.add_conditional(expr);
    }

    let model = builder.build().context("invalid policy snapshot")?;
    debug!(
        form = %snapshot.form,
        version = snapshot.version,
        types = snapshot.types.len(),
        attributes = snapshot.attributes.len(),
        roles = snapshot.roles.len(),
        classes = snapshot.classes.len(),
        booleans = snapshot.booleans.len(),
        conditionals = snapshot.conditionals.len(),
        "policy model built"
    );
    Ok(model)
}

fn borrowed(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}

/// Tokens to expression nodes, checking that the expression reduces to one value.
fn parse_cond_expr(tokens: &[String]) -> anyhow::Result<Vec<CondExprDecl>> {
    let mut depth: usize = 0;
    let mut nodes = Vec::with_capacity(tokens.len());
    for token in tokens {
        let node = match CondExprOp::from_token(token) {
            Some(op) => {
                let arity = if op.is_unary() { 1 } else { 2 };
                if depth < arity {
                    anyhow::bail!("operator `{token}` is missing operands");
                }
                depth -= arity - 1;
                CondExprDecl::Op(op)
            }
            None => {
                depth += 1;
                CondExprDecl::Bool(token.clone())
            }
        };
        nodes.push(node);
    }
    if depth != 1 {
        anyhow::bail!("expression must reduce to a single value: {}", tokens.join(" "));
    }
    Ok(nodes)
}
