//! Render use cases: text and JSON from in-memory reports.

use anyhow::Context;
use camino::Utf8Path;
use polquery_types::{QueryReport, QueryResultEntry};
use std::fmt::Write as _;

pub fn render_text(report: &QueryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "policy: {} (version {})",
        report.policy.form, report.policy.version
    );
    for entry in &report.queries {
        out.push('\n');
        render_entry(&mut out, entry);
    }
    out
}

fn render_entry(out: &mut String, entry: &QueryResultEntry) {
    let _ = write!(out, "{} [{}]", entry.name, entry.target.as_str());
    if let Some(pattern) = &entry.pattern {
        let _ = write!(out, " pattern={pattern:?}");
    }
    if !entry.classes.is_empty() {
        let _ = write!(out, " classes={}", entry.classes.join(","));
    }
    if !entry.symbols.is_empty() {
        let _ = write!(out, " symbols={}", entry.symbols.join(","));
    }
    if entry.regex {
        out.push_str(" regex");
    }
    if entry.indirect {
        out.push_str(" indirect");
    }
    out.push('\n');

    if entry.matches.is_empty() {
        out.push_str("  (no matches)\n");
        return;
    }
    for m in &entry.matches {
        let _ = write!(out, "  {} ({})", m.name, m.kind);
        if !m.permissions.is_empty() {
            let _ = write!(out, ": {}", m.permissions.join(" "));
        }
        out.push('\n');
    }
}

pub fn serialize_report(report: &QueryReport) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(report).context("serialize report")?;
    json.push('\n');
    Ok(json)
}

pub fn write_report(path: &Utf8Path, report: &QueryReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    let json = serialize_report(report)?;
    std::fs::write(path, json).with_context(|| format!("write {path}"))?;
    Ok(())
}
