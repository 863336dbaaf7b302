//! Developer tasks (schema generation, fixture checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use polquery_settings::Overrides;
use schemars::schema_for;
use std::collections::BTreeMap;
use std::fs;

/// The workspace root (parent of the xtask directory).
fn project_root() -> anyhow::Result<Utf8PathBuf> {
    let manifest_dir = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Utf8Path::to_path_buf)
        .context("xtask has no parent directory")
}

fn schemas_dir() -> anyhow::Result<Utf8PathBuf> {
    Ok(project_root()?.join("schemas"))
}

fn fixtures_dir() -> anyhow::Result<Utf8PathBuf> {
    Ok(project_root()?.join("tests").join("fixtures"))
}

struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "polquery.report.v1.json",
            generate: || schema_for!(polquery_types::QueryReport),
        },
        SchemaSpec {
            filename: "polquery.config.v1.json",
            generate: || schema_for!(polquery_settings::PolqueryConfigV1),
        },
        SchemaSpec {
            filename: "polquery.snapshot.v1.json",
            generate: || schema_for!(polquery_snapshot::PolicySnapshotV1),
        },
    ]
}

/// Pretty JSON with a trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {dir}"))?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json).with_context(|| format!("write schema {path}"))?;
        println!("Wrote {path}");
    }
    Ok(())
}

/// Check that `schemas/` matches what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &missing {
        eprintln!("  missing: {name}");
    }
    for name in &mismatched {
        eprintln!("  out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("schema validation failed")
}

/// Run every fixture's queries and compare match names with `expected.matches.json`.
///
/// A fixture directory holds `policy.json` and optionally `polquery.toml` and
/// `expected.matches.json`. Without a config only the policy is loaded.
fn check_fixtures() -> anyhow::Result<()> {
    let root = fixtures_dir()?;
    let mut cases: Vec<Utf8PathBuf> = root
        .read_dir_utf8()
        .with_context(|| format!("read {root}"))?
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.is_dir())
        .collect();
    cases.sort();

    let mut failures = Vec::new();
    for case in &cases {
        if let Err(err) = check_fixture(case) {
            failures.push(format!("{}: {err:#}", case.file_name().unwrap_or(case.as_str())));
        } else {
            println!("ok {}", case.file_name().unwrap_or(case.as_str()));
        }
    }

    if failures.is_empty() {
        println!("\n{} fixtures checked.", cases.len());
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("  - {failure}");
        }
        bail!("{} of {} fixtures failed", failures.len(), cases.len())
    }
}

fn check_fixture(case: &Utf8Path) -> anyhow::Result<()> {
    let model = polquery_snapshot::load_policy_snapshot(&case.join("policy.json"))?;

    let config_path = case.join("polquery.toml");
    if !config_path.exists() {
        return Ok(());
    }
    let text = fs::read_to_string(&config_path).with_context(|| format!("read {config_path}"))?;
    let cfg = polquery_settings::parse_config_toml(&text).context("parse config")?;
    let resolved = polquery_settings::resolve_config(cfg, Overrides::default())?;
    let report = polquery_app::run_all(&model, &resolved)?;

    let expected_path = case.join("expected.matches.json");
    if !expected_path.exists() {
        return Ok(());
    }
    let expected: BTreeMap<String, Vec<String>> = serde_json::from_str(
        &fs::read_to_string(&expected_path).with_context(|| format!("read {expected_path}"))?,
    )
    .with_context(|| format!("parse {expected_path}"))?;

    let actual: BTreeMap<String, Vec<String>> = report
        .queries
        .iter()
        .map(|q| {
            let names = q.matches.iter().map(|m| m.name.clone()).collect();
            (q.name.clone(), names)
        })
        .collect();

    if actual != expected {
        bail!(
            "matches differ\n  expected: {}\n  actual:   {}",
            serde_json::to_string(&expected)?,
            serde_json::to_string(&actual)?
        );
    }
    Ok(())
}

/// Codes are lowercase snake-case tokens.
fn is_valid_token(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Every error code needs a well-formed name and a complete explanation.
fn explain_coverage() -> anyhow::Result<()> {
    let codes = polquery_types::explain::all_codes();
    let mut errors = Vec::new();

    for code in codes {
        if !is_valid_token(code) {
            errors.push(format!("code '{code}' is not a snake_case token"));
        }
        match polquery_types::explain::lookup_explanation(code) {
            Some(exp) => {
                for (field, value) in [
                    ("title", exp.title),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                ] {
                    if value.is_empty() {
                        errors.push(format!("code '{code}' has empty {field}"));
                    }
                }
            }
            None => errors.push(format!("code '{code}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("{} codes have explanations", codes.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("explain coverage failed with {} errors", errors.len())
    }
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check that schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  fixtures          Run tests/fixtures and compare against expected matches");
    eprintln!("  explain-coverage  Check that every error code has an explanation");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "fixtures" => check_fixtures(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
