//! CLI entry point for polquery.
//!
//! Argument parsing, file IO, log initialisation and exit codes live here.
//! The query logic lives in `polquery-app` and `polquery-domain`.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use polquery_app::{
    ExplainOutput, RunInput, error_code, format_explanation, format_not_found, policy_meta,
    render_text, run_all, run_config, run_explain, serialize_report, write_report,
};
use polquery_settings::{Overrides, PolqueryConfigV1, QueryConfig};
use polquery_types::{PolicyMeta, QueryReport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "polquery.toml";

#[derive(Parser, Debug)]
#[command(
    name = "polquery",
    version,
    about = "Symbol queries over SELinux policy snapshots"
)]
struct Cli {
    /// Log debug events to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single query given on the command line.
    Search(SearchArgs),

    /// Run every query in a config file.
    Run {
        /// Path to the policy snapshot (JSON).
        #[arg(long)]
        policy: Utf8PathBuf,

        /// Path to the query file. `polquery.toml` is used if present.
        #[arg(long)]
        config: Option<Utf8PathBuf>,

        /// Override profile (types|attributes|all).
        #[arg(long)]
        profile: Option<String>,

        /// Print the JSON report instead of text.
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(long)]
        out: Option<Utf8PathBuf>,
    },

    /// Show which capabilities the loaded policy has.
    Caps {
        /// Path to the policy snapshot (JSON).
        #[arg(long)]
        policy: Utf8PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Explain an error code.
    Explain {
        /// The code (e.g. "binary_policy").
        code: String,
    },
}

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["types", "roles", "classes"])
))]
struct SearchArgs {
    /// Path to the policy snapshot (JSON).
    #[arg(long)]
    policy: Utf8PathBuf,

    /// Search types and attributes by name.
    #[arg(long, value_name = "PATTERN")]
    types: Option<String>,

    /// Search roles by name.
    #[arg(long, value_name = "PATTERN")]
    roles: Option<String>,

    /// Look up object classes by exact name.
    #[arg(long, value_delimiter = ',', value_name = "CLASS,...")]
    classes: Option<Vec<String>>,

    /// Treat the pattern as a regular expression.
    #[arg(long)]
    regex: bool,

    /// Expand matches through attribute membership.
    #[arg(long)]
    indirect: bool,

    /// Search the syntactic (source) type table.
    #[arg(long, requires = "types")]
    syntactic: bool,

    /// Symbol kinds to report for type searches.
    #[arg(long, value_delimiter = ',', value_name = "KIND,...")]
    symbols: Option<Vec<String>>,

    /// Print the JSON report instead of text.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Commands::Search(args) => cmd_search(args),
        Commands::Run {
            policy,
            config,
            profile,
            json,
            out,
        } => cmd_run(&policy, config.as_deref(), profile, json, out.as_deref()),
        Commands::Caps { policy, json } => cmd_caps(&policy, json),
        Commands::Explain { code } => cmd_explain(&code),
    };

    if let Err(err) = result {
        eprintln!("polquery error [{}]: {err:#}", error_code(&err));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_search(args: SearchArgs) -> anyhow::Result<()> {
    let (target, pattern) = if let Some(pattern) = args.types {
        let target = if args.syntactic {
            "syntactic-type"
        } else {
            "type"
        };
        (target, Some(pattern))
    } else if let Some(pattern) = args.roles {
        ("role", Some(pattern))
    } else {
        ("class", None)
    };

    let mut cfg = PolqueryConfigV1::default();
    cfg.queries.insert(
        "search".to_string(),
        QueryConfig {
            target: Some(target.to_string()),
            pattern,
            regex: Some(args.regex),
            indirect: Some(args.indirect),
            symbols: args.symbols,
            classes: args.classes.unwrap_or_default(),
        },
    );
    let resolved = polquery_settings::resolve_config(cfg, Overrides::default())
        .context("invalid search")?;

    let model = polquery_snapshot::load_policy_snapshot(&args.policy).context("load policy")?;
    let report = run_all(&model, &resolved)?;
    print_report(&report, args.json)
}

fn cmd_run(
    policy: &Utf8Path,
    config: Option<&Utf8Path>,
    profile: Option<String>,
    json: bool,
    out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let config_text = read_config(config)?;
    let output = run_config(RunInput {
        policy_path: policy,
        config_text: &config_text,
        overrides: Overrides {
            profile,
            ..Overrides::default()
        },
    })?;

    if let Some(path) = out {
        write_report(path, &output.report)?;
        debug!(path = %path, "report written");
    }
    print_report(&output.report, json)
}

/// An explicit `--config` must exist; the default file is optional.
fn read_config(config: Option<&Utf8Path>) -> anyhow::Result<String> {
    match config {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read config {path}"))
        }
        None => {
            let path = Utf8Path::new(DEFAULT_CONFIG);
            if path.exists() {
                std::fs::read_to_string(path).with_context(|| format!("read config {path}"))
            } else {
                debug!("no {DEFAULT_CONFIG} found; running without queries");
                Ok(String::new())
            }
        }
    }
}

fn cmd_caps(policy: &Utf8Path, json: bool) -> anyhow::Result<()> {
    let model = polquery_snapshot::load_policy_snapshot(policy).context("load policy")?;
    let meta = policy_meta(&model);
    if json {
        let text = serde_json::to_string_pretty(&meta).context("serialize capabilities")?;
        println!("{text}");
    } else {
        print!("{}", render_caps(&meta));
    }
    Ok(())
}

fn render_caps(meta: &PolicyMeta) -> String {
    let mut out = format!("policy: {} (version {})\n", meta.form, meta.version);
    for entry in &meta.capabilities {
        let mark = if entry.available { "yes" } else { "no" };
        out.push_str(&format!("  {:<16} {mark}\n", entry.capability.as_str()));
    }
    out
}

fn print_report(report: &QueryReport, json: bool) -> anyhow::Result<()> {
    if json {
        print!("{}", serialize_report(report)?);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

fn cmd_explain(code: &str) -> anyhow::Result<()> {
    match run_explain(code) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_codes,
        } => {
            eprint!("{}", format_not_found(&identifier, available_codes));
            std::process::exit(1);
        }
    }
}
