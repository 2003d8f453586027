//! Spindle runtime binary.
//!
//! Reads one JSON invocation spec, runs it against the configured object
//! store and writes the JSON response to stdout. Infrastructure failures are
//! written as `{"error": ..., "kind": ...}` and exit non-zero; the invoked
//! program's own failures only ever appear inside a normal response.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Serialize;
use spindle_core::RuntimeConfig;
use spindle_runtime::{
    FailureKind, RunOptions, RuntimeError, parse_spec, resolve_command, run_with,
};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Spindle - run one content-addressed invocation
#[derive(Parser, Debug)]
#[command(name = "spindle-runtime")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SPINDLE_CONFIG")]
    config: Option<PathBuf>,

    /// Invocation spec JSON file, or `-` for stdin
    #[arg(long, default_value = "-")]
    spec: String,

    /// Base command; the invocation's arguments are appended to it
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(Serialize)]
struct FailureReport {
    error: String,
    kind: FailureKind,
}

fn load_config(path: Option<&PathBuf>) -> Result<RuntimeConfig> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        tracing::info!(config_path = %path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    }

    let config: RuntimeConfig = figment
        .merge(Env::prefixed("SPINDLE_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    Ok(config.with_handler_from_env())
}

fn read_spec(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read invocation spec from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read invocation spec {source}"))
    }
}

/// Write the failure report to stdout and hand the error back for a
/// non-zero exit.
fn fail(error: anyhow::Error, kind: FailureKind) -> Result<()> {
    let report = FailureReport {
        error: format!("{error:#}"),
        kind,
    };
    println!("{}", serde_json::to_string(&report)?);
    Err(error)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the response, so logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Spindle runtime v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => return fail(e, FailureKind::Configuration),
    };
    let store = match spindle_storage::from_config(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            let e = RuntimeError::from(e);
            let kind = e.kind();
            return fail(anyhow::Error::new(e).context("failed to initialize object store"), kind);
        }
    };
    tracing::info!(address = %config.store.address, "Object store initialized");

    let base_cmd = resolve_command(config.handler(), &args.command);
    let spec = match read_spec(&args.spec).and_then(|raw| Ok(parse_spec(&raw)?)) {
        Ok(spec) => spec,
        Err(e) => return fail(e, FailureKind::InvalidRequest),
    };
    let options = RunOptions {
        scratch_dir: config.scratch_dir.clone(),
    };

    match run_with(&store, &base_cmd, &spec, &options).await {
        Ok(invocation) => {
            if let Some(code) = invocation.exit_code.filter(|code| *code != 0) {
                tracing::info!(exit_code = code, "invoked program exited with non-zero status");
            }
            println!("{}", serde_json::to_string(&invocation.response)?);
            Ok(())
        }
        Err(e) => {
            let kind = e.kind();
            fail(anyhow::Error::new(e).context("invocation failed"), kind)
        }
    }
}
