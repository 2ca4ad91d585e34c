// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `wapictl` command line front end.
//!
//! ```bash
//! # Run an action with parameters from a file, stdin or flags
//! wapictl --config wapi.yaml run ip_lookup --param ip_address=192.168.1.100 --param status=ACTIVE
//! echo '{"fqdn": "rpz.local"}' | wapictl run get_response_policy_zone --params -
//!
//! # List actions and their required parameters
//! wapictl actions
//! ```
//!
//! The action result is printed to stdout as JSON. Logs go to stderr.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::{Map, Value};
use tracing::{debug, info};

use wapictl::actions::{ActionDispatcher, ActionKind};
use wapictl::config::Config;
use wapictl::constants::{ENV_LOG_FORMAT, ENV_WAPICTL_CONFIG};
use wapictl::wapi::client::WapiClient;

#[derive(Debug, Parser)]
#[command(name = "wapictl")]
#[command(version)]
#[command(about = "Run RPZ and IPAM actions against a grid WAPI server")]
struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(long, short, global = true, env = ENV_WAPICTL_CONFIG)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one action and print its result
    Run {
        /// Action id, e.g. ip_lookup
        action: String,

        /// JSON parameter file, or `-` for stdin
        #[arg(long, short)]
        params: Option<String>,

        /// Single parameter, applied after --params
        #[arg(long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,
    },

    /// List action ids and their required parameters
    Actions,

    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wapictl", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Actions => {
            print!("{}", describe_actions());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            action,
            params,
            param,
        } => {
            initialize_logging();

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("wapictl")
                .enable_all()
                .build()?;

            runtime.block_on(run_action(
                cli.config.as_deref(),
                &action,
                params.as_deref(),
                &param,
            ))
        }
    }
}

/// Initialize tracing on stderr.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .init();
        }
    }
}

async fn run_action(
    config_path: Option<&Path>,
    action: &str,
    params_source: Option<&str>,
    overrides: &[String],
) -> Result<ExitCode> {
    let config = Config::load(config_path).context("Failed to load WAPI configuration")?;
    info!(url = %config.url, action = %action, "Starting wapictl");

    let params = read_params(params_source, overrides)?;
    debug!(params = %params, "Action parameters");

    let client = WapiClient::new(&config)?;
    let dispatcher = ActionDispatcher::new(Arc::new(client));
    let result = dispatcher.dispatch(action, params).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Assemble action parameters from an optional JSON source plus `key=value` overrides.
fn read_params(source: Option<&str>, overrides: &[String]) -> Result<Value> {
    let text = match source {
        None => String::new(),
        Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read parameters from stdin")?;
            text
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file {path}"))?,
    };

    let mut params = parse_params(&text)?;
    for entry in overrides {
        let (key, value) = parse_param(entry)?;
        params.insert(key, value);
    }
    Ok(Value::Object(params))
}

/// Parse a JSON object of parameters. Blank text means no parameters.
fn parse_params(text: &str) -> Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text).context("Parameters are not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Parameters must be a JSON object, got {other}"),
    }
}

/// Split `key=value`. The value is passed as a string; actions coerce numbers and booleans.
fn parse_param(entry: &str) -> Result<(String, Value)> {
    let Some((key, value)) = entry.split_once('=') else {
        bail!("Invalid --param '{entry}', expected KEY=VALUE");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid --param '{entry}', the key is empty");
    }
    Ok((key.to_string(), Value::String(value.to_string())))
}

/// One line per action: id and required parameters.
fn describe_actions() -> String {
    ActionKind::ALL
        .iter()
        .map(|kind| {
            let required = kind.schema().required;
            if required.is_empty() {
                format!("{}\n", kind.as_str())
            } else {
                format!("{:<30} requires: {}\n", kind.as_str(), required.join(", "))
            }
        })
        .collect()
}
