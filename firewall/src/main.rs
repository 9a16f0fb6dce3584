//! aiOS firewall reconciler — command-line entry point
//!
//! Usage: `aios-firewall [--config <path>] [key=value ...]`
//!
//! Without `key=value` arguments the parameters are read from stdin as a
//! JSON object. The result is printed to stdout as JSON; logs go to stderr.
//!
//! Exit codes: 0 success, 1 failed result, 2 unrecoverable error (bad
//! input or config, launch failure, cancellation).

use anyhow::{bail, Context, Result};
use std::io::{IsTerminal, Read};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use aios_firewall::config::{self, FirewallConfig, LogFormat};
use aios_firewall::{FirewallCmd, Params, ReconciliationResult, Reconciler};

const EXIT_FAILED: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Debug, PartialEq)]
struct Args {
    config_path: Option<String>,
    pairs: Vec<String>,
}

fn parse_args<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = Args {
        config_path: None,
        pairs: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config requires a path")?;
                parsed.config_path = Some(path);
            }
            other if other.starts_with("--") => bail!("Unknown option: {other}"),
            _ => parsed.pairs.push(arg),
        }
    }

    Ok(parsed)
}

fn init_tracing(config: &FirewallConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_level(true);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn read_params(pairs: &[String], stdin: impl Read) -> Result<Params> {
    if !pairs.is_empty() {
        return Params::from_pairs(pairs).context("Invalid parameters");
    }

    let mut input = Vec::new();
    let mut stdin = stdin;
    stdin
        .read_to_end(&mut input)
        .context("Failed to read parameters from stdin")?;
    Params::from_json(&input).context("Invalid parameters")
}

async fn run() -> Result<ReconciliationResult> {
    let args = parse_args(std::env::args().skip(1))?;
    let (config, source) = config::load_config(args.config_path.as_deref())?;
    init_tracing(&config);
    source.log();

    let params = read_params(&args.pairs, std::io::stdin())?;

    let invocation_id = Uuid::new_v4();
    info!(
        "Reconciling {invocation_id} via {}",
        config.firewall.executable
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let runner = Arc::new(FirewallCmd::new(config.firewall.executable.clone()));
    let reconciler = Reconciler::new(runner).with_query_failure(config.firewall.query_failure);

    let result = reconciler
        .run(&params, &cancel)
        .await
        .with_context(|| format!("Reconciliation {invocation_id} aborted"))?;

    info!(
        "Reconciliation {invocation_id} finished: success={} changed={}",
        result.success, result.changed
    );

    Ok(result)
}

#[tokio::main]
async fn main() -> ExitCode {
    let result = match run().await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match serde_json::to_string(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: Failed to serialize result: {e}");
            return ExitCode::from(EXIT_FATAL);
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
