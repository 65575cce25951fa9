//! encrypt-util - parallel rotating-key block encryption over stdin/stdout

use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecu_core::crypto::KeyMaterial;
use ecu_core::pipeline::{run_pipeline, validate_params, EncryptParams, QueueProfile};
use ecu_core::telemetry::TelemetrySnapshot;
use ecu_core::types::StreamError;

/// Exit code for bad arguments, key files and I/O failures.
const EXIT_CONFIG: u8 = 1;
/// Exit code for pipeline invariant violations.
const EXIT_INVARIANT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "encrypt-util")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of encryptor threads (1-10) [default: min(cores, 10)]
    #[arg(short = 'n', long)]
    threads: Option<usize>,

    /// Key file; the whole file is the key (1-100 bytes)
    #[arg(short, long)]
    key: PathBuf,

    /// Block size override in bytes [default: key size * 8]
    #[arg(long)]
    block_size: Option<usize>,

    /// Capacity of both inter-stage queues
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Slots in the merger's reorder buffer
    #[arg(long)]
    reorder_capacity: Option<usize>,

    /// Print run telemetry as JSON on stderr
    #[arg(long)]
    stats: bool,

    /// Log the key bytes in hex
    #[arg(long)]
    debug_key: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(snapshot) => {
            if cli.stats {
                match snapshot.to_json() {
                    Ok(json) => eprintln!("{json}"),
                    Err(e) => error!("cannot serialize telemetry: {e}"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("encrypt-util: {e:#}");
            let fatal = e
                .downcast_ref::<StreamError>()
                .is_some_and(StreamError::is_fatal_invariant);
            ExitCode::from(if fatal { EXIT_INVARIANT } else { EXIT_CONFIG })
        }
    }
}

/// stdout carries the data, so every log line goes to stderr.
fn init_tracing(cli: &Cli) {
    let filter = match (cli.verbose, cli.debug_key) {
        (0, false) => "warn",
        (0, true) | (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<TelemetrySnapshot> {
    let key = KeyMaterial::from_file(&cli.key)
        .with_context(|| format!("loading key from {}", cli.key.display()))?;

    if cli.debug_key {
        info!("key ({} bytes): {}", key.len(), key.display_hex());
    }

    let config = validate_params(&key, &params(cli)).context("invalid pipeline configuration")?;

    let stdin = BufReader::new(io::stdin());
    let stdout = BufWriter::new(io::stdout());

    let snapshot = run_pipeline(stdin, stdout, Arc::new(config)).context("pipeline failed")?;
    Ok(snapshot)
}

/// Map the flags onto library overrides; unset flags keep the library defaults.
fn params(cli: &Cli) -> EncryptParams {
    let queues = if cli.queue_capacity.is_some() || cli.reorder_capacity.is_some() {
        let defaults = QueueProfile::default();
        Some(QueueProfile {
            dist_capacity: cli.queue_capacity.unwrap_or(defaults.dist_capacity),
            enc_capacity: cli.queue_capacity.unwrap_or(defaults.enc_capacity),
            reorder_capacity: cli.reorder_capacity.unwrap_or(defaults.reorder_capacity),
        })
    } else {
        None
    };

    EncryptParams { threads: cli.threads, block_size: cli.block_size, queues }
}
