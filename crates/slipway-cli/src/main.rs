//! slipway: the deployment executor's command-line tool.
//!
//! The executor normally runs embedded in a worker that receives commands
//! from the delivery platform's dispatch layer. This binary drives the
//! same code offline: `simulate` executes a command envelope against an
//! in-memory platform seeded from a JSON snapshot and prints the response
//! plus the platform call trace; `validate` checks an envelope without
//! executing anything.
//!
//! # Usage
//!
//! ```text
//! slipway simulate --command deploy.json --snapshot state.json
//! slipway validate --command deploy.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use slipway_core::{CommandEnvelope, SlipwayConfig};
use slipway_executor::{Executor, RecordingPluginRunner};
use slipway_platform::{InMemoryPlatform, PassthroughSecrets, PlatformSnapshot, TracingLogSink};

#[derive(Parser)]
#[command(name = "slipway", about = "Versioned-release deployment executor", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command envelope against an in-memory platform snapshot.
    Simulate {
        /// Path to the command envelope JSON.
        #[arg(short, long)]
        command: PathBuf,
        /// Path to a platform snapshot JSON (empty platform if omitted).
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Path to slipway.toml (built-in defaults if omitted).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check that an envelope's payload matches its declared kind.
    Validate {
        /// Path to the command envelope JSON.
        #[arg(short, long)]
        command: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slipway=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            command,
            snapshot,
            config,
        } => simulate(&command, snapshot.as_deref(), config.as_deref()).await,
        Commands::Validate { command } => validate(&command),
    }
}

async fn simulate(
    command: &std::path::Path,
    snapshot: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let envelope: CommandEnvelope = serde_json::from_str(&std::fs::read_to_string(command)?)?;

    let config = match config {
        Some(path) => SlipwayConfig::from_file(path)?,
        None => SlipwayConfig::default(),
    };

    let platform = match snapshot {
        Some(path) => {
            let snapshot: PlatformSnapshot =
                serde_json::from_str(&std::fs::read_to_string(path)?)?;
            InMemoryPlatform::from_snapshot(snapshot)
        }
        None => InMemoryPlatform::new(),
    };

    info!(kind = ?envelope.kind, "simulating command");
    let executor = Executor::new(
        platform,
        PassthroughSecrets,
        TracingLogSink,
        RecordingPluginRunner::new(),
        config,
    );
    let response = executor.execute(&envelope).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    let calls = executor.client().calls();
    if calls.is_empty() {
        println!("-- no platform calls issued");
    } else {
        println!("-- platform calls, in order:");
        for call in calls {
            println!("   {call}");
        }
    }
    Ok(())
}

fn validate(command: &std::path::Path) -> anyhow::Result<()> {
    let envelope: CommandEnvelope = serde_json::from_str(&std::fs::read_to_string(command)?)?;
    match envelope.decode() {
        Ok(decoded) => {
            println!("ok: {:?} payload is valid", decoded.kind());
            Ok(())
        }
        Err(e) => anyhow::bail!("invalid envelope: {e}"),
    }
}
