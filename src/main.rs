use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use soh_config::DeploymentConfig;
use soh_doctor::duration::parse_duration;
use soh_doctor::{run_cycle, DeploymentStats, FileSource, SnapshotSource, StreamSource};
use soh_rollup::RollupPipeline;

#[derive(Parser, Debug)]
#[command(name = "soh-doctor", version)]
#[command(about = "Check station state-of-health rollup deployments and roll up snapshot batches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a deployment, then print its statistics
    Check {
        /// Deployment configuration file (TOML, JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Also print the resolved group definitions as JSON
        #[arg(long)]
        print_json: bool,
    },

    /// Roll up one batch of station snapshots
    Rollup {
        /// Deployment configuration file (TOML, JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Batch file: a JSON array of snapshots or one snapshot per line
        #[arg(short, long, required_unless_present = "connect", conflicts_with = "connect")]
        batch: Option<PathBuf>,

        /// Read newline-delimited snapshots from a TCP endpoint (host:port)
        #[arg(long)]
        connect: Option<String>,

        /// Close the batch after this long (e.g. "30s", "500ms")
        #[arg(long)]
        cycle_timeout: Option<String>,

        /// Export the rollup report to a JSON file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check { config, print_json } => check(&config, print_json),
        Command::Rollup {
            config,
            batch,
            connect,
            cycle_timeout,
            export,
        } => {
            let cycle_timeout = cycle_timeout
                .as_deref()
                .map(parse_duration)
                .transpose()
                .context("Invalid --cycle-timeout")?;
            rollup(&config, batch, connect, cycle_timeout, export.as_deref())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` and defaulting to `info`.
fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_pipeline(config_path: &Path) -> Result<RollupPipeline> {
    let deployment = DeploymentConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let definitions = deployment.group_definitions()?;
    Ok(RollupPipeline::new(definitions)?)
}

fn check(config_path: &Path, print_json: bool) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;
    let stats = DeploymentStats::from_definitions(pipeline.definitions());

    println!("{}: OK", config_path.display());
    println!("{}", stats);

    if print_json {
        println!("{}", serde_json::to_string_pretty(pipeline.definitions())?);
    }
    Ok(())
}

fn rollup(
    config_path: &Path,
    batch: Option<PathBuf>,
    connect: Option<String>,
    cycle_timeout: Option<Duration>,
    export: Option<&Path>,
) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;

    // Build a tokio runtime for the stream source and the pipeline
    let rt = tokio::runtime::Runtime::new()?;

    let report = rt.block_on(async {
        let source: Box<dyn SnapshotSource> = match (batch, connect) {
            (Some(path), _) => Box::new(FileSource::new(path)),
            (None, Some(addr)) => {
                let stream = tokio::net::TcpStream::connect(&addr)
                    .await
                    .with_context(|| format!("Failed to connect to {}", addr))?;
                Box::new(StreamSource::spawn(stream, &addr))
            }
            (None, None) => anyhow::bail!("Either --batch or --connect is required"),
        };

        let report = run_cycle(&pipeline, source, cycle_timeout).await?;
        Ok::<_, anyhow::Error>(report)
    })?;

    println!("{}", report);

    if let Some(path) = export {
        report.export(path)?;
        println!("Exported rollup report to: {}", path.display());
    }
    Ok(())
}
