use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use regscope_cluster::{ClusterClient, DiskCache, NoCache, OcCommand, SnapshotCache};

mod config;
mod pipeline;

use config::Config;
use pipeline::OutputFormat;

/// Regscope - image registry storage usage per OpenShift project
#[derive(Parser, Debug)]
#[command(name = "regscope")]
#[command(author, version, about)]
#[command(
    long_about = "Compute image storage usage for the integrated container registry of an \
                  OpenShift cluster. The current `oc` session is used."
)]
struct Args {
    /// Do not use cached OpenShift data
    #[arg(long)]
    refresh: bool,

    /// Registry address images must start with (discovered from the
    /// docker-registry service when not set)
    #[arg(long, value_name = "ADDR")]
    registry: Option<String>,

    /// Directory holding cached `oc` output
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Neither read nor write cached data
    #[arg(long, conflicts_with = "cache_dir")]
    no_cache: bool,

    /// Path to the oc binary
    #[arg(long, value_name = "PATH")]
    oc: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Config file (default: ~/.config/regscope/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    // Config file, then flags on top
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(args.registry, args.cache_dir, args.oc);

    // Snapshot cache backend
    let cache: Box<dyn SnapshotCache> = if args.no_cache {
        Box::new(NoCache)
    } else {
        let cache = DiskCache::new(config.cache_dir());
        debug!(dir = %cache.dir().display(), "using snapshot cache");
        Box::new(cache)
    };

    let client =
        ClusterClient::new(OcCommand::new(config.oc_binary()), cache).with_refresh(args.refresh);

    // Report goes to stdout, logs to stderr
    pipeline::run(&client, config.registry, args.output, io::stdout().lock()).await?;
    Ok(())
}
