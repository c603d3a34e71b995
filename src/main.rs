use anyhow::{Context, Result};
use biolife_core::metrics::init_logging;
use biolife_core::render::NullSink;
use biolife_lib::app::{Runner, ShutdownManager};
use biolife_lib::model::config::AppConfig;
use biolife_lib::model::world::World;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path; defaults are used when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to run, 0 runs until Ctrl-C
    #[arg(short, long, default_value_t = 0)]
    ticks: u64,

    /// Seed override for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot to resume from
    #[arg(long)]
    load: Option<PathBuf>,

    /// Snapshot written on exit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Gzip the exit snapshot
    #[arg(long)]
    compress: bool,
}

fn load_config(path: &PathBuf) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path).with_context(|| format!("config {}", path.display()))
    } else {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    let mut world = World::new(config)?;
    if let Some(path) = &args.load {
        if let Err(e) = world.load(path) {
            tracing::error!("Could not resume from {}: {e:#}", path.display());
            return Err(e);
        }
    }

    let mut shutdown = ShutdownManager::new();
    shutdown.set_save_on_exit(args.save.clone(), args.compress);
    shutdown.listen_for_ctrl_c();

    let mut runner = Runner::new(world, shutdown);
    let result = runner.run(args.ticks, &mut NullSink).await;
    if let Err(e) = &result {
        tracing::error!("Simulation error: {e:#}");
        runner.shutdown.set_exit_code(1);
    }

    runner.shutdown.cleanup(&runner.world)?;
    if runner.shutdown.exit_code() != 0 {
        std::process::exit(runner.shutdown.exit_code());
    }
    Ok(())
}
