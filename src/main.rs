//! Headless particle-life runner.
//!
//! Drives a [`SimulationController`] at the configured tick rate and logs
//! throughput, population and type count.
//!
//! Run with: `cargo run --release -- --ticks 600`
//! (`RUST_LOG=debug` shows spawns, `--features gpu -- --gpu` uses the GPU kernel)

use clap::Parser;
use plife::{CpuKernel, PhysicsKernel, SimConfig, SimulationController};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "plife", about = "Run a particle-life simulation headless")]
struct Args {
    /// JSON config file; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (0 = until interrupted)
    #[arg(short, long, default_value_t = 0)]
    ticks: u64,

    /// Target ticks per second (0 = unpaced); overrides the config
    #[arg(short, long)]
    rate: Option<u32>,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Use the GPU kernel
    #[cfg(feature = "gpu")]
    #[arg(long)]
    gpu: bool,

    /// Seconds between stats lines
    #[arg(long, default_value_t = 2.0)]
    stats_every: f32,

    /// Write the effective config to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plife=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> plife::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(rate) = args.rate {
        config.target_rate = rate;
    }

    if let Some(path) = &args.dump_config {
        config.validate()?;
        config.save(path)?;
        tracing::info!("wrote config to {}", path.display());
        return Ok(());
    }

    let kernel = select_kernel(&args, &config)?;
    let mut sim = match args.seed {
        Some(seed) => SimulationController::with_seed(config, kernel, seed)?,
        None => SimulationController::new(config, kernel)?,
    };

    tracing::info!(
        kernel = sim.kernel_name(),
        type_count = sim.type_count(),
        rate = sim.target_rate(),
        "starting simulation"
    );

    let mut time = plife::time::Time::new();
    let mut last_stats = 0.0;
    let mut overruns = 0u64;

    while args.ticks == 0 || sim.ticks() < args.ticks {
        let now = time.update();
        sim.tick(now)?;

        if now - last_stats >= args.stats_every {
            last_stats = now;
            tracing::info!(
                fps = (time.fps() * 10.0).round() / 10.0,
                particles = sim.count(),
                types = sim.type_count(),
                "stats"
            );
            if overruns > 0 {
                tracing::warn!(overruns, rate = sim.target_rate(), "ticks overran the target rate");
                overruns = 0;
            }
        }

        match time.remaining(sim.target_rate()) {
            Some(rest) => std::thread::sleep(rest),
            None if sim.target_rate() > 0 => overruns += 1,
            None => {}
        }
    }

    let histogram = sim.state().type_histogram(sim.type_count() as usize);
    tracing::info!(ticks = sim.ticks(), particles = sim.count(), ?histogram, "done");
    Ok(())
}

#[cfg(feature = "gpu")]
fn select_kernel(args: &Args, config: &SimConfig) -> plife::Result<Box<dyn PhysicsKernel>> {
    if args.gpu {
        return Ok(Box::new(plife::GpuKernel::new()?));
    }
    Ok(Box::new(CpuKernel::new(config.chunk_size)))
}

#[cfg(not(feature = "gpu"))]
fn select_kernel(_args: &Args, config: &SimConfig) -> plife::Result<Box<dyn PhysicsKernel>> {
    Ok(Box::new(CpuKernel::new(config.chunk_size)))
}
