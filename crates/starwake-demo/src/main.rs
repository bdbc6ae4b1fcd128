//! Headless Starwake run.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p starwake-demo -- --frames 3000 --seed 7` for a longer
//! flight, or pass `--script flight.ron` to replay a scripted input sequence.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use starwake_app::{FrameClock, Simulation};
use starwake_config::{CliArgs, Config};
use starwake_input::{InputScript, InputSnapshot};
use starwake_render::RecordingRenderer;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "starwake-demo", about = "Fly the Starwake traveler without a window")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Frames to simulate. Defaults to the script length, or 600.
    #[arg(long)]
    frames: Option<u64>,

    /// Simulated frame rate used for `dt`.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Measure `dt` from the wall clock instead of using `--fps`.
    #[arg(long)]
    realtime: bool,

    /// RON input script to replay.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = DemoArgs::parse();

    let config_dir = match args.cli.config.clone() {
        Some(dir) => dir,
        None => dirs::config_dir()
            .ok_or("failed to resolve config directory")?
            .join("starwake"),
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.cli);

    let log_dir = config_dir.join("logs");
    starwake_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let script = match &args.script {
        Some(path) => Some(InputScript::from_ron(&std::fs::read_to_string(path)?)?),
        None => None,
    };
    let frames = args
        .frames
        .or_else(|| script.as_ref().map(InputScript::total_frames))
        .unwrap_or(600);
    let fixed_dt = 1.0 / args.fps.max(1.0);

    let mut sim = Simulation::new(&config)?;
    let mut renderer = RecordingRenderer::new();
    let mut clock = FrameClock::new();
    let mut spawned = 0;
    let mut evicted = 0;
    let mut peak_stars = 0;

    info!(frames, seed = config.world.seed, mode = ?config.physics.mode, "starting flight");
    for frame in 0..frames {
        let input = script
            .as_ref()
            .map_or_else(InputSnapshot::idle, |s| s.snapshot_at(frame));
        let measured = clock.tick();
        let dt = if args.realtime { measured } else { fixed_dt };

        let output = sim.tick(dt, &input);
        output.commands.submit(&mut renderer);
        spawned += output.stats.spawned.len();
        evicted += output.stats.evicted.len();
        peak_stars = peak_stars.max(output.stats.rendered_stars);
    }

    sim.shutdown().submit(&mut renderer);
    if !renderer.violations().is_empty() {
        warn!(count = renderer.violations().len(), "renderer reported violations");
    }
    info!(
        frames,
        elapsed = clock.elapsed(),
        spawned,
        evicted,
        peak_stars,
        peak_drawables = renderer.peak_drawables(),
        leaked_drawables = renderer.live_drawables(),
        "flight finished"
    );
    Ok(())
}
