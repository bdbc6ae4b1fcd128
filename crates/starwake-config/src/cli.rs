//! Command-line argument parsing for Starwake.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, PhysicsMode};

/// Starwake command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "starwake", about = "Starwake simulation core")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Physics mode at startup.
    #[arg(long, value_enum)]
    pub physics_mode: Option<PhysicsMode>,

    /// Render distance in world units.
    #[arg(long)]
    pub render_distance: Option<f32>,

    /// Maximum live cluster instances.
    #[arg(long)]
    pub max_active: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(mode) = args.physics_mode {
            self.physics.mode = mode;
        }
        if let Some(rd) = args.render_distance {
            self.activation.render_distance = rd;
        }
        if let Some(max) = args.max_active {
            self.activation.max_active = max;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
