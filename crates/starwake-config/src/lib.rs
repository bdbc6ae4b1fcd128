//! Configuration system for Starwake.
//!
//! Every tunable of the simulation lives here and persists to disk as RON.
//! Supports CLI overrides via clap, hot-reload detection, validation at
//! startup, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ActivationConfig, AxisConfig, CameraConfig, Config, DebugConfig, DensityConfig, EffectsConfig,
    LodConfig, MotionConfig, PathConfig, PhysicsConfig, PhysicsMode, PoolConfig, QualityConfig,
    StarConfig, TemplateConfig, TrailConfig, WorldConfig,
};
pub use error::ConfigError;
