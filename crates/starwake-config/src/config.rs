//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World seed.
    pub world: WorldConfig,
    /// Travel path generation.
    pub path: PathConfig,
    /// Star sizes, size categories and palette.
    pub stars: StarConfig,
    /// Cluster template generation.
    pub templates: TemplateConfig,
    /// Cluster streaming around the traveler.
    pub activation: ActivationConfig,
    /// Distance buckets and representation switching.
    pub lod: LodConfig,
    /// Fast frame-rate driven quality scalar.
    pub quality: QualityConfig,
    /// Slow frame-rate driven scaling of the bucket table.
    pub density: DensityConfig,
    /// Geometry/material pooling.
    pub pool: PoolConfig,
    /// Proximity physics.
    pub physics: PhysicsConfig,
    /// Heat and hit-mark effects.
    pub effects: EffectsConfig,
    /// Traveler motion.
    pub motion: MotionConfig,
    /// Orbit camera.
    pub camera: CameraConfig,
    /// Traveler trail.
    pub trail: TrailConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for path and template generation. Spawning uses a separate stream of the same seed.
    pub seed: u64,
}

/// Path generator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathConfig {
    /// Number of points in the polyline.
    pub point_count: usize,
    /// Starting velocity; only x and y are perturbed.
    pub initial_velocity: [f32; 3],
    /// Amplitude of the random lateral (x) force per step.
    pub lateral_force: f32,
    /// Amplitude of the random vertical (y) force per step.
    pub vertical_force: f32,
    /// Per-step velocity damping.
    pub damping: f32,
    /// Lateral velocity clamp.
    pub max_lateral_velocity: f32,
    /// Vertical velocity clamp.
    pub max_vertical_velocity: f32,
    /// Multiplier from velocity to lateral/vertical displacement.
    pub step_scale: f32,
    /// Constant forward (z) advance per step.
    pub forward_step: f32,
}

/// Star size and color settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarConfig {
    /// Smallest generated star size.
    pub min_size: f32,
    /// Upper bound (exclusive) of generated star sizes.
    pub max_size: f32,
    /// Exclusive upper bound of each size category (Small, Medium, Large, Giant).
    pub category_bounds: Vec<f32>,
    /// Mass of each size category.
    pub masses: Vec<f32>,
    /// Per-frame velocity damping of each size category.
    pub damping: Vec<f32>,
    /// Star colors as `0xRRGGBB`.
    pub palette: Vec<u32>,
}

/// Cluster template generation settings. Ranges are `[min, max)` unless noted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Number of templates generated at startup.
    pub template_count: usize,
    /// Cluster spread radius range.
    pub spread_radius: [f32; 2],
    /// Star count range.
    pub star_count: [u32; 2],
    /// Density core count range, inclusive on both ends.
    pub core_count: [u32; 2],
    /// Core offsets are `spread * core_offset_scale` wide per axis.
    pub core_offset_scale: f32,
    /// Core density weight range.
    pub core_density: [f32; 2],
    /// Core tightness range.
    pub core_tightness: [f32; 2],
    /// Base falloff exponent.
    pub falloff_base: f32,
    /// Falloff exponent added per unit of core tightness.
    pub falloff_tightness_scale: f32,
    /// Per-axis spread of stars around their core.
    pub axis_spread: [f32; 3],
}

/// Cluster streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActivationConfig {
    /// Clusters beyond this distance hold no draw resources.
    pub render_distance: f32,
    /// Eviction happens beyond `render_distance * cleanup_multiplier`.
    pub cleanup_multiplier: f32,
    /// Path indices ahead of the traveler eligible for spawning.
    pub look_ahead: usize,
    /// Path indices behind the traveler included in the sampling window.
    pub look_behind: usize,
    /// Spawn candidates sampled per frame.
    pub spawn_attempts: usize,
    /// Minimum distance between cluster centers.
    pub min_separation: f32,
    /// Hard cap on live cluster instances.
    pub max_active: usize,
    /// Minimum magnitude of the center offset from the path.
    pub offset_base: f32,
    /// Random extra magnitude of the center offset.
    pub offset_range: f32,
    /// Vertical offset relative to the lateral/forward offset.
    pub vertical_offset_scale: f32,
    /// Probability that a spawned cluster slowly rotates while drifting.
    pub rotation_chance: f32,
    /// Angular speed range in radians per frame.
    pub angular_speed: [f32; 2],
}

/// Level-of-detail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Strictly increasing bucket edges.
    pub bucket_distances: Vec<f32>,
    /// Star fraction per bucket; one more entry than `bucket_distances`.
    pub bucket_multipliers: Vec<f32>,
    /// Distance past a bucket edge a rendered cluster must travel before it
    /// is moved to the neighboring bucket.
    pub bucket_hysteresis: f32,
    /// Rendered star floor per cluster.
    pub min_rendered_stars: usize,
    /// Camera distance beyond which clusters render as sprites.
    pub sprite_distance: f32,
    /// Half-width of the mesh/sprite switching band.
    pub sprite_hysteresis: f32,
    /// Scale multiplier for sprite stars.
    pub sprite_scale: f32,
    /// Instances per instanced batch.
    pub batch_capacity: usize,
    /// Amplitude of the drift wobble.
    pub drift_amplitude: f32,
    /// Angular frequency of the drift wobble per frame.
    pub drift_frequency: f32,
}

/// Adaptive quality settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityConfig {
    /// Rolling window length in samples.
    pub window: usize,
    /// Average fps below which quality drops.
    pub low_fps: f32,
    /// Average fps above which quality recovers.
    pub high_fps: f32,
    /// Step down per update.
    pub decrement: f32,
    /// Step up per update.
    pub increment: f32,
    /// Lowest quality scalar.
    pub floor: f32,
    /// Highest quality scalar.
    pub ceiling: f32,
}

/// Smart density scaling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DensityConfig {
    /// Enable the slow bucket-table adjustment.
    pub enabled: bool,
    /// Frames between evaluations.
    pub interval_frames: u64,
    /// Rolling window length in samples.
    pub window: usize,
    /// Target frame rate.
    pub target_fps: f32,
    /// Scale down when the average is below `target_fps * lower_ratio`.
    pub lower_ratio: f32,
    /// Scale up when the average is above `target_fps * upper_ratio`.
    pub upper_ratio: f32,
    /// Factor applied when scaling down.
    pub scale_down: f32,
    /// Factor applied when scaling up.
    pub scale_up: f32,
    /// Floor of each multiplier relative to its baseline.
    pub floor_ratio: f32,
}

/// Render resource pooling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Free handles kept per key; excess releases are disposed.
    pub max_pooled_per_key: usize,
    /// Star sizes are quantized to this step to share geometry.
    pub size_quantum: f32,
}

/// Which bodies exert push forces.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum,
)]
pub enum PhysicsMode {
    /// Only the traveler pushes stars.
    #[default]
    Standard,
    /// Moving stars additionally push their neighbors.
    Chain,
}

impl PhysicsMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Standard => Self::Chain,
            Self::Chain => Self::Standard,
        }
    }
}

/// Proximity physics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Mode at startup.
    pub mode: PhysicsMode,
    /// Clusters simulated per frame, nearest first.
    pub max_clusters: usize,
    /// Clusters whose center is farther than this are not simulated.
    pub max_interaction_distance: f32,
    /// Radius of the traveler's force field.
    pub force_radius: f32,
    /// Base force at the traveler's center.
    pub force_scale: f32,
    /// Floor of `distance / force_radius`.
    pub min_normalized_distance: f32,
    /// Extra force per unit of traveler lateral/vertical speed.
    pub speed_gain: f32,
    /// Ceiling of any single mass-adjusted push.
    pub max_force: f32,
    /// Ceiling of star speed.
    pub max_velocity: f32,
    /// Spring constant toward the rest position.
    pub return_strength: f32,
    /// Squared displacement above which the spring acts.
    pub return_threshold_sq: f32,
    /// Squared speed below which a star inside the threshold snaps to rest.
    pub settle_velocity_sq: f32,
    /// Neighbor radius for chain pushes.
    pub chain_radius: f32,
    /// Pairs closer than this are ignored in chain mode.
    pub chain_min_distance: f32,
    /// Minimum pusher speed in chain mode.
    pub chain_velocity_threshold: f32,
    /// Scale of chain pushes.
    pub chain_force_scale: f32,
}

/// Cosmetic impact effects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    /// Heat added per unit of applied force.
    pub heat_gain: f32,
    /// Per-frame heat decay factor.
    pub heat_decay: f32,
    /// Maximum live hit marks.
    pub hit_mark_capacity: usize,
    /// Hit mark lifetime in frames.
    pub hit_mark_lifetime: u32,
    /// Hit mark scale at spawn.
    pub hit_mark_scale: f32,
}

/// One offset axis of the traveler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisConfig {
    /// Velocity gained per frame while the input is held.
    pub acceleration: f32,
    /// Additional acceleration fraction at `ramp_distance` offset.
    pub ramp_gain: f32,
    /// Offset at which the ramp reaches `1 + ramp_gain`.
    pub ramp_distance: f32,
    /// Velocity retained per frame while released.
    pub friction: f32,
    /// Pull toward the centerline per unit of offset.
    pub pullback: f32,
    /// Speed below which the pullback is boosted.
    pub low_speed_threshold: f32,
    /// Pullback multiplier at low speed.
    pub low_speed_pullback_boost: f32,
    /// Velocity ceiling.
    pub max_speed: f32,
    /// Offset limit; `None` leaves the axis unbounded.
    pub max_deviation: Option<f32>,
}

/// Traveler motion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Steady forward speed along the path.
    pub cruise_speed: f32,
    /// Smoothing when speeding up.
    pub accelerate_smoothing: f32,
    /// Smoothing when slowing down.
    pub decelerate_smoothing: f32,
    /// Acceleration and max-speed multiplier on the boost axis while boosting.
    pub boost_multiplier: f32,
    /// Left/right offset axis.
    pub lateral: AxisConfig,
    /// Up/down offset axis.
    pub vertical: AxisConfig,
    /// Forward boost offset axis.
    pub boost: AxisConfig,
}

/// Orbit camera settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial azimuth in radians.
    pub theta: f32,
    /// Initial polar angle in radians.
    pub phi: f32,
    /// Initial distance from the traveler.
    pub distance: f32,
    /// Closest zoom.
    pub min_distance: f32,
    /// Farthest zoom.
    pub max_distance: f32,
    /// Polar angle margin from the poles.
    pub phi_margin: f32,
    /// Radians per unit of orbit delta.
    pub orbit_sensitivity: f32,
    /// Distance per unit of zoom delta.
    pub zoom_sensitivity: f32,
}

/// Trail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
    /// Maximum trail points.
    pub capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames between periodic statistics log lines (0 disables).
    pub stats_interval_frames: u64,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            point_count: 500,
            initial_velocity: [0.0, 0.0, 1.0],
            lateral_force: 0.02,
            vertical_force: 0.015,
            damping: 0.95,
            max_lateral_velocity: 0.15,
            max_vertical_velocity: 0.1,
            step_scale: 15.0,
            forward_step: 15.0,
        }
    }
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            min_size: 0.05,
            max_size: 0.2,
            category_bounds: vec![0.08, 0.12, 0.16, 0.2],
            masses: vec![1.0, 1.6, 2.5, 4.0],
            damping: vec![0.95, 0.945, 0.94, 0.93],
            palette: vec![0xff00ff, 0x00ffff, 0xffff00, 0xff0088, 0x00ff88],
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            template_count: 20,
            spread_radius: [15.0, 60.0],
            star_count: [500, 1200],
            core_count: [3, 6],
            core_offset_scale: 0.7,
            core_density: [0.4, 1.0],
            core_tightness: [0.2, 0.5],
            falloff_base: 0.8,
            falloff_tightness_scale: 0.5,
            axis_spread: [0.8, 0.7, 0.8],
        }
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            render_distance: 100.0,
            cleanup_multiplier: 2.0,
            look_ahead: 10,
            look_behind: 3,
            spawn_attempts: 2,
            min_separation: 40.0,
            max_active: 12,
            offset_base: 10.0,
            offset_range: 25.0,
            vertical_offset_scale: 0.5,
            rotation_chance: 0.3,
            angular_speed: [0.0005, 0.002],
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            bucket_distances: vec![30.0, 60.0, 100.0, 150.0],
            bucket_multipliers: vec![1.0, 0.75, 0.5, 0.3, 0.15],
            bucket_hysteresis: 3.0,
            min_rendered_stars: 30,
            sprite_distance: 60.0,
            sprite_hysteresis: 5.0,
            sprite_scale: 2.0,
            batch_capacity: 1000,
            drift_amplitude: 0.15,
            drift_frequency: 0.02,
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            window: 30,
            low_fps: 30.0,
            high_fps: 50.0,
            decrement: 0.05,
            increment: 0.02,
            floor: 0.3,
            ceiling: 1.0,
        }
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_frames: 60,
            window: 120,
            target_fps: 60.0,
            lower_ratio: 0.8,
            upper_ratio: 1.2,
            scale_down: 0.9,
            scale_up: 1.05,
            floor_ratio: 0.1,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled_per_key: 256,
            size_quantum: 0.01,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mode: PhysicsMode::Standard,
            max_clusters: 4,
            max_interaction_distance: 120.0,
            force_radius: 8.0,
            force_scale: 0.3,
            min_normalized_distance: 0.05,
            speed_gain: 4.0,
            max_force: 0.6,
            max_velocity: 1.2,
            return_strength: 0.02,
            return_threshold_sq: 1e-4,
            settle_velocity_sq: 1e-6,
            chain_radius: 3.0,
            chain_min_distance: 0.1,
            chain_velocity_threshold: 0.05,
            chain_force_scale: 0.15,
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            heat_gain: 0.5,
            heat_decay: 0.95,
            hit_mark_capacity: 24,
            hit_mark_lifetime: 45,
            hit_mark_scale: 0.6,
        }
    }
}

impl AxisConfig {
    /// Lateral (left/right) defaults.
    pub fn lateral() -> Self {
        Self {
            acceleration: 0.01,
            ramp_gain: 0.5,
            ramp_distance: 6.0,
            friction: 0.9,
            pullback: 0.003,
            low_speed_threshold: 0.02,
            low_speed_pullback_boost: 2.0,
            max_speed: 0.3,
            max_deviation: Some(6.0),
        }
    }

    /// Vertical (up/down) defaults.
    pub fn vertical() -> Self {
        Self {
            max_deviation: Some(4.0),
            ramp_distance: 4.0,
            ..Self::lateral()
        }
    }

    /// Forward boost defaults.
    pub fn boost() -> Self {
        Self {
            acceleration: 0.02,
            ramp_gain: 0.3,
            ramp_distance: 10.0,
            friction: 0.92,
            pullback: 0.004,
            low_speed_threshold: 0.02,
            low_speed_pullback_boost: 2.0,
            max_speed: 0.4,
            max_deviation: None,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::lateral()
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 0.12,
            accelerate_smoothing: 0.02,
            decelerate_smoothing: 0.015,
            boost_multiplier: 3.0,
            lateral: AxisConfig::lateral(),
            vertical: AxisConfig::vertical(),
            boost: AxisConfig::boost(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            theta: -std::f32::consts::FRAC_PI_2,
            phi: std::f32::consts::FRAC_PI_4,
            distance: 18.0,
            min_distance: 5.0,
            max_distance: 40.0,
            phi_margin: 0.1,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.01,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval_frames: 120,
        }
    }
}

// --- Validation ---

fn check_range(field: &'static str, range: [f32; 2]) -> Result<(), ConfigError> {
    if !(range[0].is_finite() && range[1].is_finite()) || range[0] > range[1] {
        return Err(ConfigError::invalid(
            field,
            format!("range {:?} must be finite and ordered", range),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::invalid(field, format!("{value} must be > 0")));
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::invalid(field, format!("{value} must be in (0, 1]")));
    }
    Ok(())
}

impl Config {
    /// Check ranges and cross-field consistency.
    ///
    /// Size-category coverage is checked separately when the category table is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.point_count < 2 {
            return Err(ConfigError::invalid(
                "path.point_count",
                "a path needs at least two points",
            ));
        }
        check_positive("path.forward_step", self.path.forward_step)?;
        check_unit("path.damping", self.path.damping)?;

        if self.stars.palette.is_empty() {
            return Err(ConfigError::invalid("stars.palette", "palette is empty"));
        }
        check_range("stars.size", [self.stars.min_size, self.stars.max_size])?;

        let t = &self.templates;
        if t.template_count == 0 {
            return Err(ConfigError::invalid(
                "templates.template_count",
                "at least one template is required",
            ));
        }
        check_range("templates.spread_radius", t.spread_radius)?;
        check_range("templates.core_density", t.core_density)?;
        check_range("templates.core_tightness", t.core_tightness)?;
        if t.star_count[0] == 0 || t.star_count[0] > t.star_count[1] {
            return Err(ConfigError::invalid(
                "templates.star_count",
                format!("{:?} must be non-empty and ordered", t.star_count),
            ));
        }
        if t.core_count[0] == 0 || t.core_count[0] > t.core_count[1] {
            return Err(ConfigError::invalid(
                "templates.core_count",
                format!("{:?} must be non-empty and ordered", t.core_count),
            ));
        }
        if t.core_density[0] <= 0.0 {
            return Err(ConfigError::invalid(
                "templates.core_density",
                "density weights must be positive",
            ));
        }

        let a = &self.activation;
        check_positive("activation.render_distance", a.render_distance)?;
        if a.cleanup_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "activation.cleanup_multiplier",
                "eviction must not happen inside the render distance",
            ));
        }
        if a.max_active == 0 {
            return Err(ConfigError::invalid("activation.max_active", "must be > 0"));
        }
        if a.look_ahead == 0 {
            return Err(ConfigError::invalid(
                "activation.look_ahead",
                "spawning needs at least one index ahead",
            ));
        }
        check_range("activation.angular_speed", a.angular_speed)?;

        let lod = &self.lod;
        if lod.bucket_multipliers.len() != lod.bucket_distances.len() + 1 {
            return Err(ConfigError::invalid(
                "lod.bucket_multipliers",
                format!(
                    "expected {} multipliers for {} bucket edges, found {}",
                    lod.bucket_distances.len() + 1,
                    lod.bucket_distances.len(),
                    lod.bucket_multipliers.len()
                ),
            ));
        }
        if lod.bucket_distances.iter().any(|d| !d.is_finite()) {
            return Err(ConfigError::invalid(
                "lod.bucket_distances",
                "edges must be finite",
            ));
        }
        if lod.bucket_distances.windows(2).any(|w| w[1] <= w[0])
            || lod.bucket_distances.iter().any(|&d| d <= 0.0)
        {
            return Err(ConfigError::invalid(
                "lod.bucket_distances",
                "edges must be positive and strictly increasing",
            ));
        }
        if lod
            .bucket_multipliers
            .iter()
            .any(|&m| !m.is_finite() || !(m > 0.0 && m <= 1.0))
        {
            return Err(ConfigError::invalid(
                "lod.bucket_multipliers",
                "multipliers must be in (0, 1]",
            ));
        }
        if !(lod.bucket_hysteresis >= 0.0 && lod.bucket_hysteresis.is_finite()) {
            return Err(ConfigError::invalid(
                "lod.bucket_hysteresis",
                "must be finite and non-negative",
            ));
        }
        if lod.batch_capacity == 0 {
            return Err(ConfigError::invalid("lod.batch_capacity", "must be > 0"));
        }
        if lod.sprite_hysteresis < 0.0 || lod.sprite_hysteresis >= lod.sprite_distance {
            return Err(ConfigError::invalid(
                "lod.sprite_hysteresis",
                "band must be non-negative and narrower than the sprite distance",
            ));
        }

        let q = &self.quality;
        if q.window == 0 {
            return Err(ConfigError::invalid("quality.window", "must be > 0"));
        }
        check_unit("quality.floor", q.floor)?;
        check_unit("quality.ceiling", q.ceiling)?;
        if q.floor > q.ceiling || q.low_fps > q.high_fps {
            return Err(ConfigError::invalid(
                "quality",
                "floor/ceiling and low/high fps must be ordered",
            ));
        }

        let d = &self.density;
        if d.window == 0 || d.interval_frames == 0 {
            return Err(ConfigError::invalid(
                "density",
                "window and interval must be > 0",
            ));
        }
        check_unit("density.floor_ratio", d.floor_ratio)?;

        check_positive("pool.size_quantum", self.pool.size_quantum)?;

        let p = &self.physics;
        check_positive("physics.force_radius", p.force_radius)?;
        check_positive("physics.max_force", p.max_force)?;
        check_positive("physics.max_velocity", p.max_velocity)?;
        check_positive("physics.min_normalized_distance", p.min_normalized_distance)?;
        check_positive("physics.chain_radius", p.chain_radius)?;

        check_unit("effects.heat_decay", self.effects.heat_decay)?;
        if self.effects.hit_mark_capacity == 0 {
            return Err(ConfigError::invalid(
                "effects.hit_mark_capacity",
                "must be > 0",
            ));
        }

        for (field, axis) in [
            ("motion.lateral", &self.motion.lateral),
            ("motion.vertical", &self.motion.vertical),
            ("motion.boost", &self.motion.boost),
        ] {
            check_positive(field, axis.max_speed)?;
            check_positive(field, axis.ramp_distance)?;
            check_unit(field, axis.friction)?;
            if let Some(max) = axis.max_deviation {
                check_positive(field, max)?;
            }
        }
        if self.motion.boost_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "motion.boost_multiplier",
                "boost must not slow the traveler down",
            ));
        }

        let c = &self.camera;
        check_range("camera.distance", [c.min_distance, c.max_distance])?;

        if self.trail.capacity == 0 {
            return Err(ConfigError::invalid("trail.capacity", "must be > 0"));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
