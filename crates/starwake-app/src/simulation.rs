//! The per-frame driver.

use glam::{Quat, Vec3};
use starwake_clusters::{ActivationManager, ClusterInstance, ClusterPresenter};
use starwake_config::{Config, PhysicsMode};
use starwake_input::InputSnapshot;
use starwake_lod::{AdaptiveQuality, DensityScaler, DriftClock};
use starwake_path::{SPAWN_STREAM, SeededRandom, TravelPath, WORLD_STREAM};
use starwake_physics::{ImpactEffects, PhysicsEngine};
use starwake_player::{OrbitCamera, Trail, Traveler};
use starwake_render::{
    ColorKey, MeshSlot, PoolStats, RenderCommandList, RenderContext, RenderPool,
};
use starwake_space::{ClusterTemplateFactory, SizeCategoryTable};
use tracing::{debug, info};

use crate::error::SimulationError;
use crate::stats::FrameStats;

/// Floor for `dt` when converting it to a frame rate.
const MIN_FRAME_TIME: f32 = 1e-4;

const TRAVELER_SIZE: f32 = 0.3;
const TRAVELER_COLOR: ColorKey = ColorKey(0xffffff);
const HIT_MARK_SIZE: f32 = 0.15;
const HIT_MARK_COLOR: ColorKey = ColorKey(0xff8844);

/// Render work and statistics for one tick.
#[derive(Debug)]
pub struct FrameOutput {
    pub commands: RenderCommandList,
    pub stats: FrameStats,
}

/// Owns the world and advances it one frame at a time.
pub struct Simulation {
    config: Config,
    path: TravelPath,
    traveler: Traveler,
    camera: OrbitCamera,
    trail: Trail,
    activation: ActivationManager,
    presenter: ClusterPresenter,
    physics: PhysicsEngine,
    effects: ImpactEffects,
    quality: AdaptiveQuality,
    density: DensityScaler,
    drift: DriftClock,
    ctx: RenderContext,
    traveler_slot: Option<MeshSlot>,
    hit_mark_slots: Vec<MeshSlot>,
    visible_marks: usize,
    frame: u64,
}

impl Simulation {
    /// Validate `config`, generate the path and template pool, and create the
    /// traveler and hit-mark drawables.
    pub fn new(config: &Config) -> Result<Self, SimulationError> {
        config.validate()?;
        let sizes = SizeCategoryTable::from_config(&config.stars)?;

        let seed = config.world.seed;
        let mut world = SeededRandom::with_stream(seed, WORLD_STREAM);
        let path = TravelPath::generate(&config.path, &mut world);
        let templates =
            ClusterTemplateFactory::new(&config.templates, &config.stars, &sizes).build_pool(&mut world);
        info!(
            seed,
            path_points = path.len(),
            path_length = path.total_length(),
            templates = templates.len(),
            "world generated"
        );

        let traveler = Traveler::new(&config.motion, &path);
        let start = traveler.position();
        let activation = ActivationManager::new(
            config.activation.clone(),
            templates,
            sizes,
            SeededRandom::with_stream(seed, SPAWN_STREAM),
        );
        let presenter = ClusterPresenter::new(&config.lod, config.activation.render_distance);

        let mut ctx = RenderContext::new(RenderPool::new(
            config.pool.max_pooled_per_key,
            config.pool.size_quantum,
        ));
        let traveler_slot = ctx.add_mesh(TRAVELER_SIZE, TRAVELER_COLOR, start, 1.0);
        let hit_mark_slots = (0..config.effects.hit_mark_capacity)
            .map(|_| ctx.add_mesh(HIT_MARK_SIZE, HIT_MARK_COLOR, start, 0.0))
            .collect();

        Ok(Self {
            config: config.clone(),
            camera: OrbitCamera::new(&config.camera),
            trail: Trail::new(config.trail.capacity),
            physics: PhysicsEngine::new(config.physics.clone()),
            effects: ImpactEffects::new(config.effects.clone()),
            quality: AdaptiveQuality::new(config.quality.clone()),
            density: DensityScaler::new(config.density.clone()),
            drift: DriftClock::new(config.lod.drift_frequency),
            path,
            traveler,
            activation,
            presenter,
            ctx,
            traveler_slot: Some(traveler_slot),
            hit_mark_slots,
            visible_marks: 0,
            frame: 0,
        })
    }

    /// Advance one frame. `dt` is the time since the previous frame in seconds.
    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> FrameOutput {
        self.frame += 1;
        let fps = 1.0 / dt.max(MIN_FRAME_TIME);
        self.quality.update(fps);
        self.density
            .update(fps, self.presenter.selector_mut().buckets_mut());
        let quality = self.quality.scalar();

        if input.toggle_physics_mode {
            self.physics.toggle_mode();
        }

        let position = self.traveler.update(input, &self.path);
        self.camera.apply_input(input.orbit_delta, input.zoom_delta);
        let eye = self.camera.eye(position);

        let activation =
            self.activation
                .update(&self.path, position, &self.presenter, &mut self.ctx);

        let clusters = self.activation.clusters_mut();
        let present = self
            .presenter
            .update(clusters, &mut self.ctx, position, eye, quality);

        let selected = self.physics.select_clusters(clusters, position);
        for &index in &selected {
            self.presenter.restore_display(&mut clusters[index]);
        }
        let physics = self
            .physics
            .step(clusters, position, self.traveler.sideways_speed());
        self.drift.advance();
        for (index, cluster) in clusters.iter_mut().enumerate() {
            if physics.simulated.contains(&index) {
                self.presenter.sync_dirty(cluster, &mut self.ctx);
            } else {
                self.presenter.apply_drift(cluster, &mut self.ctx, &self.drift);
            }
        }
        self.effects.update(&physics);

        if let Some(slot) = self.traveler_slot {
            self.ctx
                .set_transform(slot.drawable, position, Quat::IDENTITY, 1.0);
        }
        self.show_hit_marks();
        self.ctx.set_camera(eye, position);
        self.trail.push(position);
        self.ctx.set_trail(self.trail.vertices());

        let clusters = self.activation.clusters();
        let stats = FrameStats {
            frame: self.frame,
            fps,
            quality,
            physics_mode: self.physics.mode(),
            traveler: position,
            active_clusters: clusters.len(),
            rendered_clusters: clusters.iter().filter(|c| c.is_rendered()).count(),
            rendered_stars: clusters.iter().map(|c| c.rendered_count).sum(),
            spawned: activation.spawned,
            evicted: activation.evicted,
            present,
            simulated_clusters: physics.simulated.len(),
            hits: physics.hit_count,
            heat: self.effects.heat(),
            hit_marks: self.effects.mark_count(),
            pool: self.ctx.pool_stats(),
        };
        self.log_stats(&stats);

        FrameOutput {
            commands: self.ctx.take_commands(),
            stats,
        }
    }

    fn show_hit_marks(&mut self) {
        let lifetime = self.effects.config().hit_mark_lifetime;
        let scale = self.effects.config().hit_mark_scale;
        let mut shown = 0;
        for (slot, mark) in self.hit_mark_slots.iter().zip(self.effects.marks()) {
            self.ctx.set_transform(
                slot.drawable,
                mark.position,
                Quat::IDENTITY,
                scale * mark.remaining(lifetime),
            );
            shown += 1;
        }
        for slot in self.hit_mark_slots.iter().take(self.visible_marks).skip(shown) {
            self.ctx
                .set_transform(slot.drawable, Vec3::ZERO, Quat::IDENTITY, 0.0);
        }
        self.visible_marks = shown;
    }

    fn log_stats(&self, stats: &FrameStats) {
        if !stats.spawned.is_empty() || !stats.evicted.is_empty() {
            debug!(
                frame = stats.frame,
                spawned = stats.spawned.len(),
                evicted = stats.evicted.len(),
                active = stats.active_clusters,
                "active set changed"
            );
        }
        let interval = self.config.debug.stats_interval_frames;
        if interval > 0 && stats.frame % interval == 0 {
            info!(
                frame = stats.frame,
                fps = stats.fps,
                quality = stats.quality,
                active = stats.active_clusters,
                rendered = stats.rendered_clusters,
                stars = stats.rendered_stars,
                heat = stats.heat,
                mode = ?stats.physics_mode,
                "frame stats"
            );
        }
    }

    /// Evict every cluster, remove the traveler and hit marks, and dispose all
    /// pooled resources. Returns the commands that tear the scene down.
    pub fn shutdown(&mut self) -> RenderCommandList {
        let evicted = self.activation.clear(&self.presenter, &mut self.ctx);
        if let Some(slot) = self.traveler_slot.take() {
            self.ctx.remove_mesh(slot);
        }
        for slot in self.hit_mark_slots.drain(..) {
            self.ctx.remove_mesh(slot);
        }
        self.visible_marks = 0;
        self.ctx.clear_pool();
        info!(evicted = evicted.len(), frames = self.frame, "simulation shut down");
        self.ctx.take_commands()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn path(&self) -> &TravelPath {
        &self.path
    }

    pub fn traveler(&self) -> &Traveler {
        &self.traveler
    }

    /// Direct access for hosts that drive forward speed themselves.
    pub fn traveler_mut(&mut self) -> &mut Traveler {
        &mut self.traveler
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn clusters(&self) -> &[ClusterInstance] {
        self.activation.clusters()
    }

    /// Distance beyond which clusters are evicted.
    pub fn cleanup_distance(&self) -> f32 {
        self.activation.cleanup_distance()
    }

    pub fn physics_mode(&self) -> PhysicsMode {
        self.physics.mode()
    }

    pub fn quality(&self) -> f32 {
        self.quality.scalar()
    }

    pub fn effects(&self) -> &ImpactEffects {
        &self.effects
    }

    pub fn live_drawables(&self) -> usize {
        self.ctx.live_drawables()
    }

    /// Pool counters as of the last command recorded.
    pub fn pool_stats(&self) -> PoolStats {
        self.ctx.pool_stats()
    }
}
