use glam::Vec3;
use starwake_clusters::{ClusterId, PresentReport};
use starwake_config::PhysicsMode;
use starwake_render::PoolStats;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub fps: f32,
    /// Adaptive quality scalar used for this frame's render decisions.
    pub quality: f32,
    pub physics_mode: PhysicsMode,
    pub traveler: Vec3,
    pub active_clusters: usize,
    pub rendered_clusters: usize,
    pub rendered_stars: usize,
    pub spawned: Vec<ClusterId>,
    pub evicted: Vec<ClusterId>,
    pub present: PresentReport,
    pub simulated_clusters: usize,
    pub hits: usize,
    pub heat: f32,
    pub hit_marks: usize,
    pub pool: PoolStats,
}
