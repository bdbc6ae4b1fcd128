//! Mass-weighted push, chain propagation, damping and spring return.

use glam::Vec3;
use starwake_clusters::{ClusterInstance, StarState};
use starwake_config::{PhysicsConfig, PhysicsMode};

/// Directions shorter than this are skipped.
const DIRECTION_EPSILON: f32 = 1e-5;

/// A single push from the traveler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: Vec3,
    pub force: f32,
}

/// Summary of one physics step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsFrame {
    /// Indices of the simulated clusters, nearest first.
    pub simulated: Vec<usize>,
    /// Stars pushed by the traveler.
    pub hit_count: usize,
    /// Sum of applied traveler forces.
    pub total_force: f32,
    pub strongest: Option<Hit>,
    /// Stars pushed by neighbors in chain mode.
    pub chain_pushes: usize,
    /// Stars whose position changed.
    pub moved: usize,
}

/// Steps the stars of the clusters nearest the traveler.
#[derive(Debug)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
    mode: PhysicsMode,
    chain_scratch: Vec<Vec3>,
    nearest_scratch: Vec<(f32, usize)>,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            mode: config.mode,
            config,
            chain_scratch: Vec::new(),
            nearest_scratch: Vec::new(),
        }
    }

    pub fn mode(&self) -> PhysicsMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PhysicsMode) {
        self.mode = mode;
    }

    /// Switch between standard and chain mode; returns the new mode.
    pub fn toggle_mode(&mut self) -> PhysicsMode {
        self.mode = self.mode.toggled();
        tracing::info!(mode = ?self.mode, "physics mode toggled");
        self.mode
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Rendered clusters within `max_interaction_distance`, nearest first,
    /// at most `max_clusters`.
    pub fn select_clusters(&mut self, clusters: &[ClusterInstance], traveler: Vec3) -> Vec<usize> {
        self.nearest_scratch.clear();
        self.nearest_scratch.extend(
            clusters
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_rendered())
                .map(|(i, c)| (c.distance_to(traveler), i))
                .filter(|(d, _)| *d <= self.config.max_interaction_distance),
        );
        self.nearest_scratch.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.nearest_scratch
            .iter()
            .take(self.config.max_clusters)
            .map(|&(_, i)| i)
            .collect()
    }

    /// Step the selected clusters.
    ///
    /// `traveler_speed` is the traveler's lateral/vertical speed; faster
    /// sideways motion hits harder.
    pub fn step(
        &mut self,
        clusters: &mut [ClusterInstance],
        traveler: Vec3,
        traveler_speed: f32,
    ) -> PhysicsFrame {
        let mut frame = PhysicsFrame {
            simulated: self.select_clusters(clusters, traveler),
            ..Default::default()
        };
        let speed_multiplier = 1.0 + self.config.speed_gain * traveler_speed.max(0.0);

        for i in 0..frame.simulated.len() {
            let index = frame.simulated[i];
            let stars = clusters[index].rendered_stars_mut();
            self.push_from_traveler(stars, traveler, speed_multiplier, &mut frame);
            if self.mode == PhysicsMode::Chain {
                self.push_neighbors(stars, &mut frame);
            }
            self.integrate(stars, traveler, &mut frame);
        }
        frame
    }

    fn push_from_traveler(
        &self,
        stars: &mut [StarState],
        traveler: Vec3,
        speed_multiplier: f32,
        frame: &mut PhysicsFrame,
    ) {
        let c = &self.config;
        let radius_sq = c.force_radius * c.force_radius;
        for star in stars.iter_mut() {
            let delta = star.position - traveler;
            let dist_sq = delta.length_squared();
            if dist_sq >= radius_sq {
                continue;
            }
            let dist = dist_sq.sqrt();
            if dist < DIRECTION_EPSILON {
                continue;
            }
            let n = (dist / c.force_radius).max(c.min_normalized_distance);
            let base = (1.0 - n).powi(2) * c.force_scale * speed_multiplier;
            let force = (base * star.inverse_mass).min(c.max_force);
            star.velocity += delta / dist * force;

            frame.hit_count += 1;
            frame.total_force += force;
            if frame.strongest.is_none_or(|hit| force > hit.force) {
                frame.strongest = Some(Hit {
                    position: star.position,
                    force,
                });
            }
        }
    }

    fn push_neighbors(&mut self, stars: &mut [StarState], frame: &mut PhysicsFrame) {
        let c = &self.config;
        let radius = c.chain_radius;
        self.chain_scratch.clear();
        self.chain_scratch.resize(stars.len(), Vec3::ZERO);

        for (i, pusher) in stars.iter().enumerate() {
            let speed = pusher.velocity.length();
            if speed <= c.chain_velocity_threshold {
                continue;
            }
            for (j, target) in stars.iter().enumerate() {
                if i == j {
                    continue;
                }
                let delta = target.position - pusher.position;
                if delta.x.abs() >= radius || delta.y.abs() >= radius || delta.z.abs() >= radius {
                    continue;
                }
                let dist = delta.length();
                if dist >= radius || dist <= c.chain_min_distance {
                    continue;
                }
                let n = dist / radius;
                let ratio = target.inverse_mass / pusher.inverse_mass;
                let force = ((1.0 - n).powi(2) * speed * c.chain_force_scale * ratio).min(c.max_force);
                self.chain_scratch[j] += delta / dist * force;
            }
        }

        for (star, push) in stars.iter_mut().zip(&self.chain_scratch) {
            if *push != Vec3::ZERO {
                star.velocity += *push;
                frame.chain_pushes += 1;
            }
        }
    }

    fn integrate(&self, stars: &mut [StarState], traveler: Vec3, frame: &mut PhysicsFrame) {
        let c = &self.config;
        let radius_sq = c.force_radius * c.force_radius;
        for star in stars.iter_mut() {
            if star.velocity == Vec3::ZERO && star.position == star.original_pos {
                continue;
            }
            let previous = star.position;
            star.position += star.velocity;
            star.velocity *= star.damping;

            let displacement = star.original_pos - star.position;
            let displacement_sq = displacement.length_squared();
            let in_field = star.position.distance_squared(traveler) < radius_sq;
            if displacement_sq > c.return_threshold_sq {
                if !in_field {
                    star.velocity += displacement * c.return_strength * star.inverse_mass;
                }
            } else if star.velocity.length_squared() < c.settle_velocity_sq {
                star.position = star.original_pos;
                star.velocity = Vec3::ZERO;
            }
            star.velocity = star.velocity.clamp_length_max(c.max_velocity);

            if star.position != previous {
                star.dirty = true;
                frame.moved += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
