//! The travel route: a fixed polyline generated by damped inertial randomness.

use std::sync::OnceLock;

use glam::Vec3;
use starwake_config::PathConfig;

use crate::seed::SeededRandom;

const SEGMENT_EPSILON: f32 = 1e-6;

#[derive(Debug)]
struct ArcLengths {
    /// `cumulative[i]` is the length from point 0 to point `i`.
    cumulative: Vec<f32>,
    total: f32,
}

/// Immutable ordered sequence of path points. Index order is the travel direction.
#[derive(Debug)]
pub struct TravelPath {
    points: Vec<Vec3>,
    lengths: OnceLock<ArcLengths>,
}

impl TravelPath {
    /// Generate a path by integrating a randomly perturbed, damped velocity.
    ///
    /// Starts at the origin; every step advances `forward_step` along +z.
    pub fn generate(config: &PathConfig, rng: &mut SeededRandom) -> Self {
        let count = config.point_count.max(2);
        let mut points = Vec::with_capacity(count);
        let mut position = Vec3::ZERO;
        let [mut vx, mut vy, _] = config.initial_velocity;

        for _ in 0..count {
            points.push(position);

            vx += rng.centered() * config.lateral_force;
            vy += rng.centered() * config.vertical_force;
            vx *= config.damping;
            vy *= config.damping;
            vx = vx.clamp(-config.max_lateral_velocity, config.max_lateral_velocity);
            vy = vy.clamp(-config.max_vertical_velocity, config.max_vertical_velocity);

            position.x += vx * config.step_scale;
            position.y += vy * config.step_scale;
            position.z += config.forward_step;
        }

        tracing::debug!(points = points.len(), "generated travel path");
        Self::from_points(points)
    }

    /// Wrap an explicit point list. Used for hand-built routes in tests.
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self {
            points,
            lengths: OnceLock::new(),
        }
    }

    fn lengths(&self) -> &ArcLengths {
        self.lengths.get_or_init(|| {
            let mut cumulative = Vec::with_capacity(self.points.len());
            let mut total = 0.0;
            cumulative.push(0.0);
            for pair in self.points.windows(2) {
                total += pair[0].distance(pair[1]);
                cumulative.push(total);
            }
            ArcLengths { cumulative, total }
        })
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f32 {
        self.lengths().total
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, if in range.
    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// All points in travel order.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Position at travelled `distance`, wrapping around the total length.
    pub fn position_at(&self, distance: f32) -> Vec3 {
        let Some(&first) = self.points.first() else {
            return Vec3::ZERO;
        };
        let lengths = self.lengths();
        if self.points.len() < 2 || lengths.total <= SEGMENT_EPSILON || !distance.is_finite() {
            return first;
        }

        let looped = distance.rem_euclid(lengths.total);
        // First segment whose end cumulative length reaches `looped`.
        let ends = &lengths.cumulative[1..];
        let segment = ends.partition_point(|&end| end < looped).min(ends.len() - 1);

        let start = self.points[segment];
        let end = self.points[segment + 1];
        let seg_len = ends[segment] - lengths.cumulative[segment];
        if seg_len <= SEGMENT_EPSILON {
            return start;
        }
        let t = ((looped - lengths.cumulative[segment]) / seg_len).clamp(0.0, 1.0);
        start.lerp(end, t)
    }

    /// Index of the point closest to `position`; ties go to the lowest index.
    pub fn closest_index(&self, position: Vec3) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let d = point.distance_squared(position);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }
}
