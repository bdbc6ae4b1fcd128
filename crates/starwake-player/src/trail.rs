use std::collections::VecDeque;

use glam::Vec3;
use starwake_render::TrailVertex;

/// Bounded history of traveler positions, newest first.
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, position: Vec3) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(position);
        self.points.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }

    /// Vertices colored from head (cyan) to tail (magenta).
    pub fn vertices(&self) -> Vec<TrailVertex> {
        let count = self.points.len();
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                TrailVertex {
                    position: p.to_array(),
                    color: trail_color(t),
                }
            })
            .collect()
    }
}

/// RGB along the trail for `t` in `[0, 1]`, head to tail.
pub fn trail_color(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let hue = if t < 0.5 {
        0.5 + t * 0.3
    } else {
        0.65 + (t - 0.5) * 0.3
    };
    hsl_to_rgb(hue, 1.0, 0.7)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounded_newest_first() {
        let mut trail = Trail::new(3);
        for i in 0..10 {
            trail.push(Vec3::splat(i as f32));
        }
        assert_eq!(trail.len(), 3);
        let first = *trail.points().next().unwrap();
        assert_eq!(first, Vec3::splat(9.0));
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut trail = Trail::new(0);
        trail.push(Vec3::ONE);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_head_is_cyan() {
        let [r, g, b] = trail_color(0.0);
        assert!(r < 0.5);
        assert!((g - 1.0).abs() < 1e-5);
        assert!((b - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tail_leans_magenta() {
        let [r, g, b] = trail_color(1.0);
        assert!(r > g);
        assert!(b > g);
    }

    #[test]
    fn test_vertices_match_points() {
        let mut trail = Trail::new(200);
        for i in 0..5 {
            trail.push(Vec3::new(i as f32, 0.0, 0.0));
        }
        let vertices = trail.vertices();
        assert_eq!(vertices.len(), 5);
        assert_eq!(vertices[0].position, [4.0, 0.0, 0.0]);
        assert_eq!(vertices[4].color, trail_color(1.0));
    }
}
