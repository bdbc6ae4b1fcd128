//! The traveling body.

use glam::{Vec2, Vec3};
use starwake_config::MotionConfig;
use starwake_input::InputSnapshot;
use starwake_path::TravelPath;

use crate::axis::AxisController;

/// Progress along the path plus three free offset axes.
///
/// Forward speed eases toward a target speed; the offsets are applied on top
/// of the path position componentwise (lateral on x, vertical on y, boost on z).
#[derive(Clone, Debug)]
pub struct Traveler {
    distance: f32,
    speed: f32,
    target_speed: f32,
    accelerate_smoothing: f32,
    decelerate_smoothing: f32,
    boost_multiplier: f32,
    lateral: AxisController,
    vertical: AxisController,
    boost: AxisController,
    position: Vec3,
}

impl Traveler {
    /// Starts at the path origin already moving at cruise speed.
    pub fn new(config: &MotionConfig, path: &TravelPath) -> Self {
        Self {
            distance: 0.0,
            speed: config.cruise_speed,
            target_speed: config.cruise_speed,
            accelerate_smoothing: config.accelerate_smoothing,
            decelerate_smoothing: config.decelerate_smoothing,
            boost_multiplier: config.boost_multiplier,
            lateral: AxisController::new(config.lateral.clone()),
            vertical: AxisController::new(config.vertical.clone()),
            boost: AxisController::new(config.boost.clone()),
            position: path.position_at(0.0),
        }
    }

    /// Advance one frame and return the new world position.
    pub fn update(&mut self, input: &InputSnapshot, path: &TravelPath) -> Vec3 {
        let k = if self.target_speed > self.speed {
            self.accelerate_smoothing
        } else {
            self.decelerate_smoothing
        };
        self.speed += (self.target_speed - self.speed) * k;
        self.distance += self.speed;
        let total = path.total_length();
        if total > 0.0 && self.distance >= total {
            self.distance = self.distance.rem_euclid(total);
        }

        self.lateral.update(input.lateral_axis(), 1.0);
        self.vertical.update(input.vertical_axis(), 1.0);
        let boost_mult = if input.boost {
            self.boost_multiplier
        } else {
            1.0
        };
        self.boost.update(input.boost_axis(), boost_mult);

        self.position = path.position_at(self.distance) + self.offset();
        self.position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Progress along the path, wrapped to its total length.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn set_target_speed(&mut self, speed: f32) {
        self.target_speed = speed.max(0.0);
    }

    /// Combined lateral, vertical and boost offset.
    pub fn offset(&self) -> Vec3 {
        Vec3::new(
            self.lateral.offset(),
            self.vertical.offset(),
            self.boost.offset(),
        )
    }

    /// Magnitude of the lateral/vertical offset velocity; drives push strength.
    pub fn sideways_speed(&self) -> f32 {
        Vec2::new(self.lateral.velocity(), self.vertical.velocity()).length()
    }

    pub fn lateral(&self) -> &AxisController {
        &self.lateral
    }

    pub fn vertical(&self) -> &AxisController {
        &self.vertical
    }

    pub fn boost(&self) -> &AxisController {
        &self.boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> TravelPath {
        TravelPath::from_points((0..100).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect())
    }

    #[test]
    fn test_cruise_distance_is_linear() {
        let path = straight_path();
        let mut traveler = Traveler::new(&MotionConfig::default(), &path);
        for _ in 0..50 {
            traveler.update(&InputSnapshot::idle(), &path);
        }
        assert!((traveler.distance() - 50.0 * 0.12).abs() < 1e-4);
        assert!((traveler.position().z - 6.0).abs() < 1e-3);
        assert_eq!(traveler.offset(), Vec3::ZERO);
    }

    #[test]
    fn test_speed_eases_toward_target() {
        let path = straight_path();
        let mut traveler = Traveler::new(&MotionConfig::default(), &path);
        traveler.set_target_speed(1.0);
        traveler.update(&InputSnapshot::idle(), &path);
        let after_one = traveler.speed();
        assert!((after_one - (0.12 + 0.88 * 0.02)).abs() < 1e-6);
        for _ in 0..2000 {
            traveler.update(&InputSnapshot::idle(), &path);
        }
        assert!((traveler.speed() - 1.0).abs() < 1e-3);

        traveler.set_target_speed(0.12);
        let before = traveler.speed();
        traveler.update(&InputSnapshot::idle(), &path);
        assert!((traveler.speed() - (before + (0.12 - before) * 0.015)).abs() < 1e-6);
    }

    #[test]
    fn test_distance_wraps_at_path_end() {
        let path = straight_path();
        let mut traveler = Traveler::new(&MotionConfig::default(), &path);
        traveler.set_target_speed(5.0);
        for _ in 0..5000 {
            traveler.update(&InputSnapshot::idle(), &path);
            assert!(traveler.distance() < path.total_length());
        }
    }

    #[test]
    fn test_offsets_map_to_axes() {
        let path = straight_path();
        let mut traveler = Traveler::new(&MotionConfig::default(), &path);
        let input = InputSnapshot {
            right: true,
            up: true,
            boost: true,
            ..Default::default()
        };
        for _ in 0..10 {
            traveler.update(&input, &path);
        }
        let offset = traveler.offset();
        assert!(offset.x > 0.0);
        assert!(offset.y > 0.0);
        assert!(offset.z > 0.0);
        assert!(traveler.sideways_speed() > 0.0);
    }

    #[test]
    fn test_boost_reaches_higher_speed_than_plain_axis() {
        let path = straight_path();
        let config = MotionConfig::default();
        let mut traveler = Traveler::new(&config, &path);
        let boosting = InputSnapshot {
            boost: true,
            ..Default::default()
        };
        for _ in 0..200 {
            traveler.update(&boosting, &path);
        }
        assert!(traveler.boost().velocity() > config.boost.max_speed);
        assert!(
            traveler.boost().velocity() <= config.boost.max_speed * config.boost_multiplier + 1e-5
        );
    }
}
