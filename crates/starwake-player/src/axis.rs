//! A single offset axis of the traveler.

use starwake_config::AxisConfig;

/// Offset and velocity along one axis.
///
/// While input is held the velocity grows, faster the farther the axis is
/// from center. On release friction slows it and a pullback drags the offset
/// back toward zero, harder once the axis is nearly still.
#[derive(Clone, Debug)]
pub struct AxisController {
    config: AxisConfig,
    offset: f32,
    velocity: f32,
}

impl AxisController {
    pub fn new(config: AxisConfig) -> Self {
        Self {
            config,
            offset: 0.0,
            velocity: 0.0,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Advance one frame. `direction` is -1, 0 or 1; `multiplier` scales
    /// acceleration and the speed ceiling.
    pub fn update(&mut self, direction: f32, multiplier: f32) {
        let c = &self.config;
        if direction != 0.0 {
            let ramp = 1.0 + c.ramp_gain * self.offset.abs() / c.ramp_distance.max(f32::EPSILON);
            self.velocity += direction * c.acceleration * ramp * multiplier;
        } else {
            self.velocity *= c.friction;
            let mut pullback = c.pullback;
            if self.velocity.abs() < c.low_speed_threshold {
                pullback *= c.low_speed_pullback_boost;
            }
            self.velocity -= self.offset * pullback;
        }

        let max_speed = c.max_speed * multiplier;
        self.velocity = self.velocity.clamp(-max_speed, max_speed);
        self.offset += self.velocity;

        if let Some(limit) = c.max_deviation
            && self.offset.abs() > limit
        {
            self.offset = self.offset.clamp(-limit, limit);
            self.velocity = 0.0;
        }
    }
}
