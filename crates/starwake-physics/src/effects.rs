//! Heat and hit marks produced by traveler impacts.

use std::collections::VecDeque;

use glam::Vec3;
use starwake_config::EffectsConfig;

use crate::engine::PhysicsFrame;

/// A short-lived marker at the position of a strong impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitMark {
    pub position: Vec3,
    pub strength: f32,
    /// Frames since spawn.
    pub age: u32,
}

impl HitMark {
    /// Remaining life in `[0, 1]`.
    pub fn remaining(&self, lifetime: u32) -> f32 {
        if lifetime == 0 {
            return 0.0;
        }
        1.0 - (self.age as f32 / lifetime as f32).min(1.0)
    }
}

/// Heat in `[0, 1]` and a capped queue of hit marks, oldest first.
#[derive(Debug, Clone)]
pub struct ImpactEffects {
    config: EffectsConfig,
    heat: f32,
    marks: VecDeque<HitMark>,
}

impl ImpactEffects {
    pub fn new(config: EffectsConfig) -> Self {
        let capacity = config.hit_mark_capacity;
        Self {
            config,
            heat: 0.0,
            marks: VecDeque::with_capacity(capacity),
        }
    }

    /// Decay heat, age marks, then apply this frame's impacts.
    pub fn update(&mut self, frame: &PhysicsFrame) {
        self.heat *= self.config.heat_decay;
        if self.heat < 1e-4 {
            self.heat = 0.0;
        }
        self.heat = (self.heat + self.config.heat_gain * frame.total_force).clamp(0.0, 1.0);

        for mark in self.marks.iter_mut() {
            mark.age += 1;
        }
        let lifetime = self.config.hit_mark_lifetime;
        self.marks.retain(|mark| mark.age < lifetime);

        if let Some(hit) = frame.strongest {
            if self.marks.len() >= self.config.hit_mark_capacity {
                self.marks.pop_front();
            }
            self.marks.push_back(HitMark {
                position: hit.position,
                strength: hit.force,
                age: 0,
            });
        }
    }

    pub fn heat(&self) -> f32 {
        self.heat
    }

    /// Live marks, oldest first.
    pub fn marks(&self) -> impl ExactSizeIterator<Item = &HitMark> {
        self.marks.iter()
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Hit;

    fn hit_frame(force: f32) -> PhysicsFrame {
        PhysicsFrame {
            hit_count: 1,
            total_force: force,
            strongest: Some(Hit {
                position: Vec3::X,
                force,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_heat_rises_and_decays() {
        let mut effects = ImpactEffects::new(EffectsConfig::default());
        effects.update(&hit_frame(0.4));
        assert!((effects.heat() - 0.2).abs() < 1e-6);
        effects.update(&PhysicsFrame::default());
        assert!((effects.heat() - 0.19).abs() < 1e-6);
        for _ in 0..1000 {
            effects.update(&PhysicsFrame::default());
        }
        assert_eq!(effects.heat(), 0.0);
    }

    #[test]
    fn test_heat_is_clamped() {
        let mut effects = ImpactEffects::new(EffectsConfig::default());
        for _ in 0..20 {
            effects.update(&hit_frame(5.0));
        }
        assert_eq!(effects.heat(), 1.0);
    }

    #[test]
    fn test_marks_are_capped_oldest_first() {
        let config = EffectsConfig {
            hit_mark_capacity: 3,
            hit_mark_lifetime: 100,
            ..Default::default()
        };
        let mut effects = ImpactEffects::new(config);
        for i in 0..5 {
            effects.update(&hit_frame(0.1 * (i + 1) as f32));
        }
        assert_eq!(effects.mark_count(), 3);
        let strengths: Vec<f32> = effects.marks().map(|m| m.strength).collect();
        assert!((strengths[0] - 0.3).abs() < 1e-6);
        assert!((strengths[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_marks_expire() {
        let config = EffectsConfig {
            hit_mark_lifetime: 5,
            ..Default::default()
        };
        let mut effects = ImpactEffects::new(config);
        effects.update(&hit_frame(0.2));
        for _ in 0..4 {
            effects.update(&PhysicsFrame::default());
        }
        assert_eq!(effects.mark_count(), 1);
        effects.update(&PhysicsFrame::default());
        assert_eq!(effects.mark_count(), 0);
    }

    #[test]
    fn test_remaining_life() {
        let mark = HitMark {
            position: Vec3::ZERO,
            strength: 0.1,
            age: 15,
        };
        assert!((mark.remaining(60) - 0.75).abs() < 1e-6);
        assert_eq!(mark.remaining(0), 0.0);
    }
}
