//! Display-only drift for clusters that are not physically simulated.

use std::f32::consts::TAU;

use glam::Vec3;

/// Per-axis rates relative to the base frequency.
const AXIS_RATES: Vec3 = Vec3::new(1.0, 0.8, 1.2);

/// Accumulated drift phase, one angle per axis, each kept in `[0, TAU)`.
///
/// Wrapping each axis on its own keeps the wobble continuous however long
/// the run lasts.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftClock {
    frequency: f32,
    phases: Vec3,
    frames: u64,
}

impl DriftClock {
    /// `frequency` is radians per frame on the x axis.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            phases: Vec3::ZERO,
            frames: 0,
        }
    }

    /// Advance one frame.
    pub fn advance(&mut self) {
        let next = self.phases + AXIS_RATES * self.frequency;
        self.phases = Vec3::new(
            next.x.rem_euclid(TAU),
            next.y.rem_euclid(TAU),
            next.z.rem_euclid(TAU),
        );
        self.frames += 1;
    }

    pub fn phases(&self) -> Vec3 {
        self.phases
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Small sinusoidal wobble for a star resting at `rest`.
///
/// The phase offset depends on the rest position so neighboring stars move
/// out of step.
pub fn drift_offset(clock: &DriftClock, rest: Vec3, amplitude: f32) -> Vec3 {
    let t = clock.phases;
    let phase = rest.x * 0.11 + rest.y * 0.17 + rest.z * 0.07;
    Vec3::new(
        (t.x + phase).sin(),
        (t.y + phase * 1.3).cos() * 0.6,
        (t.z + phase * 0.7).sin(),
    ) * amplitude
}
