//! Smart density scaling: a slow loop that rescales the bucket multipliers.

use std::collections::VecDeque;

use starwake_config::DensityConfig;

use crate::selector::LodBuckets;

/// Outcome of a density evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityAdjustment {
    Reduced,
    Increased,
    Unchanged,
}

/// Every `interval_frames` frames, compares the windowed fps average with
/// the target and scales the LOD multipliers.
#[derive(Debug, Clone)]
pub struct DensityScaler {
    config: DensityConfig,
    samples: VecDeque<f32>,
    frames: u64,
}

impl DensityScaler {
    pub fn new(config: DensityConfig) -> Self {
        let window = config.window;
        Self {
            config,
            samples: VecDeque::with_capacity(window),
            frames: 0,
        }
    }

    /// Record one fps sample and, on evaluation frames, adjust `buckets`.
    pub fn update(&mut self, fps: f32, buckets: &mut LodBuckets) -> DensityAdjustment {
        if !self.config.enabled {
            return DensityAdjustment::Unchanged;
        }
        if fps.is_finite() {
            self.samples.push_back(fps);
            if self.samples.len() > self.config.window {
                self.samples.pop_front();
            }
        }
        self.frames += 1;
        if self.frames % self.config.interval_frames != 0 || self.samples.is_empty() {
            return DensityAdjustment::Unchanged;
        }

        let average = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        let target = self.config.target_fps;
        if average < target * self.config.lower_ratio {
            buckets.scale(self.config.scale_down, self.config.floor_ratio);
            tracing::info!(average, target, "reducing star density");
            DensityAdjustment::Reduced
        } else if average > target * self.config.upper_ratio
            && buckets.multipliers() != buckets.baseline()
        {
            buckets.scale(self.config.scale_up, self.config.floor_ratio);
            tracing::info!(average, target, "restoring star density");
            DensityAdjustment::Increased
        } else {
            DensityAdjustment::Unchanged
        }
    }
}
