//! Adaptive quality: a scalar in `[floor, ceiling]` that follows the frame rate.

use std::collections::VecDeque;

use starwake_config::QualityConfig;

/// Rolling fps average driving a quality multiplier on rendered star counts.
///
/// Nothing changes until the window is full. After that every sample nudges
/// the scalar down when the average is below `low_fps` and up when above
/// `high_fps`.
#[derive(Debug, Clone)]
pub struct AdaptiveQuality {
    config: QualityConfig,
    samples: VecDeque<f32>,
    sum: f32,
    scalar: f32,
}

impl AdaptiveQuality {
    pub fn new(config: QualityConfig) -> Self {
        let window = config.window;
        Self {
            scalar: config.ceiling,
            config,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    /// Current quality scalar.
    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    /// Average of the window, if any samples were recorded.
    pub fn average_fps(&self) -> Option<f32> {
        (!self.samples.is_empty()).then(|| self.sum / self.samples.len() as f32)
    }

    /// Record one fps sample. Returns `true` if the scalar changed.
    pub fn update(&mut self, fps: f32) -> bool {
        if !fps.is_finite() {
            return false;
        }
        self.samples.push_back(fps);
        self.sum += fps;
        while self.samples.len() > self.config.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        if self.samples.len() < self.config.window {
            return false;
        }

        let average = self.sum / self.samples.len() as f32;
        let previous = self.scalar;
        if average < self.config.low_fps {
            self.scalar = (self.scalar - self.config.decrement).max(self.config.floor);
        } else if average > self.config.high_fps {
            self.scalar = (self.scalar + self.config.increment).min(self.config.ceiling);
        }

        let changed = self.scalar != previous;
        if changed {
            tracing::info!(average, quality = self.scalar, "adaptive quality adjusted");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_change_until_window_full() {
        let mut quality = AdaptiveQuality::new(QualityConfig::default());
        for _ in 0..29 {
            assert!(!quality.update(10.0));
        }
        assert_eq!(quality.scalar(), 1.0);
        assert!(quality.update(10.0));
        assert!((quality.scalar() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_low_fps_never_raises_quality() {
        let mut quality = AdaptiveQuality::new(QualityConfig::default());
        let mut last = quality.scalar();
        for _ in 0..200 {
            quality.update(20.0);
            assert!(quality.scalar() <= last);
            last = quality.scalar();
        }
        assert!((quality.scalar() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_full_low_window_lowers_strictly_then_pins_at_floor() {
        let config = QualityConfig {
            window: 10,
            floor: 0.4,
            ..Default::default()
        };
        let mut quality = AdaptiveQuality::new(config.clone());
        let start = quality.scalar();
        for _ in 0..config.window {
            quality.update(12.0);
        }
        assert!(quality.scalar() < start);
        assert!((quality.scalar() - (start - config.decrement)).abs() < 1e-6);

        for _ in 0..20 {
            let before = quality.scalar();
            for _ in 0..config.window {
                quality.update(12.0);
            }
            if before > config.floor {
                assert!(quality.scalar() < before);
            }
        }
        assert_eq!(quality.scalar(), config.floor);
        assert!(!quality.update(12.0));
        assert_eq!(quality.scalar(), config.floor);
    }

    #[test]
    fn test_high_fps_recovers_to_ceiling() {
        let mut quality = AdaptiveQuality::new(QualityConfig::default());
        for _ in 0..100 {
            quality.update(10.0);
        }
        let mut last = quality.scalar();
        for _ in 0..1000 {
            quality.update(60.0);
            assert!(quality.scalar() >= last);
            last = quality.scalar();
        }
        assert_eq!(quality.scalar(), 1.0);
    }

    #[test]
    fn test_middle_band_holds() {
        let mut quality = AdaptiveQuality::new(QualityConfig::default());
        for _ in 0..100 {
            assert!(!quality.update(40.0));
        }
        assert_eq!(quality.scalar(), 1.0);
        assert!((quality.average_fps().unwrap() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_non_finite_sample_ignored() {
        let mut quality = AdaptiveQuality::new(QualityConfig::default());
        assert!(!quality.update(f32::INFINITY));
        assert!(quality.average_fps().is_none());
    }
}
