//! Deterministic scalar stream from a single seed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream used for the path and the template pool.
pub const WORLD_STREAM: u64 = 0;
/// Stream used for runtime spawning decisions.
pub const SPAWN_STREAM: u64 = 1;

/// Seeded source of `f32` values in `[0, 1)`.
///
/// The same seed and stream always produce the same sequence.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// A source on the world stream of `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, WORLD_STREAM)
    }

    /// A source on an independent stream of `seed`.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Value in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Value in `[-0.5, 0.5)`.
    pub fn centered(&mut self) -> f32 {
        self.next_f32() - 0.5
    }

    /// Index in `0..len`. Returns 0 for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// Integer in `min..=max`.
    pub fn int_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.index((max - min + 1) as usize) as u32
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}
