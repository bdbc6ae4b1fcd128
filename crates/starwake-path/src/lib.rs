//! Deterministic randomness and the precomputed travel path.

pub mod path;
pub mod seed;

pub use path::TravelPath;
pub use seed::{SPAWN_STREAM, SeededRandom, WORLD_STREAM};
