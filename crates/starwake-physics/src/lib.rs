//! Proximity physics for rendered stars near the traveler.
//!
//! Stars inside the traveler's force field are pushed away, weighted by the
//! inverse mass of their size category, then damped and pulled back toward
//! their rest positions by a spring. In chain mode fast stars also push their
//! neighbors. Impacts feed a heat value and short-lived hit marks.

pub mod effects;
pub mod engine;

pub use effects::{HitMark, ImpactEffects};
pub use engine::{Hit, PhysicsEngine, PhysicsFrame};
