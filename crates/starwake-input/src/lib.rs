//! Per-frame input for the simulation.
//!
//! [`InputSnapshot`] is the only thing the simulation reads from input
//! devices. [`InputScript`] produces snapshots from a RON description so
//! headless runs and tests can replay a flight.

mod script;
mod snapshot;

pub use script::{InputScript, InputSegment};
pub use snapshot::InputSnapshot;
