//! Frame orchestration for Starwake.
//!
//! [`Simulation`] owns every subsystem and advances them in a fixed order once
//! per [`Simulation::tick`]. Each tick returns the frame's render commands and
//! statistics; a host replays the commands into its renderer.

pub mod clock;
pub mod error;
pub mod simulation;
pub mod stats;

pub use clock::{FrameClock, MAX_FRAME_TIME};
pub use error::SimulationError;
pub use simulation::{FrameOutput, Simulation};
pub use stats::FrameStats;
