//! The traveler, its orbit camera and its trail.
//!
//! - [`AxisController`]: one offset axis with acceleration, friction and pullback.
//! - [`Traveler`]: path progress plus lateral, vertical and boost offsets.
//! - [`OrbitCamera`]: spherical orbit around the traveler.
//! - [`Trail`]: bounded history of traveler positions with a color gradient.

mod axis;
mod orbit_camera;
mod trail;
mod traveler;

pub use axis::AxisController;
pub use orbit_camera::OrbitCamera;
pub use trail::{Trail, trail_color};
pub use traveler::Traveler;
