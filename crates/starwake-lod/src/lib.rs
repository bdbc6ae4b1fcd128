//! Level-of-detail decisions for star clusters.
//!
//! - [`selector`]: distance buckets and the rendered star count.
//! - [`representation`]: mesh vs. sprite choice with a hysteresis band.
//! - [`quality`]: fast frame-rate driven quality scalar.
//! - [`density`]: slow frame-rate driven scaling of the bucket multipliers.
//! - [`drift`]: display-only wobble for clusters outside the physics set.

pub mod density;
pub mod drift;
pub mod quality;
pub mod representation;
pub mod selector;

pub use density::{DensityAdjustment, DensityScaler};
pub use drift::{DriftClock, drift_offset};
pub use quality::AdaptiveQuality;
pub use representation::{Representation, choose_representation};
pub use selector::{LodBuckets, LodSelector};
