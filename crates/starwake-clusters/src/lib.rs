//! Live star clusters: placement along the path, streaming in and out around
//! the traveler, and presentation through the render context.

pub mod activation;
pub mod instance;
pub mod presenter;

pub use activation::{ActivationManager, ActivationReport};
pub use instance::{ClusterId, ClusterInstance, ClusterRotation, ClusterState, StarRender, StarState};
pub use presenter::{ClusterPresenter, PresentReport};
