//! Renderer boundary: opaque handles, a per-frame command list, pooled
//! geometry/material resources, and instanced sprite batches.
//!
//! The simulation never talks to a graphics API. Everything it wants drawn is
//! recorded as [`RenderCommand`]s and replayed into a [`Renderer`].

pub mod batch;
pub mod commands;
pub mod context;
pub mod handles;
pub mod pool;
pub mod recording;

pub use batch::{InstanceTransform, InstancedBatch, TrailVertex};
pub use commands::{RenderCommand, RenderCommandList, Renderer};
pub use context::{MeshSlot, RenderContext};
pub use handles::{BatchHandle, DrawableHandle, GeometryHandle, HandleAllocator, MaterialHandle};
pub use pool::{ColorKey, PoolStats, RenderPool, SizeKey};
pub use recording::RecordingRenderer;
