//! The simulation's single entry point for recording render work.

use glam::{Quat, Vec3};

use crate::batch::{InstanceTransform, InstancedBatch, TrailVertex};
use crate::commands::{RenderCommand, RenderCommandList};
use crate::handles::{BatchHandle, DrawableHandle, GeometryHandle, HandleAllocator, MaterialHandle};
use crate::pool::{ColorKey, PoolStats, RenderPool, SizeKey};

/// Everything a mesh star holds while rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSlot {
    pub drawable: DrawableHandle,
    pub geometry: GeometryHandle,
    pub size_key: SizeKey,
    pub material: MaterialHandle,
    pub color: ColorKey,
}

/// Owns the resource pool, the handle allocator and the frame's command list.
#[derive(Debug)]
pub struct RenderContext {
    pool: RenderPool,
    alloc: HandleAllocator,
    commands: RenderCommandList,
    live_drawables: usize,
    live_batches: usize,
}

impl RenderContext {
    pub fn new(pool: RenderPool) -> Self {
        Self {
            pool,
            alloc: HandleAllocator::new(),
            commands: RenderCommandList::new(),
            live_drawables: 0,
            live_batches: 0,
        }
    }

    /// Add a drawable with pooled geometry and material, placed at `position`.
    pub fn add_mesh(&mut self, size: f32, color: ColorKey, position: Vec3, scale: f32) -> MeshSlot {
        let (size_key, geometry) =
            self.pool
                .acquire_geometry(size, &mut self.alloc, &mut self.commands);
        let material = self
            .pool
            .acquire_material(color, &mut self.alloc, &mut self.commands);
        let drawable = self.alloc.drawable();
        self.commands.push(RenderCommand::AddDrawable {
            handle: drawable,
            geometry,
            material,
        });
        self.commands.push(RenderCommand::SetTransform {
            handle: drawable,
            position,
            rotation: Quat::IDENTITY,
            scale,
        });
        self.live_drawables += 1;
        MeshSlot {
            drawable,
            geometry,
            size_key,
            material,
            color,
        }
    }

    /// Remove the drawable and return its geometry and material to the pool.
    pub fn remove_mesh(&mut self, slot: MeshSlot) {
        self.commands.push(RenderCommand::RemoveDrawable(slot.drawable));
        self.pool
            .release_geometry(slot.size_key, slot.geometry, &mut self.commands);
        self.pool
            .release_material(slot.color, slot.material, &mut self.commands);
        self.live_drawables = self.live_drawables.saturating_sub(1);
    }

    pub fn set_transform(
        &mut self,
        drawable: DrawableHandle,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        self.commands.push(RenderCommand::SetTransform {
            handle: drawable,
            position,
            rotation,
            scale,
        });
    }

    /// Create an empty instanced batch of sprites of `color`.
    pub fn create_batch(&mut self, color: ColorKey, capacity: usize) -> InstancedBatch {
        let handle = self.alloc.batch();
        self.commands.push(RenderCommand::CreateInstancedBatch {
            handle,
            color: color.to_rgb(),
            capacity: capacity as u32,
        });
        self.live_batches += 1;
        InstancedBatch::new(handle, color.0, capacity)
    }

    pub fn set_instance(&mut self, batch: BatchHandle, slot: u32, transform: InstanceTransform) {
        self.commands.push(RenderCommand::SetInstanceTransform {
            batch,
            slot,
            transform,
        });
    }

    pub fn set_instance_count(&mut self, batch: BatchHandle, count: u32) {
        self.commands
            .push(RenderCommand::SetInstanceCount { batch, count });
    }

    pub fn remove_batch(&mut self, batch: &InstancedBatch) {
        self.commands
            .push(RenderCommand::RemoveInstancedBatch(batch.handle));
        self.live_batches = self.live_batches.saturating_sub(1);
    }

    pub fn set_camera(&mut self, eye: Vec3, target: Vec3) {
        self.commands.push(RenderCommand::SetCamera { eye, target });
    }

    pub fn set_trail(&mut self, vertices: Vec<TrailVertex>) {
        self.commands.push(RenderCommand::SetTrail(vertices));
    }

    /// Dispose every pooled resource.
    pub fn clear_pool(&mut self) {
        self.pool.clear(&mut self.commands);
    }

    /// Hand over the commands recorded since the last call.
    pub fn take_commands(&mut self) -> RenderCommandList {
        std::mem::take(&mut self.commands)
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn live_drawables(&self) -> usize {
        self.live_drawables
    }

    pub fn live_batches(&self) -> usize {
        self.live_batches
    }
}
