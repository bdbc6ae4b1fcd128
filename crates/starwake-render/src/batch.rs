//! Instanced sprite batches and GPU-layout vertex data.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::handles::BatchHandle;

/// Per-instance data of a sprite batch: position and uniform scale.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    pub position: [f32; 3],
    pub scale: f32,
}

impl InstanceTransform {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position: position.to_array(),
            scale,
        }
    }
}

/// One point of the traveler trail.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TrailVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// A fixed-capacity batch of sprites sharing one color.
#[derive(Debug, Clone)]
pub struct InstancedBatch {
    pub handle: BatchHandle,
    pub color: u32,
    capacity: usize,
    len: usize,
}

impl InstancedBatch {
    pub fn new(handle: BatchHandle, color: u32, capacity: usize) -> Self {
        Self {
            handle,
            color,
            capacity,
            len: 0,
        }
    }

    /// Reserve the next slot, or `None` when full.
    pub fn push_slot(&mut self) -> Option<u32> {
        if self.len >= self.capacity {
            return None;
        }
        let slot = self.len as u32;
        self.len += 1;
        Some(slot)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }
}
