//! Reusable geometry and material handles.
//!
//! Instead of creating a sphere and a material for every star each time a
//! cluster is rendered, the [`RenderPool`] keeps released handles in per-key
//! free lists. Geometry is keyed by quantized star size, materials by color.
//! Each free list is bounded; releases beyond the bound dispose the handle.

use rustc_hash::FxHashMap;

use crate::commands::{RenderCommand, RenderCommandList};
use crate::handles::{GeometryHandle, HandleAllocator, MaterialHandle};

/// A packed `0xRRGGBB` color. Also the material pool key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey(pub u32);

impl ColorKey {
    /// Components in `[0, 1]`.
    pub fn to_rgb(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b]
    }
}

impl From<u32> for ColorKey {
    fn from(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }
}

/// Star size quantized to the pool's size step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SizeKey(pub u32);

impl SizeKey {
    /// Nearest step of `quantum`, never zero.
    pub fn quantize(size: f32, quantum: f32) -> Self {
        let steps = (size / quantum.max(f32::EPSILON)).round();
        Self(steps.clamp(1.0, u32::MAX as f32) as u32)
    }

    /// Radius represented by this key.
    pub fn radius(self, quantum: f32) -> f32 {
        self.0 as f32 * quantum
    }
}

/// Lifetime counters. Every created handle is in use, pooled, or disposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub geometries_created: usize,
    pub geometries_in_use: usize,
    pub geometries_pooled: usize,
    pub geometries_disposed: usize,
    pub materials_created: usize,
    pub materials_in_use: usize,
    pub materials_pooled: usize,
    pub materials_disposed: usize,
}

impl PoolStats {
    /// `created == in_use + pooled + disposed` for both resource kinds.
    pub fn is_balanced(&self) -> bool {
        self.geometries_created
            == self.geometries_in_use + self.geometries_pooled + self.geometries_disposed
            && self.materials_created
                == self.materials_in_use + self.materials_pooled + self.materials_disposed
    }
}

/// Bounded per-key free lists of geometry and material handles.
#[derive(Debug)]
pub struct RenderPool {
    geometries: FxHashMap<SizeKey, Vec<GeometryHandle>>,
    materials: FxHashMap<ColorKey, Vec<MaterialHandle>>,
    max_per_key: usize,
    size_quantum: f32,
    stats: PoolStats,
}

impl RenderPool {
    pub fn new(max_per_key: usize, size_quantum: f32) -> Self {
        Self {
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            max_per_key,
            size_quantum,
            stats: PoolStats::default(),
        }
    }

    pub fn size_quantum(&self) -> f32 {
        self.size_quantum
    }

    /// A geometry for a star of `size`, reusing a pooled one when available.
    pub fn acquire_geometry(
        &mut self,
        size: f32,
        alloc: &mut HandleAllocator,
        commands: &mut RenderCommandList,
    ) -> (SizeKey, GeometryHandle) {
        let key = SizeKey::quantize(size, self.size_quantum);
        self.stats.geometries_in_use += 1;

        if let Some(handle) = self.geometries.get_mut(&key).and_then(Vec::pop) {
            self.stats.geometries_pooled -= 1;
            return (key, handle);
        }

        let handle = alloc.geometry();
        commands.push(RenderCommand::CreateGeometry {
            handle,
            radius: key.radius(self.size_quantum),
        });
        self.stats.geometries_created += 1;
        (key, handle)
    }

    /// Return a geometry; disposes it when the key's free list is full.
    pub fn release_geometry(
        &mut self,
        key: SizeKey,
        handle: GeometryHandle,
        commands: &mut RenderCommandList,
    ) {
        self.stats.geometries_in_use = self.stats.geometries_in_use.saturating_sub(1);
        let free = self.geometries.entry(key).or_default();
        if free.len() < self.max_per_key {
            free.push(handle);
            self.stats.geometries_pooled += 1;
        } else {
            commands.push(RenderCommand::DisposeGeometry(handle));
            self.stats.geometries_disposed += 1;
        }
    }

    /// A material of `color`, reusing a pooled one when available.
    pub fn acquire_material(
        &mut self,
        color: ColorKey,
        alloc: &mut HandleAllocator,
        commands: &mut RenderCommandList,
    ) -> MaterialHandle {
        self.stats.materials_in_use += 1;

        if let Some(handle) = self.materials.get_mut(&color).and_then(Vec::pop) {
            self.stats.materials_pooled -= 1;
            return handle;
        }

        let handle = alloc.material();
        commands.push(RenderCommand::CreateMaterial {
            handle,
            color: color.to_rgb(),
        });
        self.stats.materials_created += 1;
        handle
    }

    /// Return a material; disposes it when the key's free list is full.
    pub fn release_material(
        &mut self,
        color: ColorKey,
        handle: MaterialHandle,
        commands: &mut RenderCommandList,
    ) {
        self.stats.materials_in_use = self.stats.materials_in_use.saturating_sub(1);
        let free = self.materials.entry(color).or_default();
        if free.len() < self.max_per_key {
            free.push(handle);
            self.stats.materials_pooled += 1;
        } else {
            commands.push(RenderCommand::DisposeMaterial(handle));
            self.stats.materials_disposed += 1;
        }
    }

    /// Dispose every pooled handle.
    pub fn clear(&mut self, commands: &mut RenderCommandList) {
        for handle in self.geometries.drain().flat_map(|(_, free)| free) {
            commands.push(RenderCommand::DisposeGeometry(handle));
            self.stats.geometries_disposed += 1;
        }
        for handle in self.materials.drain().flat_map(|(_, free)| free) {
            commands.push(RenderCommand::DisposeMaterial(handle));
            self.stats.materials_disposed += 1;
        }
        self.stats.geometries_pooled = 0;
        self.stats.materials_pooled = 0;
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(max_per_key: usize) -> (RenderPool, HandleAllocator, RenderCommandList) {
        (
            RenderPool::new(max_per_key, 0.01),
            HandleAllocator::new(),
            RenderCommandList::new(),
        )
    }

    #[test]
    fn test_color_key_to_rgb() {
        assert_eq!(ColorKey(0xff00ff).to_rgb(), [1.0, 0.0, 1.0]);
        assert_eq!(ColorKey::from(0xaa00ff88), ColorKey(0x0000ff88));
    }

    #[test]
    fn test_size_quantization() {
        assert_eq!(SizeKey::quantize(0.052, 0.01), SizeKey(5));
        assert_eq!(SizeKey::quantize(0.056, 0.01), SizeKey(6));
        assert_eq!(SizeKey::quantize(0.0001, 0.01), SizeKey(1));
    }

    #[test]
    fn test_pool_reuses_released_geometry() {
        let (mut pool, mut alloc, mut cmds) = setup(8);
        let (key, first) = pool.acquire_geometry(0.1, &mut alloc, &mut cmds);
        pool.release_geometry(key, first, &mut cmds);
        let (_, second) = pool.acquire_geometry(0.1, &mut alloc, &mut cmds);

        assert_eq!(first, second);
        assert_eq!(pool.stats().geometries_created, 1);
        assert_eq!(cmds.len(), 1);
        assert!(pool.stats().is_balanced());
    }

    #[test]
    fn test_sizes_in_same_step_share_geometry() {
        let (mut pool, mut alloc, mut cmds) = setup(8);
        let (key, handle) = pool.acquire_geometry(0.101, &mut alloc, &mut cmds);
        pool.release_geometry(key, handle, &mut cmds);
        let (key2, handle2) = pool.acquire_geometry(0.099, &mut alloc, &mut cmds);
        assert_eq!(key, key2);
        assert_eq!(handle, handle2);
    }

    #[test]
    fn test_excess_releases_are_disposed() {
        let (mut pool, mut alloc, mut cmds) = setup(2);
        let handles: Vec<_> = (0..5)
            .map(|_| pool.acquire_material(ColorKey(0x00ffff), &mut alloc, &mut cmds))
            .collect();
        for handle in handles {
            pool.release_material(ColorKey(0x00ffff), handle, &mut cmds);
        }
        let stats = pool.stats();
        assert_eq!(stats.materials_created, 5);
        assert_eq!(stats.materials_pooled, 2);
        assert_eq!(stats.materials_disposed, 3);
        assert_eq!(stats.materials_in_use, 0);
        assert!(stats.is_balanced());
    }

    #[test]
    fn test_clear_disposes_everything_pooled() {
        let (mut pool, mut alloc, mut cmds) = setup(8);
        let (key, g) = pool.acquire_geometry(0.1, &mut alloc, &mut cmds);
        let m = pool.acquire_material(ColorKey(0xff0088), &mut alloc, &mut cmds);
        pool.release_geometry(key, g, &mut cmds);
        pool.release_material(ColorKey(0xff0088), m, &mut cmds);
        pool.clear(&mut cmds);

        let stats = pool.stats();
        assert_eq!(stats.geometries_pooled, 0);
        assert_eq!(stats.materials_pooled, 0);
        assert_eq!(stats.geometries_disposed, 1);
        assert_eq!(stats.materials_disposed, 1);
        assert!(stats.is_balanced());
    }
}
