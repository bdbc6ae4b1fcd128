//! A renderer that records scene state instead of drawing.
//!
//! Used by the headless host and by tests to check resource lifetimes.

use glam::{Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::batch::{InstanceTransform, TrailVertex};
use crate::commands::Renderer;
use crate::handles::{BatchHandle, DrawableHandle, GeometryHandle, MaterialHandle};

#[derive(Debug, Clone)]
struct DrawableState {
    position: Vec3,
    rotation: Quat,
    scale: f32,
}

#[derive(Debug, Clone)]
struct BatchState {
    capacity: u32,
    count: u32,
}

/// Tracks live resources and flags commands that reference unknown handles.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    geometries: FxHashSet<GeometryHandle>,
    materials: FxHashSet<MaterialHandle>,
    drawables: FxHashMap<DrawableHandle, DrawableState>,
    batches: FxHashMap<BatchHandle, BatchState>,
    camera: Option<(Vec3, Vec3)>,
    trail_len: usize,
    peak_drawables: usize,
    violations: Vec<String>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn live_drawables(&self) -> usize {
        self.drawables.len()
    }

    pub fn live_batches(&self) -> usize {
        self.batches.len()
    }

    /// Sum of instance counts over all live batches.
    pub fn live_instances(&self) -> usize {
        self.batches.values().map(|b| b.count as usize).sum()
    }

    /// Largest number of simultaneously live drawables seen.
    pub fn peak_drawables(&self) -> usize {
        self.peak_drawables
    }

    pub fn drawable_position(&self, handle: DrawableHandle) -> Option<Vec3> {
        self.drawables.get(&handle).map(|d| d.position)
    }

    pub fn drawable_rotation(&self, handle: DrawableHandle) -> Option<Quat> {
        self.drawables.get(&handle).map(|d| d.rotation)
    }

    pub fn drawable_scale(&self, handle: DrawableHandle) -> Option<f32> {
        self.drawables.get(&handle).map(|d| d.scale)
    }

    pub fn camera(&self) -> Option<(Vec3, Vec3)> {
        self.camera
    }

    pub fn trail_len(&self) -> usize {
        self.trail_len
    }

    /// Commands that referenced unknown or out-of-range handles.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    fn violation(&mut self, message: String) {
        tracing::warn!("{message}");
        self.violations.push(message);
    }
}

impl Renderer for RecordingRenderer {
    fn create_geometry(&mut self, handle: GeometryHandle, _radius: f32) {
        if !self.geometries.insert(handle) {
            self.violation(format!("geometry {handle:?} created twice"));
        }
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) {
        if !self.geometries.remove(&handle) {
            self.violation(format!("disposed unknown geometry {handle:?}"));
        }
    }

    fn create_material(&mut self, handle: MaterialHandle, _color: [f32; 3]) {
        if !self.materials.insert(handle) {
            self.violation(format!("material {handle:?} created twice"));
        }
    }

    fn dispose_material(&mut self, handle: MaterialHandle) {
        if !self.materials.remove(&handle) {
            self.violation(format!("disposed unknown material {handle:?}"));
        }
    }

    fn add_drawable(
        &mut self,
        handle: DrawableHandle,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) {
        if !self.geometries.contains(&geometry) || !self.materials.contains(&material) {
            self.violation(format!(
                "drawable {handle:?} uses unknown {geometry:?} or {material:?}"
            ));
        }
        let state = DrawableState {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        };
        if self.drawables.insert(handle, state).is_some() {
            self.violation(format!("drawable {handle:?} added twice"));
        }
        self.peak_drawables = self.peak_drawables.max(self.drawables.len());
    }

    fn remove_drawable(&mut self, handle: DrawableHandle) {
        if self.drawables.remove(&handle).is_none() {
            self.violation(format!("removed unknown drawable {handle:?}"));
        }
    }

    fn set_transform(
        &mut self,
        handle: DrawableHandle,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        match self.drawables.get_mut(&handle) {
            Some(state) => {
                state.position = position;
                state.rotation = rotation;
                state.scale = scale;
            }
            None => self.violation(format!("transform for unknown drawable {handle:?}")),
        }
    }

    fn create_instanced_batch(&mut self, handle: BatchHandle, _color: [f32; 3], capacity: u32) {
        let state = BatchState { capacity, count: 0 };
        if self.batches.insert(handle, state).is_some() {
            self.violation(format!("batch {handle:?} created twice"));
        }
    }

    fn set_instance_transform(
        &mut self,
        batch: BatchHandle,
        slot: u32,
        _transform: InstanceTransform,
    ) {
        match self.batches.get(&batch) {
            Some(state) if slot < state.capacity => {}
            Some(_) => self.violation(format!("slot {slot} out of range in {batch:?}")),
            None => self.violation(format!("instance for unknown batch {batch:?}")),
        }
    }

    fn set_instance_count(&mut self, batch: BatchHandle, count: u32) {
        match self.batches.get_mut(&batch) {
            Some(state) if count <= state.capacity => state.count = count,
            Some(_) => self.violation(format!("count {count} exceeds capacity of {batch:?}")),
            None => self.violation(format!("count for unknown batch {batch:?}")),
        }
    }

    fn remove_instanced_batch(&mut self, handle: BatchHandle) {
        if self.batches.remove(&handle).is_none() {
            self.violation(format!("removed unknown batch {handle:?}"));
        }
    }

    fn set_camera(&mut self, eye: Vec3, target: Vec3) {
        self.camera = Some((eye, target));
    }

    fn set_trail(&mut self, vertices: &[TrailVertex]) {
        self.trail_len = vertices.len();
    }
}
