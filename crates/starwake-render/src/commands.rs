//! Render commands recorded per frame and the renderer they replay into.

use glam::{Quat, Vec3};

use crate::batch::{InstanceTransform, TrailVertex};
use crate::handles::{BatchHandle, DrawableHandle, GeometryHandle, MaterialHandle};

/// One instruction for the rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    CreateGeometry {
        handle: GeometryHandle,
        radius: f32,
    },
    DisposeGeometry(GeometryHandle),
    CreateMaterial {
        handle: MaterialHandle,
        color: [f32; 3],
    },
    DisposeMaterial(MaterialHandle),
    AddDrawable {
        handle: DrawableHandle,
        geometry: GeometryHandle,
        material: MaterialHandle,
    },
    RemoveDrawable(DrawableHandle),
    SetTransform {
        handle: DrawableHandle,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    },
    CreateInstancedBatch {
        handle: BatchHandle,
        color: [f32; 3],
        capacity: u32,
    },
    SetInstanceTransform {
        batch: BatchHandle,
        slot: u32,
        transform: InstanceTransform,
    },
    SetInstanceCount {
        batch: BatchHandle,
        count: u32,
    },
    RemoveInstancedBatch(BatchHandle),
    SetCamera {
        eye: Vec3,
        target: Vec3,
    },
    SetTrail(Vec<TrailVertex>),
}

/// The rendering surface the simulation drives.
pub trait Renderer {
    fn create_geometry(&mut self, handle: GeometryHandle, radius: f32);
    fn dispose_geometry(&mut self, handle: GeometryHandle);
    fn create_material(&mut self, handle: MaterialHandle, color: [f32; 3]);
    fn dispose_material(&mut self, handle: MaterialHandle);
    fn add_drawable(
        &mut self,
        handle: DrawableHandle,
        geometry: GeometryHandle,
        material: MaterialHandle,
    );
    fn remove_drawable(&mut self, handle: DrawableHandle);
    fn set_transform(
        &mut self,
        handle: DrawableHandle,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    );
    fn create_instanced_batch(&mut self, handle: BatchHandle, color: [f32; 3], capacity: u32);
    fn set_instance_transform(&mut self, batch: BatchHandle, slot: u32, transform: InstanceTransform);
    fn set_instance_count(&mut self, batch: BatchHandle, count: u32);
    fn remove_instanced_batch(&mut self, handle: BatchHandle);
    fn set_camera(&mut self, eye: Vec3, target: Vec3);
    fn set_trail(&mut self, vertices: &[TrailVertex]);
}

/// Ordered commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCommandList {
    commands: Vec<RenderCommand>,
}

impl RenderCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderCommand> {
        self.commands.iter()
    }

    /// Replay every command, in order, into `renderer`.
    pub fn submit(&self, renderer: &mut impl Renderer) {
        for command in &self.commands {
            match command {
                RenderCommand::CreateGeometry { handle, radius } => {
                    renderer.create_geometry(*handle, *radius)
                }
                RenderCommand::DisposeGeometry(handle) => renderer.dispose_geometry(*handle),
                RenderCommand::CreateMaterial { handle, color } => {
                    renderer.create_material(*handle, *color)
                }
                RenderCommand::DisposeMaterial(handle) => renderer.dispose_material(*handle),
                RenderCommand::AddDrawable {
                    handle,
                    geometry,
                    material,
                } => renderer.add_drawable(*handle, *geometry, *material),
                RenderCommand::RemoveDrawable(handle) => renderer.remove_drawable(*handle),
                RenderCommand::SetTransform {
                    handle,
                    position,
                    rotation,
                    scale,
                } => renderer.set_transform(*handle, *position, *rotation, *scale),
                RenderCommand::CreateInstancedBatch {
                    handle,
                    color,
                    capacity,
                } => renderer.create_instanced_batch(*handle, *color, *capacity),
                RenderCommand::SetInstanceTransform {
                    batch,
                    slot,
                    transform,
                } => renderer.set_instance_transform(*batch, *slot, *transform),
                RenderCommand::SetInstanceCount { batch, count } => {
                    renderer.set_instance_count(*batch, *count)
                }
                RenderCommand::RemoveInstancedBatch(handle) => {
                    renderer.remove_instanced_batch(*handle)
                }
                RenderCommand::SetCamera { eye, target } => renderer.set_camera(*eye, *target),
                RenderCommand::SetTrail(vertices) => renderer.set_trail(vertices),
            }
        }
    }
}

impl IntoIterator for RenderCommandList {
    type Item = RenderCommand;
    type IntoIter = std::vec::IntoIter<RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingRenderer;

    #[test]
    fn test_submit_replays_in_order() {
        let mut list = RenderCommandList::new();
        list.push(RenderCommand::CreateGeometry {
            handle: GeometryHandle(1),
            radius: 0.1,
        });
        list.push(RenderCommand::CreateMaterial {
            handle: MaterialHandle(2),
            color: [1.0, 0.0, 1.0],
        });
        list.push(RenderCommand::AddDrawable {
            handle: DrawableHandle(3),
            geometry: GeometryHandle(1),
            material: MaterialHandle(2),
        });
        list.push(RenderCommand::SetTransform {
            handle: DrawableHandle(3),
            position: Vec3::ONE,
            rotation: Quat::from_rotation_y(0.5),
            scale: 1.0,
        });

        let mut renderer = RecordingRenderer::new();
        list.submit(&mut renderer);
        assert_eq!(renderer.live_geometries(), 1);
        assert_eq!(renderer.live_materials(), 1);
        assert_eq!(renderer.live_drawables(), 1);
        assert_eq!(renderer.drawable_position(DrawableHandle(3)), Some(Vec3::ONE));
        assert_eq!(
            renderer.drawable_rotation(DrawableHandle(3)),
            Some(Quat::from_rotation_y(0.5))
        );
        assert!(renderer.violations().is_empty());
    }

    #[test]
    fn test_drawable_before_geometry_is_flagged() {
        let mut list = RenderCommandList::new();
        list.push(RenderCommand::AddDrawable {
            handle: DrawableHandle(3),
            geometry: GeometryHandle(1),
            material: MaterialHandle(2),
        });
        let mut renderer = RecordingRenderer::new();
        list.submit(&mut renderer);
        assert!(!renderer.violations().is_empty());
    }
}
