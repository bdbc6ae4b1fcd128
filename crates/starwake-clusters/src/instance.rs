//! A template placed at a world position, with per-star live state.

use std::sync::Arc;

use glam::Vec3;
use starwake_lod::Representation;
use starwake_render::{ColorKey, InstancedBatch, MeshSlot};
use starwake_space::{ClusterTemplate, SizeCategoryTable, StarSizeCategory};

/// Unique id of a cluster instance. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub u64);

/// Lifecycle of a cluster instance. Inactive clusters simply do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    /// Tracked but holds no draw resources.
    ActiveUnrendered,
    /// Holds draw resources for its rendered stars.
    ActiveRendered,
    /// Resources returned; about to be dropped.
    Evicted,
}

/// Draw resources held by one rendered star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarRender {
    Mesh(MeshSlot),
    /// Slot in `ClusterInstance::batches[batch]`.
    Instance { batch: usize, slot: u32 },
}

/// Simulated state of one star.
#[derive(Debug, Clone)]
pub struct StarState {
    /// Absolute world position.
    pub position: Vec3,
    /// Rest position, fixed at instantiation.
    pub original_pos: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub color: ColorKey,
    pub category: StarSizeCategory,
    pub mass: f32,
    pub inverse_mass: f32,
    pub damping: f32,
    pub render: Option<StarRender>,
    /// Position changed since the last transform sync.
    pub dirty: bool,
}

impl StarState {
    /// Put the star back at rest.
    pub fn reset(&mut self) {
        self.position = self.original_pos;
        self.velocity = Vec3::ZERO;
        self.dirty = false;
    }
}

/// Cosmetic spin applied to the displayed positions of drifting clusters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterRotation {
    /// Unit axis.
    pub axis: Vec3,
    /// Radians per frame.
    pub angular_speed: f32,
}

/// A live placement of a shared template.
#[derive(Debug)]
pub struct ClusterInstance {
    pub id: ClusterId,
    pub template: Arc<ClusterTemplate>,
    pub center: Vec3,
    /// Path index the cluster was spawned from.
    pub path_index: usize,
    pub state: ClusterState,
    /// `None` while unrendered.
    pub representation: Option<Representation>,
    /// One entry per template star; the first `rendered_count` are drawn.
    pub stars: Vec<StarState>,
    pub rendered_count: usize,
    /// LOD bucket `rendered_count` was chosen from; `None` while unrendered.
    pub lod_bucket: Option<usize>,
    pub batches: Vec<InstancedBatch>,
    pub rotation: Option<ClusterRotation>,
    /// Displayed positions currently differ from simulated ones.
    pub display_offset: bool,
}

impl ClusterInstance {
    /// Place `template` at `center`. Star positions are template offsets plus the center.
    pub fn new(
        id: ClusterId,
        template: Arc<ClusterTemplate>,
        center: Vec3,
        path_index: usize,
        rotation: Option<ClusterRotation>,
        sizes: &SizeCategoryTable,
    ) -> Self {
        let stars = template
            .stars
            .iter()
            .map(|entry| {
                let props = sizes.properties(entry.category);
                let position = center + entry.offset;
                StarState {
                    position,
                    original_pos: position,
                    velocity: Vec3::ZERO,
                    size: entry.size,
                    color: entry.color,
                    category: entry.category,
                    mass: props.mass,
                    inverse_mass: props.inverse_mass,
                    damping: props.damping,
                    render: None,
                    dirty: false,
                }
            })
            .collect();

        Self {
            id,
            template,
            center,
            path_index,
            state: ClusterState::ActiveUnrendered,
            representation: None,
            stars,
            rendered_count: 0,
            lod_bucket: None,
            batches: Vec::new(),
            rotation,
            display_offset: false,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.state == ClusterState::ActiveRendered
    }

    /// Stars currently holding draw resources.
    pub fn rendered_stars(&self) -> &[StarState] {
        &self.stars[..self.rendered_count]
    }

    pub fn rendered_stars_mut(&mut self) -> &mut [StarState] {
        &mut self.stars[..self.rendered_count]
    }

    /// Distance from the cluster center to `point`.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.center.distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starwake_config::{StarConfig, TemplateConfig};
    use starwake_path::SeededRandom;
    use starwake_space::ClusterTemplateFactory;

    #[test]
    fn test_positions_are_offset_by_center() {
        let stars = StarConfig::default();
        let sizes = SizeCategoryTable::from_config(&stars).unwrap();
        let templates = TemplateConfig::default();
        let factory = ClusterTemplateFactory::new(&templates, &stars, &sizes);
        let template = Arc::new(factory.build(0, &mut SeededRandom::new(5)));
        let center = Vec3::new(10.0, -4.0, 300.0);

        let instance =
            ClusterInstance::new(ClusterId(1), template.clone(), center, 20, None, &sizes);

        assert_eq!(instance.stars.len(), template.len());
        assert_eq!(instance.state, ClusterState::ActiveUnrendered);
        assert!(instance.rendered_stars().is_empty());
        for (star, entry) in instance.stars.iter().zip(&template.stars) {
            assert!((star.position - (center + entry.offset)).length() < 1e-4);
            assert_eq!(star.original_pos, star.position);
            assert_eq!(star.mass, sizes.properties(entry.category).mass);
        }
    }
}
