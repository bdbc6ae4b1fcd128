//! Streams cluster instances in ahead of the traveler and out behind it.

use std::sync::Arc;

use glam::Vec3;
use starwake_config::ActivationConfig;
use starwake_path::{SeededRandom, TravelPath};
use starwake_render::RenderContext;
use starwake_space::{ClusterTemplate, SizeCategoryTable};

use crate::instance::{ClusterId, ClusterInstance, ClusterRotation, ClusterState};
use crate::presenter::ClusterPresenter;

/// Clusters spawned and evicted during one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub spawned: Vec<ClusterId>,
    pub evicted: Vec<ClusterId>,
}

/// Owns the active set of cluster instances.
pub struct ActivationManager {
    config: ActivationConfig,
    templates: Vec<Arc<ClusterTemplate>>,
    sizes: SizeCategoryTable,
    rng: SeededRandom,
    active: Vec<ClusterInstance>,
    next_id: u64,
}

impl ActivationManager {
    pub fn new(
        config: ActivationConfig,
        templates: Vec<Arc<ClusterTemplate>>,
        sizes: SizeCategoryTable,
        rng: SeededRandom,
    ) -> Self {
        let capacity = config.max_active;
        Self {
            config,
            templates,
            sizes,
            rng,
            active: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Distance beyond which clusters are evicted.
    pub fn cleanup_distance(&self) -> f32 {
        self.config.render_distance * self.config.cleanup_multiplier
    }

    pub fn clusters(&self) -> &[ClusterInstance] {
        &self.active
    }

    pub fn clusters_mut(&mut self) -> &mut [ClusterInstance] {
        &mut self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Evict distant clusters, then try to spawn new ones ahead of the traveler.
    pub fn update(
        &mut self,
        path: &TravelPath,
        traveler: Vec3,
        presenter: &ClusterPresenter,
        ctx: &mut RenderContext,
    ) -> ActivationReport {
        let mut report = ActivationReport::default();
        self.evict_distant(traveler, presenter, ctx, &mut report);
        self.spawn_ahead(path, traveler, &mut report);
        report
    }

    fn evict_distant(
        &mut self,
        traveler: Vec3,
        presenter: &ClusterPresenter,
        ctx: &mut RenderContext,
        report: &mut ActivationReport,
    ) {
        let cleanup = self.cleanup_distance();
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].distance_to(traveler) > cleanup {
                let mut cluster = self.active.remove(i);
                presenter.unrender(&mut cluster, ctx);
                cluster.state = ClusterState::Evicted;
                tracing::debug!(cluster = cluster.id.0, "evicted cluster");
                report.evicted.push(cluster.id);
            } else {
                i += 1;
            }
        }
    }

    fn spawn_ahead(&mut self, path: &TravelPath, traveler: Vec3, report: &mut ActivationReport) {
        if path.is_empty() || self.templates.is_empty() {
            return;
        }
        let closest = path.closest_index(traveler);
        let len = path.len();
        let behind = self.config.look_behind;
        let window = behind + self.config.look_ahead;
        let cleanup = self.cleanup_distance();

        for _ in 0..self.config.spawn_attempts {
            if self.active.len() >= self.config.max_active {
                break;
            }
            // Samples at or behind the traveler use up the attempt.
            let step = self.rng.index(window + 1);
            if step <= behind {
                continue;
            }
            let index = (closest + step - behind) % len;
            if index == closest {
                continue;
            }
            let Some(point) = path.point(index) else {
                continue;
            };

            let magnitude = self.rng.next_f32() * self.config.offset_range + self.config.offset_base;
            let offset = Vec3::new(
                self.rng.centered() * magnitude,
                self.rng.centered() * magnitude * self.config.vertical_offset_scale,
                self.rng.centered() * magnitude,
            );
            let center = point + offset;
            if center.distance(traveler) > cleanup {
                continue;
            }
            if self
                .active
                .iter()
                .any(|c| c.center.distance(center) < self.config.min_separation)
            {
                continue;
            }

            let template = self.templates[self.rng.index(self.templates.len())].clone();
            let rotation = self.roll_rotation();
            self.next_id += 1;
            let id = ClusterId(self.next_id);
            tracing::debug!(
                cluster = id.0,
                path_index = index,
                template = template.id,
                stars = template.len(),
                "spawned cluster"
            );
            self.active.push(ClusterInstance::new(
                id,
                template,
                center,
                index,
                rotation,
                &self.sizes,
            ));
            report.spawned.push(id);
        }
    }

    fn roll_rotation(&mut self) -> Option<ClusterRotation> {
        if !self.rng.chance(self.config.rotation_chance) {
            return None;
        }
        let axis = Vec3::new(self.rng.centered(), self.rng.centered(), self.rng.centered())
            .try_normalize()
            .unwrap_or(Vec3::Y);
        let [min, max] = self.config.angular_speed;
        Some(ClusterRotation {
            axis,
            angular_speed: self.rng.range(min, max),
        })
    }

    /// Evict every cluster.
    pub fn clear(&mut self, presenter: &ClusterPresenter, ctx: &mut RenderContext) -> Vec<ClusterId> {
        self.active
            .drain(..)
            .map(|mut cluster| {
                presenter.unrender(&mut cluster, ctx);
                cluster.id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::StarRender;
    use starwake_config::{LodConfig, PathConfig, StarConfig, TemplateConfig};
    use starwake_path::{SPAWN_STREAM, WORLD_STREAM};
    use starwake_render::{RecordingRenderer, RenderPool};
    use starwake_space::ClusterTemplateFactory;

    struct Fixture {
        path: TravelPath,
        manager: ActivationManager,
        presenter: ClusterPresenter,
        ctx: RenderContext,
    }

    fn fixture(config: ActivationConfig) -> Fixture {
        let mut world = SeededRandom::with_stream(42, WORLD_STREAM);
        let path = TravelPath::generate(&PathConfig::default(), &mut world);
        let stars = StarConfig::default();
        let sizes = SizeCategoryTable::from_config(&stars).unwrap();
        let template_config = TemplateConfig {
            template_count: 4,
            star_count: [60, 80],
            ..Default::default()
        };
        let templates = ClusterTemplateFactory::new(&template_config, &stars, &sizes)
            .build_pool(&mut world);
        let presenter = ClusterPresenter::new(&LodConfig::default(), config.render_distance);
        let manager = ActivationManager::new(
            config,
            templates,
            sizes,
            SeededRandom::with_stream(42, SPAWN_STREAM),
        );
        Fixture {
            path,
            manager,
            presenter,
            ctx: RenderContext::new(RenderPool::new(4096, 0.01)),
        }
    }

    /// Path steps from `closest` forward to `index`, wrapping at the end.
    fn steps_ahead(path: &TravelPath, closest: usize, index: usize) -> usize {
        (index + path.len() - closest) % path.len()
    }

    #[test]
    fn test_spawns_only_ahead_of_traveler() {
        let mut f = fixture(ActivationConfig::default());
        let look_ahead = ActivationConfig::default().look_ahead;
        for step in 0..400 {
            let traveler = f.path.position_at(step as f32 * 2.0);
            let closest = f.path.closest_index(traveler);
            let report = f.manager.update(&f.path, traveler, &f.presenter, &mut f.ctx);
            for id in report.spawned {
                let cluster = f.manager.clusters().iter().find(|c| c.id == id).unwrap();
                let ahead = steps_ahead(&f.path, closest, cluster.path_index);
                assert!(ahead > 0 && ahead <= look_ahead);
            }
        }
    }

    #[test]
    fn test_active_set_is_bounded() {
        let config = ActivationConfig {
            max_active: 3,
            min_separation: 0.0,
            spawn_attempts: 8,
            ..Default::default()
        };
        let mut f = fixture(config);
        for step in 0..300 {
            let traveler = f.path.position_at(step as f32);
            f.manager.update(&f.path, traveler, &f.presenter, &mut f.ctx);
            assert!(f.manager.active_count() <= 3);
        }
    }

    #[test]
    fn test_centers_respect_separation() {
        let mut f = fixture(ActivationConfig::default());
        for step in 0..600 {
            let traveler = f.path.position_at(step as f32 * 3.0);
            f.manager.update(&f.path, traveler, &f.presenter, &mut f.ctx);
            let clusters = f.manager.clusters();
            for (i, a) in clusters.iter().enumerate() {
                for b in &clusters[i + 1..] {
                    assert!(a.center.distance(b.center) >= 40.0);
                }
            }
        }
    }

    #[test]
    fn test_far_clusters_are_evicted() {
        let mut f = fixture(ActivationConfig::default());
        let start = f.path.position_at(0.0);
        for _ in 0..50 {
            f.manager.update(&f.path, start, &f.presenter, &mut f.ctx);
        }
        assert!(f.manager.active_count() > 0);
        let spawned: Vec<ClusterId> = f.manager.clusters().iter().map(|c| c.id).collect();

        let far = start + Vec3::new(0.0, 0.0, 10_000.0);
        let report = f.manager.update(&f.path, far, &f.presenter, &mut f.ctx);
        for id in spawned {
            assert!(report.evicted.contains(&id));
        }
    }

    #[test]
    fn test_eviction_returns_render_resources() {
        let mut f = fixture(ActivationConfig::default());
        let mut renderer = RecordingRenderer::new();
        let start = f.path.position_at(0.0);
        for _ in 0..50 {
            f.manager.update(&f.path, start, &f.presenter, &mut f.ctx);
            let clusters = f.manager.clusters_mut();
            f.presenter.update(clusters, &mut f.ctx, start, start, 1.0);
        }
        f.ctx.take_commands().submit(&mut renderer);
        assert!(renderer.live_drawables() + renderer.live_batches() > 0);
        let meshes = f
            .manager
            .clusters()
            .iter()
            .flat_map(|c| c.rendered_stars())
            .filter(|s| matches!(s.render, Some(StarRender::Mesh(_))))
            .count();
        let before = f.ctx.pool_stats();

        let far = start + Vec3::new(0.0, 0.0, 10_000.0);
        f.manager.update(&f.path, far, &f.presenter, &mut f.ctx);
        f.ctx.take_commands().submit(&mut renderer);

        let after = f.ctx.pool_stats();
        assert_eq!(after.geometries_pooled, before.geometries_pooled + meshes);
        assert_eq!(after.materials_pooled, before.materials_pooled + meshes);

        assert_eq!(f.manager.active_count(), 0);
        assert_eq!(renderer.live_drawables(), 0);
        assert_eq!(renderer.live_batches(), 0);
        let stats = f.ctx.pool_stats();
        assert_eq!(stats.geometries_in_use, 0);
        assert!(stats.is_balanced());
        assert!(renderer.violations().is_empty());
    }

    #[test]
    fn test_spawn_window_wraps_past_path_end() {
        let config = ActivationConfig {
            min_separation: 0.0,
            spawn_attempts: 4,
            ..Default::default()
        };
        let look_ahead = config.look_ahead;
        let mut f = fixture(config);
        f.path = TravelPath::from_points(
            (0..40)
                .map(|i| {
                    let angle = i as f32 / 40.0 * std::f32::consts::TAU;
                    Vec3::new(angle.cos() * 60.0, 0.0, angle.sin() * 60.0)
                })
                .collect(),
        );
        let last = f.path.len() - 1;
        let end = f.path.point(last).unwrap();

        let mut spawned = 0;
        for _ in 0..100 {
            let report = f.manager.update(&f.path, end, &f.presenter, &mut f.ctx);
            for id in report.spawned {
                let cluster = f.manager.clusters().iter().find(|c| c.id == id).unwrap();
                assert!(cluster.path_index < look_ahead);
                let ahead = steps_ahead(&f.path, last, cluster.path_index);
                assert!(ahead > 0 && ahead <= look_ahead);
                spawned += 1;
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_clear_evicts_everything() {
        let mut f = fixture(ActivationConfig::default());
        let start = f.path.position_at(0.0);
        for _ in 0..20 {
            f.manager.update(&f.path, start, &f.presenter, &mut f.ctx);
        }
        let count = f.manager.active_count();
        let cleared = f.manager.clear(&f.presenter, &mut f.ctx);
        assert_eq!(cleared.len(), count);
        assert_eq!(f.manager.active_count(), 0);
    }
}
