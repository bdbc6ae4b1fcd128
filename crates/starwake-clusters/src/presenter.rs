//! Applies LOD decisions to cluster instances through the render context.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use starwake_config::LodConfig;
use starwake_lod::{DriftClock, LodSelector, Representation, choose_representation, drift_offset};
use starwake_render::{ColorKey, InstanceTransform, InstancedBatch, RenderContext};

use crate::instance::{ClusterInstance, ClusterState, StarRender, StarState};

/// Counts of presentation changes in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentReport {
    pub rendered: usize,
    pub unrendered: usize,
    pub rerendered: usize,
    /// Rendered clusters whose star count changed with their LOD bucket.
    pub resized: usize,
}

/// Renders, unrenders and re-renders clusters; syncs their displayed positions.
#[derive(Debug, Clone)]
pub struct ClusterPresenter {
    selector: LodSelector,
    render_distance: f32,
    bucket_hysteresis: f32,
    sprite_distance: f32,
    sprite_hysteresis: f32,
    sprite_scale: f32,
    batch_capacity: usize,
    drift_amplitude: f32,
}

impl ClusterPresenter {
    pub fn new(lod: &LodConfig, render_distance: f32) -> Self {
        Self {
            selector: LodSelector::from_config(lod),
            render_distance,
            bucket_hysteresis: lod.bucket_hysteresis,
            sprite_distance: lod.sprite_distance,
            sprite_hysteresis: lod.sprite_hysteresis,
            sprite_scale: lod.sprite_scale,
            batch_capacity: lod.batch_capacity.max(1),
            drift_amplitude: lod.drift_amplitude,
        }
    }

    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut LodSelector {
        &mut self.selector
    }

    /// Render clusters that came within range, unrender those that left it,
    /// re-render those whose representation flips, and grow or shrink the
    /// rendered prefix of those that changed LOD bucket.
    pub fn update(
        &self,
        clusters: &mut [ClusterInstance],
        ctx: &mut RenderContext,
        traveler: Vec3,
        camera: Vec3,
        quality: f32,
    ) -> PresentReport {
        let mut report = PresentReport::default();
        for cluster in clusters.iter_mut() {
            let distance = cluster.distance_to(traveler);
            let camera_distance = cluster.distance_to(camera);
            let state = cluster.state;
            match state {
                ClusterState::ActiveRendered if distance > self.render_distance => {
                    self.unrender(cluster, ctx);
                    report.unrendered += 1;
                }
                ClusterState::ActiveRendered => {
                    let next = choose_representation(
                        cluster.representation,
                        camera_distance,
                        self.sprite_distance,
                        self.sprite_hysteresis,
                    );
                    let bucket = self.selector.select_bucket_with_hysteresis(
                        cluster.lod_bucket,
                        distance,
                        self.bucket_hysteresis,
                    );
                    if cluster.representation != Some(next) {
                        self.release(cluster, ctx);
                        self.render(cluster, ctx, next, bucket, quality);
                        report.rerendered += 1;
                    } else if cluster.lod_bucket != Some(bucket)
                        && self.resize(cluster, ctx, bucket, quality)
                    {
                        report.resized += 1;
                    }
                }
                ClusterState::ActiveUnrendered if distance < self.render_distance => {
                    let representation = choose_representation(
                        None,
                        camera_distance,
                        self.sprite_distance,
                        self.sprite_hysteresis,
                    );
                    let bucket = self.selector.select_bucket(distance);
                    self.render(cluster, ctx, representation, bucket, quality);
                    report.rendered += 1;
                }
                _ => {}
            }
        }
        report
    }

    /// Acquire draw resources for the prefix of the cluster's stars that
    /// `bucket` selects. Stars past the prefix are put back at rest.
    pub fn render(
        &self,
        cluster: &mut ClusterInstance,
        ctx: &mut RenderContext,
        representation: Representation,
        bucket: usize,
        quality: f32,
    ) {
        let count = self
            .selector
            .star_count_for_bucket(cluster.stars.len(), bucket, quality);
        cluster.rendered_count = count;
        cluster.lod_bucket = Some(bucket);
        for star in &mut cluster.stars[count..] {
            star.reset();
        }
        match representation {
            Representation::Mesh => {
                for star in cluster.rendered_stars_mut() {
                    Self::add_star_mesh(ctx, star);
                }
            }
            Representation::Sprite => self.render_sprites(cluster, ctx),
        }
        cluster.representation = Some(representation);
        cluster.state = ClusterState::ActiveRendered;
        tracing::trace!(
            cluster = cluster.id.0,
            stars = count,
            bucket,
            ?representation,
            "rendered cluster"
        );
    }

    fn add_star_mesh(ctx: &mut RenderContext, star: &mut StarState) {
        let slot = ctx.add_mesh(star.size, star.color, star.position, 1.0);
        star.render = Some(StarRender::Mesh(slot));
        star.dirty = false;
    }

    /// Move a rendered cluster to `bucket`, adding or removing draw resources
    /// at the end of the rendered prefix. Returns whether the count changed.
    fn resize(
        &self,
        cluster: &mut ClusterInstance,
        ctx: &mut RenderContext,
        bucket: usize,
        quality: f32,
    ) -> bool {
        cluster.lod_bucket = Some(bucket);
        let old = cluster.rendered_count;
        let count = self
            .selector
            .star_count_for_bucket(cluster.stars.len(), bucket, quality);
        if count == old {
            return false;
        }

        match cluster.representation {
            Some(Representation::Mesh) if count > old => {
                for star in &mut cluster.stars[old..count] {
                    Self::add_star_mesh(ctx, star);
                }
            }
            Some(Representation::Mesh) => {
                for star in &mut cluster.stars[count..old] {
                    if let Some(StarRender::Mesh(slot)) = star.render.take() {
                        ctx.remove_mesh(slot);
                    }
                    star.reset();
                }
            }
            Some(Representation::Sprite) => {
                for batch in cluster.batches.drain(..) {
                    ctx.remove_batch(&batch);
                }
                for star in &mut cluster.stars[..old] {
                    star.render = None;
                }
                if count < old {
                    for star in &mut cluster.stars[count..old] {
                        star.reset();
                    }
                }
                cluster.rendered_count = count;
                self.render_sprites(cluster, ctx);
            }
            None => return false,
        }
        cluster.rendered_count = count;
        tracing::trace!(
            cluster = cluster.id.0,
            bucket,
            from = old,
            to = count,
            "resized cluster"
        );
        true
    }

    fn render_sprites(&self, cluster: &mut ClusterInstance, ctx: &mut RenderContext) {
        let ClusterInstance {
            stars,
            batches,
            rendered_count,
            ..
        } = cluster;
        let mut open: FxHashMap<ColorKey, usize> = FxHashMap::default();

        for star in &mut stars[..*rendered_count] {
            let index = match open.get(&star.color) {
                Some(&i) if !batches[i].is_full() => i,
                _ => {
                    batches.push(ctx.create_batch(star.color, self.batch_capacity));
                    let i = batches.len() - 1;
                    open.insert(star.color, i);
                    i
                }
            };
            let batch = &mut batches[index];
            let Some(slot) = batch.push_slot() else {
                continue;
            };
            ctx.set_instance(
                batch.handle,
                slot,
                InstanceTransform::new(star.position, star.size * self.sprite_scale),
            );
            star.render = Some(StarRender::Instance { batch: index, slot });
            star.dirty = false;
        }

        for batch in batches.iter() {
            ctx.set_instance_count(batch.handle, batch.len() as u32);
        }
    }

    /// Free the cluster's draw resources. Simulated star state is kept.
    fn release(&self, cluster: &mut ClusterInstance, ctx: &mut RenderContext) {
        for star in cluster.rendered_stars_mut() {
            if let Some(StarRender::Mesh(slot)) = star.render.take() {
                ctx.remove_mesh(slot);
            }
        }
        for batch in cluster.batches.drain(..) {
            ctx.remove_batch(&batch);
        }
        cluster.rendered_count = 0;
        cluster.lod_bucket = None;
        cluster.representation = None;
        cluster.display_offset = false;
    }

    /// Return all draw resources and put the stars back at rest.
    pub fn unrender(&self, cluster: &mut ClusterInstance, ctx: &mut RenderContext) {
        for star in cluster.rendered_stars_mut() {
            star.reset();
        }
        self.release(cluster, ctx);
        if cluster.state == ClusterState::ActiveRendered {
            cluster.state = ClusterState::ActiveUnrendered;
        }
    }

    /// Push transforms for stars moved since the last sync. Returns how many.
    pub fn sync_dirty(&self, cluster: &mut ClusterInstance, ctx: &mut RenderContext) -> usize {
        let ClusterInstance {
            stars,
            batches,
            rendered_count,
            ..
        } = cluster;
        let mut synced = 0;
        for star in &mut stars[..*rendered_count] {
            if star.dirty {
                self.show(ctx, batches, star, star.position, Quat::IDENTITY);
                star.dirty = false;
                synced += 1;
            }
        }
        synced
    }

    /// Wobble (and optionally spin) the displayed positions without touching
    /// the simulated state.
    pub fn apply_drift(
        &self,
        cluster: &mut ClusterInstance,
        ctx: &mut RenderContext,
        clock: &DriftClock,
    ) {
        if !cluster.is_rendered() {
            return;
        }
        let spin = cluster.rotation.map(|rotation| {
            let angle = (rotation.angular_speed as f64 * clock.frames() as f64)
                % std::f64::consts::TAU;
            Quat::from_axis_angle(rotation.axis, angle as f32)
        });
        for star in cluster.rendered_stars() {
            let mut shown = star.position;
            if let Some(spin) = spin {
                shown = cluster.center + spin * (shown - cluster.center);
            }
            shown += drift_offset(clock, star.original_pos, self.drift_amplitude);
            self.show(
                ctx,
                &cluster.batches,
                star,
                shown,
                spin.unwrap_or(Quat::IDENTITY),
            );
        }
        cluster.display_offset = true;
    }

    /// After drifting, mark every rendered star dirty so the next sync shows
    /// the simulated positions again.
    pub fn restore_display(&self, cluster: &mut ClusterInstance) {
        if !cluster.display_offset {
            return;
        }
        for star in cluster.rendered_stars_mut() {
            star.dirty = true;
        }
        cluster.display_offset = false;
    }

    fn show(
        &self,
        ctx: &mut RenderContext,
        batches: &[InstancedBatch],
        star: &StarState,
        position: Vec3,
        rotation: Quat,
    ) {
        match star.render {
            Some(StarRender::Mesh(slot)) => {
                ctx.set_transform(slot.drawable, position, rotation, 1.0)
            }
            Some(StarRender::Instance { batch, slot }) => {
                if let Some(batch) = batches.get(batch) {
                    ctx.set_instance(
                        batch.handle,
                        slot,
                        InstanceTransform::new(position, star.size * self.sprite_scale),
                    );
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::instance::{ClusterId, ClusterRotation};
    use starwake_config::{StarConfig, TemplateConfig};
    use starwake_path::SeededRandom;
    use starwake_render::{RecordingRenderer, RenderPool};
    use starwake_space::{ClusterTemplateFactory, SizeCategoryTable};

    fn cluster_at(center: Vec3) -> ClusterInstance {
        spinning_cluster_at(center, None)
    }

    fn spinning_cluster_at(center: Vec3, rotation: Option<ClusterRotation>) -> ClusterInstance {
        let stars = StarConfig::default();
        let sizes = SizeCategoryTable::from_config(&stars).unwrap();
        let templates = TemplateConfig::default();
        let factory = ClusterTemplateFactory::new(&templates, &stars, &sizes);
        let template = Arc::new(factory.build(0, &mut SeededRandom::new(8)));
        ClusterInstance::new(ClusterId(1), template, center, 0, rotation, &sizes)
    }

    fn setup() -> (ClusterPresenter, RenderContext, RecordingRenderer) {
        (
            ClusterPresenter::new(&LodConfig::default(), 100.0),
            RenderContext::new(RenderPool::new(4096, 0.01)),
            RecordingRenderer::new(),
        )
    }

    #[test]
    fn test_close_cluster_renders_as_meshes() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 10.0))];
        let report = presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);

        assert_eq!(report.rendered, 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.representation, Some(Representation::Mesh));
        assert_eq!(cluster.rendered_count, cluster.stars.len());
        ctx.take_commands().submit(&mut renderer);
        assert_eq!(renderer.live_drawables(), cluster.rendered_count);
        assert!(renderer.violations().is_empty());
    }

    #[test]
    fn test_far_camera_renders_as_sprites_in_batches() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 50.0))];
        let camera = Vec3::new(0.0, 0.0, -40.0);
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, camera, 1.0);

        let cluster = &clusters[0];
        assert_eq!(cluster.representation, Some(Representation::Sprite));
        assert!(!cluster.batches.is_empty());
        for batch in &cluster.batches {
            assert!(batch.len() <= 1000);
        }
        ctx.take_commands().submit(&mut renderer);
        assert_eq!(renderer.live_drawables(), 0);
        assert_eq!(renderer.live_instances(), cluster.rendered_count);
        assert!(renderer.violations().is_empty());
    }

    #[test]
    fn test_distance_reduces_star_count() {
        let (presenter, mut ctx, _) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 80.0))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);
        let cluster = &clusters[0];
        let expected = (cluster.stars.len() as f32 * 0.5).round() as usize;
        assert_eq!(cluster.rendered_count, expected);
    }

    #[test]
    fn test_leaving_range_returns_resources() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 10.0))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);
        let traveler = Vec3::new(0.0, 0.0, 500.0);
        let report = presenter.update(&mut clusters, &mut ctx, traveler, traveler, 1.0);

        assert_eq!(report.unrendered, 1);
        assert_eq!(clusters[0].state, ClusterState::ActiveUnrendered);
        ctx.take_commands().submit(&mut renderer);
        assert_eq!(renderer.live_drawables(), 0);
        let stats = ctx.pool_stats();
        assert_eq!(stats.geometries_in_use, 0);
        assert_eq!(stats.materials_in_use, 0);
        assert!(stats.is_balanced());
    }

    #[test]
    fn test_representation_flip_rerenders() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 10.0))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);
        // Inside the hysteresis band: no change.
        let camera = Vec3::new(0.0, 0.0, 10.0 - 63.0);
        let report = presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, camera, 1.0);
        assert_eq!(report.rerendered, 0);
        // Beyond the band: flips to sprites.
        let camera = Vec3::new(0.0, 0.0, 10.0 - 70.0);
        let report = presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, camera, 1.0);
        assert_eq!(report.rerendered, 1);
        assert_eq!(clusters[0].representation, Some(Representation::Sprite));

        ctx.take_commands().submit(&mut renderer);
        assert_eq!(renderer.live_drawables(), 0);
        assert!(renderer.violations().is_empty());
    }

    #[test]
    fn test_drift_does_not_touch_simulated_state() {
        let (presenter, mut ctx, _) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 10.0))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);
        let before: Vec<Vec3> = clusters[0].stars.iter().map(|s| s.position).collect();

        let mut clock = DriftClock::new(0.02);
        for _ in 0..77 {
            clock.advance();
        }
        presenter.apply_drift(&mut clusters[0], &mut ctx, &clock);
        let after: Vec<Vec3> = clusters[0].stars.iter().map(|s| s.position).collect();
        assert_eq!(before, after);
        assert!(clusters[0].display_offset);

        presenter.restore_display(&mut clusters[0]);
        let synced = presenter.sync_dirty(&mut clusters[0], &mut ctx);
        assert_eq!(synced, clusters[0].rendered_count);
    }

    #[test]
    fn test_approaching_cluster_reaches_full_detail() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::ZERO)];
        for step in 0..=16 {
            let traveler = Vec3::new(0.0, 0.0, 90.0 - step as f32 * 5.0);
            presenter.update(&mut clusters, &mut ctx, traveler, traveler, 1.0);
            ctx.take_commands().submit(&mut renderer);
        }

        let cluster = &clusters[0];
        assert_eq!(cluster.lod_bucket, Some(0));
        assert_eq!(cluster.representation, Some(Representation::Mesh));
        assert_eq!(cluster.rendered_count, cluster.stars.len());
        assert_eq!(renderer.live_drawables(), cluster.stars.len());
        assert_eq!(renderer.live_batches(), 0);
        assert!(renderer.violations().is_empty(), "{:?}", renderer.violations());
    }

    #[test]
    fn test_mesh_cluster_grows_as_it_nears() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::ZERO)];
        let mut resized = 0;
        for step in 0..=16 {
            let traveler = Vec3::new(0.0, 0.0, 90.0 - step as f32 * 5.0);
            let report = presenter.update(&mut clusters, &mut ctx, traveler, Vec3::ZERO, 1.0);
            assert_eq!(report.rerendered, 0);
            resized += report.resized;
            ctx.take_commands().submit(&mut renderer);

            let cluster = &clusters[0];
            assert_eq!(renderer.live_drawables(), cluster.rendered_count);
            assert_eq!(ctx.pool_stats().geometries_in_use, cluster.rendered_count);
            assert!(cluster.rendered_stars().iter().all(|s| s.render.is_some()));
            assert!(cluster.stars[cluster.rendered_count..].iter().all(|s| s.render.is_none()));
        }
        // The edges at 60 and 30 are crossed on the way in.
        assert_eq!(resized, 2);
        assert_eq!(clusters[0].rendered_count, clusters[0].stars.len());
    }

    #[test]
    fn test_sprite_cluster_rebuckets() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::ZERO)];
        let camera = Vec3::new(0.0, 0.0, -200.0);
        for step in 0..=16 {
            let traveler = Vec3::new(0.0, 0.0, 90.0 - step as f32 * 5.0);
            presenter.update(&mut clusters, &mut ctx, traveler, camera, 1.0);
            ctx.take_commands().submit(&mut renderer);
            assert_eq!(renderer.live_instances(), clusters[0].rendered_count);
            assert_eq!(renderer.live_batches(), clusters[0].batches.len());
        }

        let cluster = &clusters[0];
        assert_eq!(cluster.representation, Some(Representation::Sprite));
        assert_eq!(cluster.rendered_count, cluster.stars.len());
        assert!(renderer.violations().is_empty(), "{:?}", renderer.violations());
    }

    #[test]
    fn test_receding_cluster_shrinks_and_rests_hidden_stars() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::ZERO)];
        let near = Vec3::new(0.0, 0.0, 10.0);
        presenter.update(&mut clusters, &mut ctx, near, Vec3::ZERO, 1.0);
        let len = clusters[0].stars.len();
        let last = clusters[0].stars.last_mut().unwrap();
        last.position += Vec3::X;
        last.velocity = Vec3::new(0.5, 0.0, 0.0);

        let far = Vec3::new(0.0, 0.0, 90.0);
        let report = presenter.update(&mut clusters, &mut ctx, far, Vec3::ZERO, 1.0);
        ctx.take_commands().submit(&mut renderer);

        assert_eq!(report.resized, 1);
        let cluster = &clusters[0];
        let expected = (len as f32 * 0.5).round() as usize;
        assert_eq!(cluster.rendered_count, expected);
        assert_eq!(cluster.lod_bucket, Some(2));
        let last = cluster.stars.last().unwrap();
        assert_eq!(last.position, last.original_pos);
        assert_eq!(last.velocity, Vec3::ZERO);
        assert!(last.render.is_none());

        let stats = ctx.pool_stats();
        assert_eq!(stats.geometries_in_use, expected);
        assert!(stats.is_balanced());
        assert_eq!(renderer.live_drawables(), expected);
    }

    #[test]
    fn test_bucket_edge_jitter_does_not_resize() {
        let (presenter, mut ctx, _) = setup();
        let mut clusters = vec![cluster_at(Vec3::ZERO)];
        presenter.update(&mut clusters, &mut ctx, Vec3::new(0.0, 0.0, 31.0), Vec3::ZERO, 1.0);
        assert_eq!(clusters[0].lod_bucket, Some(1));
        for step in 0..20 {
            let z = if step % 2 == 0 { 29.0 } else { 31.0 };
            let traveler = Vec3::new(0.0, 0.0, z);
            let report = presenter.update(&mut clusters, &mut ctx, traveler, Vec3::ZERO, 1.0);
            assert_eq!(report.resized, 0);
        }
        assert_eq!(clusters[0].lod_bucket, Some(1));
    }

    #[test]
    fn test_representation_flip_keeps_simulated_state() {
        let (presenter, mut ctx, mut renderer) = setup();
        let mut clusters = vec![cluster_at(Vec3::new(0.0, 0.0, 10.0))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);
        let star = &mut clusters[0].stars[0];
        let displaced = star.position + Vec3::new(0.4, -0.2, 0.0);
        star.position = displaced;
        star.velocity = Vec3::new(0.3, 0.0, 0.1);

        let camera = Vec3::new(0.0, 0.0, 10.0 - 70.0);
        let report = presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, camera, 1.0);
        assert_eq!(report.rerendered, 1);

        let cluster = &clusters[0];
        assert_eq!(cluster.representation, Some(Representation::Sprite));
        assert_eq!(cluster.stars[0].position, displaced);
        assert_eq!(cluster.stars[0].velocity, Vec3::new(0.3, 0.0, 0.1));
        ctx.take_commands().submit(&mut renderer);
        assert_eq!(renderer.live_instances(), cluster.rendered_count);
        assert_eq!(ctx.pool_stats().geometries_in_use, 0);
    }

    #[test]
    fn test_drift_spin_reaches_mesh_rotation() {
        let (presenter, mut ctx, mut renderer) = setup();
        let rotation = ClusterRotation {
            axis: Vec3::Y,
            angular_speed: 0.01,
        };
        let mut clusters = vec![spinning_cluster_at(Vec3::new(0.0, 0.0, 10.0), Some(rotation))];
        presenter.update(&mut clusters, &mut ctx, Vec3::ZERO, Vec3::ZERO, 1.0);

        let mut clock = DriftClock::new(0.02);
        for _ in 0..50 {
            clock.advance();
        }
        presenter.apply_drift(&mut clusters[0], &mut ctx, &clock);
        ctx.take_commands().submit(&mut renderer);

        let Some(StarRender::Mesh(slot)) = clusters[0].stars[0].render else {
            panic!("expected a mesh star");
        };
        let expected = Quat::from_axis_angle(Vec3::Y, 0.5);
        let shown = renderer.drawable_rotation(slot.drawable).unwrap();
        assert!(shown.abs_diff_eq(expected, 1e-5), "{shown:?}");
    }
}
