//! Position-independent cluster templates built by multi-core density sampling.

use std::sync::Arc;

use glam::Vec3;
use starwake_config::{StarConfig, TemplateConfig};
use starwake_path::SeededRandom;
use starwake_render::ColorKey;

use crate::star::{SizeCategoryTable, StarSizeCategory};

/// A weighted attractor that stars cluster around.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCore {
    /// Offset from the template origin.
    pub offset: Vec3,
    /// Relative selection weight.
    pub density: f32,
    /// Higher tightness pulls stars closer to the core.
    pub tightness: f32,
}

/// One star of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct StarTemplateEntry {
    /// Offset relative to the cluster center.
    pub offset: Vec3,
    pub size: f32,
    pub color: ColorKey,
    pub category: StarSizeCategory,
}

/// Immutable star-group definition shared by every instance placed from it.
#[derive(Debug, Clone)]
pub struct ClusterTemplate {
    pub id: usize,
    pub spread_radius: f32,
    pub cores: Vec<DensityCore>,
    pub stars: Vec<StarTemplateEntry>,
    /// Largest star offset length.
    pub bounding_radius: f32,
}

impl ClusterTemplate {
    /// Number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Whether the template has no stars.
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Builds templates from template and star settings.
pub struct ClusterTemplateFactory<'a> {
    templates: &'a TemplateConfig,
    stars: &'a StarConfig,
    sizes: &'a SizeCategoryTable,
}

impl<'a> ClusterTemplateFactory<'a> {
    pub fn new(
        templates: &'a TemplateConfig,
        stars: &'a StarConfig,
        sizes: &'a SizeCategoryTable,
    ) -> Self {
        Self {
            templates,
            stars,
            sizes,
        }
    }

    /// Generate one template.
    pub fn build(&self, id: usize, rng: &mut SeededRandom) -> ClusterTemplate {
        let t = self.templates;
        let spread = rng.range(t.spread_radius[0], t.spread_radius[1]);
        let star_count = rng.range(t.star_count[0] as f32, t.star_count[1] as f32) as usize;
        let core_count = rng.int_range(t.core_count[0], t.core_count[1]) as usize;

        let cores: Vec<DensityCore> = (0..core_count)
            .map(|_| {
                let reach = spread * t.core_offset_scale;
                DensityCore {
                    offset: Vec3::new(
                        rng.centered() * reach,
                        rng.centered() * reach,
                        rng.centered() * reach,
                    ),
                    density: rng.range(t.core_density[0], t.core_density[1]),
                    tightness: rng.range(t.core_tightness[0], t.core_tightness[1]),
                }
            })
            .collect();
        let total_weight: f32 = cores.iter().map(|c| c.density).sum();
        let [ax, ay, az] = t.axis_spread;

        let mut stars = Vec::with_capacity(star_count);
        let mut bounding_radius: f32 = 0.0;
        for _ in 0..star_count {
            let core = pick_core(&cores, rng.next_f32() * total_weight);
            let falloff = rng
                .next_f32()
                .powf(t.falloff_base + core.tightness * t.falloff_tightness_scale);
            let scatter = spread * falloff;
            let offset = core.offset
                + Vec3::new(
                    rng.centered() * scatter * ax,
                    rng.centered() * scatter * ay,
                    rng.centered() * scatter * az,
                );

            let size = rng.range(self.stars.min_size, self.stars.max_size);
            let color = ColorKey::from(self.stars.palette[rng.index(self.stars.palette.len())]);

            bounding_radius = bounding_radius.max(offset.length());
            stars.push(StarTemplateEntry {
                offset,
                size,
                color,
                category: self.sizes.category_for(size),
            });
        }

        ClusterTemplate {
            id,
            spread_radius: spread,
            cores,
            stars,
            bounding_radius,
        }
    }

    /// Generate the startup pool of `template_count` templates.
    pub fn build_pool(&self, rng: &mut SeededRandom) -> Vec<Arc<ClusterTemplate>> {
        let pool: Vec<Arc<ClusterTemplate>> = (0..self.templates.template_count)
            .map(|id| Arc::new(self.build(id, rng)))
            .collect();
        tracing::debug!(
            templates = pool.len(),
            stars = pool.iter().map(|t| t.len()).sum::<usize>(),
            "built cluster template pool"
        );
        pool
    }
}

/// Cumulative-weight scan; falls back to the first core.
fn pick_core(cores: &[DensityCore], pick: f32) -> &DensityCore {
    let mut acc = 0.0;
    for core in cores {
        acc += core.density;
        if pick < acc {
            return core;
        }
    }
    &cores[0]
}
