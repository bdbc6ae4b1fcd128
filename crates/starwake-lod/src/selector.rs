//! Distance-bucket LOD selection for cluster star counts.

use starwake_config::LodConfig;

/// Bucket edges and the star fraction rendered in each bucket.
///
/// `distances[i]` is the exclusive upper edge of bucket `i`; the last bucket
/// extends to infinity, so there is one more multiplier than edges.
#[derive(Clone, Debug, PartialEq)]
pub struct LodBuckets {
    distances: Vec<f32>,
    baseline: Vec<f32>,
    multipliers: Vec<f32>,
}

impl LodBuckets {
    /// Create buckets from edges and multipliers.
    ///
    /// # Panics
    ///
    /// Panics if edges are not positive and strictly increasing, or if there
    /// is not exactly one more multiplier than edges.
    pub fn custom(distances: Vec<f32>, multipliers: Vec<f32>) -> Self {
        for (i, &d) in distances.iter().enumerate() {
            assert!(d > 0.0, "bucket edges must be positive");
            if i > 0 {
                assert!(d > distances[i - 1], "bucket edges must be strictly increasing");
            }
        }
        assert_eq!(
            multipliers.len(),
            distances.len() + 1,
            "need one multiplier per bucket"
        );
        Self {
            distances,
            baseline: multipliers.clone(),
            multipliers,
        }
    }

    /// Buckets from validated LOD settings.
    pub fn from_config(config: &LodConfig) -> Self {
        Self::custom(
            config.bucket_distances.clone(),
            config.bucket_multipliers.clone(),
        )
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Current multipliers, possibly scaled down from the baseline.
    pub fn multipliers(&self) -> &[f32] {
        &self.multipliers
    }

    /// Multipliers as configured.
    pub fn baseline(&self) -> &[f32] {
        &self.baseline
    }

    /// Scale every multiplier by `factor`, keeping each within
    /// `[baseline * floor_ratio, baseline]`.
    pub fn scale(&mut self, factor: f32, floor_ratio: f32) {
        for (m, &base) in self.multipliers.iter_mut().zip(&self.baseline) {
            *m = (*m * factor).clamp(base * floor_ratio, base);
        }
    }
}

/// Selects buckets and rendered star counts by distance.
#[derive(Clone, Debug)]
pub struct LodSelector {
    buckets: LodBuckets,
    min_rendered_stars: usize,
}

impl LodSelector {
    pub fn new(buckets: LodBuckets, min_rendered_stars: usize) -> Self {
        Self {
            buckets,
            min_rendered_stars,
        }
    }

    pub fn from_config(config: &LodConfig) -> Self {
        Self::new(LodBuckets::from_config(config), config.min_rendered_stars)
    }

    /// Bucket for a cluster at `distance`. 0 is the closest, full-detail bucket.
    pub fn select_bucket(&self, distance: f32) -> usize {
        debug_assert!(distance >= 0.0, "distance must be non-negative");
        self.buckets
            .distances
            .iter()
            .position(|&edge| distance < edge)
            .unwrap_or(self.buckets.distances.len())
    }

    /// Bucket for a cluster currently shown in `current`.
    ///
    /// The cluster only moves to a neighboring bucket once `distance` is more
    /// than `band` past the edge they share. With no current bucket this is
    /// [`select_bucket`](Self::select_bucket).
    pub fn select_bucket_with_hysteresis(
        &self,
        current: Option<usize>,
        distance: f32,
        band: f32,
    ) -> usize {
        let Some(current) = current else {
            return self.select_bucket(distance);
        };
        let edges = &self.buckets.distances;
        let mut bucket = current.min(edges.len());
        while bucket > 0 && distance < edges[bucket - 1] - band {
            bucket -= 1;
        }
        while bucket < edges.len() && distance >= edges[bucket] + band {
            bucket += 1;
        }
        bucket
    }

    /// Stars to render for a template of `template_len` stars.
    ///
    /// `max(min_rendered_stars, round(len * multiplier * quality))`, capped at `len`.
    pub fn rendered_star_count(&self, template_len: usize, distance: f32, quality: f32) -> usize {
        self.star_count_for_bucket(template_len, self.select_bucket(distance), quality)
    }

    /// [`rendered_star_count`](Self::rendered_star_count) for a known bucket.
    pub fn star_count_for_bucket(&self, template_len: usize, bucket: usize, quality: f32) -> usize {
        let last = self.buckets.multipliers.len() - 1;
        let multiplier = self.buckets.multipliers[bucket.min(last)];
        let scaled = (template_len as f32 * multiplier * quality).round() as usize;
        scaled.max(self.min_rendered_stars).min(template_len)
    }

    pub fn buckets(&self) -> &LodBuckets {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> &mut LodBuckets {
        &mut self.buckets
    }
}
