//! Star size categories and their physical properties.
//!
//! Size determines category through ordered thresholds; category determines
//! mass and damping. The table is validated once at startup.

use starwake_config::StarConfig;

/// Size category of a star, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StarSizeCategory {
    Small,
    Medium,
    Large,
    Giant,
}

impl StarSizeCategory {
    /// All categories in ascending size order.
    pub const ALL: [StarSizeCategory; 4] = [
        StarSizeCategory::Small,
        StarSizeCategory::Medium,
        StarSizeCategory::Large,
        StarSizeCategory::Giant,
    ];

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Physical constants of a category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProperties {
    pub mass: f32,
    pub inverse_mass: f32,
    /// Velocity retained per frame.
    pub damping: f32,
}

/// Rejections from [`SizeCategoryTable::from_config`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SizeTableError {
    #[error("expected {expected} entries in `{field}`, found {found}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("size thresholds must be positive and strictly increasing")]
    NotIncreasing,
    #[error("size thresholds end at {last}, leaving sizes up to {max_size} uncovered")]
    Gap { last: f32, max_size: f32 },
    #[error("masses must be positive and must not decrease with size")]
    BadMass,
    #[error("damping factors must be in (0, 1]")]
    BadDamping,
}

/// Validated size-to-category lookup with per-category properties.
#[derive(Debug, Clone)]
pub struct SizeCategoryTable {
    /// Exclusive upper bound per category.
    upper_bounds: [f32; 4],
    properties: [CategoryProperties; 4],
}

impl SizeCategoryTable {
    /// Build and validate the table from star settings.
    pub fn from_config(config: &StarConfig) -> Result<Self, SizeTableError> {
        let n = StarSizeCategory::ALL.len();
        for (field, found) in [
            ("stars.category_bounds", config.category_bounds.len()),
            ("stars.masses", config.masses.len()),
            ("stars.damping", config.damping.len()),
        ] {
            if found != n {
                return Err(SizeTableError::WrongLength {
                    field,
                    expected: n,
                    found,
                });
            }
        }

        let bounds = &config.category_bounds;
        if bounds[0] <= 0.0 || bounds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SizeTableError::NotIncreasing);
        }
        let last = bounds[n - 1];
        if last < config.max_size {
            return Err(SizeTableError::Gap {
                last,
                max_size: config.max_size,
            });
        }
        if config.masses.iter().any(|&m| !(m > 0.0))
            || config.masses.windows(2).any(|w| w[1] < w[0])
        {
            return Err(SizeTableError::BadMass);
        }
        if config.damping.iter().any(|&d| !(d > 0.0 && d <= 1.0)) {
            return Err(SizeTableError::BadDamping);
        }

        let mut upper_bounds = [0.0; 4];
        upper_bounds.copy_from_slice(bounds);
        let properties = std::array::from_fn(|i| CategoryProperties {
            mass: config.masses[i],
            inverse_mass: 1.0 / config.masses[i],
            damping: config.damping[i],
        });
        Ok(Self {
            upper_bounds,
            properties,
        })
    }

    /// Category of a star of `size`. Sizes at or beyond the last bound are Giant.
    pub fn category_for(&self, size: f32) -> StarSizeCategory {
        let i = self.upper_bounds.partition_point(|&bound| bound <= size);
        StarSizeCategory::ALL[i.min(StarSizeCategory::ALL.len() - 1)]
    }

    /// Mass, inverse mass and damping of `category`.
    pub fn properties(&self, category: StarSizeCategory) -> CategoryProperties {
        self.properties[category.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SizeCategoryTable {
        SizeCategoryTable::from_config(&StarConfig::default()).unwrap()
    }

    #[test]
    fn test_category_boundaries() {
        let t = table();
        assert_eq!(t.category_for(0.05), StarSizeCategory::Small);
        assert_eq!(t.category_for(0.0799), StarSizeCategory::Small);
        assert_eq!(t.category_for(0.08), StarSizeCategory::Medium);
        assert_eq!(t.category_for(0.13), StarSizeCategory::Large);
        assert_eq!(t.category_for(0.19), StarSizeCategory::Giant);
    }

    #[test]
    fn test_full_size_range_is_covered() {
        let t = table();
        assert_eq!(t.category_for(0.0), StarSizeCategory::Small);
        assert_eq!(t.category_for(-1.0), StarSizeCategory::Small);
        assert_eq!(t.category_for(0.2), StarSizeCategory::Giant);
        assert_eq!(t.category_for(5.0), StarSizeCategory::Giant);
    }

    #[test]
    fn test_mass_grows_with_category() {
        let t = table();
        for pair in StarSizeCategory::ALL.windows(2) {
            let a = t.properties(pair[0]);
            let b = t.properties(pair[1]);
            assert!(b.mass > a.mass);
            assert!(b.inverse_mass < a.inverse_mass);
        }
    }

    #[test]
    fn test_inverse_mass_is_reciprocal() {
        let t = table();
        for category in StarSizeCategory::ALL {
            let p = t.properties(category);
            assert!((p.mass * p.inverse_mass - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        let mut config = StarConfig::default();
        config.masses.pop();
        assert!(matches!(
            SizeCategoryTable::from_config(&config),
            Err(SizeTableError::WrongLength { field: "stars.masses", .. })
        ));
    }

    #[test]
    fn test_rejects_non_monotonic_bounds() {
        let mut config = StarConfig::default();
        config.category_bounds = vec![0.08, 0.16, 0.12, 0.2];
        assert_eq!(
            SizeCategoryTable::from_config(&config).unwrap_err(),
            SizeTableError::NotIncreasing
        );
    }

    #[test]
    fn test_rejects_gap_below_max_size() {
        let mut config = StarConfig::default();
        config.category_bounds = vec![0.08, 0.12, 0.16, 0.18];
        assert!(matches!(
            SizeCategoryTable::from_config(&config),
            Err(SizeTableError::Gap { .. })
        ));
    }

    #[test]
    fn test_rejects_decreasing_mass() {
        let mut config = StarConfig::default();
        config.masses = vec![1.0, 2.0, 1.5, 4.0];
        assert_eq!(
            SizeCategoryTable::from_config(&config).unwrap_err(),
            SizeTableError::BadMass
        );
    }
}
