//! Star groups: size categories and reusable cluster templates.

pub mod star;
pub mod template;

pub use starwake_render::ColorKey;
pub use star::{CategoryProperties, SizeCategoryTable, SizeTableError, StarSizeCategory};
pub use template::{ClusterTemplate, ClusterTemplateFactory, DensityCore, StarTemplateEntry};
