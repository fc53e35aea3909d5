//! Soil attribute resolution.
//!
//! - [`SoilDataset`]: per-region rows from the harmonized soil table
//! - [`SoilResolver`]: region key -> complete [`SoilAttributes`](crate::types::SoilAttributes)
//! - [`fallback`]: key-seeded synthesis for missing observations

mod dataset;
pub mod fallback;
mod resolver;

pub use dataset::{parse_cell, SoilDataError, SoilDataset, SoilRecord, KEY_COLUMN};
pub use fallback::SoilField;
pub use resolver::{SoilResolution, SoilResolver};
