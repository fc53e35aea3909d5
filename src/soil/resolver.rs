//! Region key -> fully populated soil attributes.

use tracing::{debug, warn};

use super::dataset::SoilDataset;
use super::fallback::{self, SoilField};
use crate::types::{round2, SoilAttributes};

/// Outcome of one soil resolution, with provenance for logging and the API.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilResolution {
    pub attributes: SoilAttributes,
    /// False when no dataset row exists for the key
    pub matched: bool,
    /// Fields filled from the seeded fallback stream
    pub synthesized: Vec<SoilField>,
}

/// Resolves soil attributes, synthesizing whatever the dataset lacks.
#[derive(Debug, Clone, Default)]
pub struct SoilResolver {
    dataset: SoilDataset,
}

impl SoilResolver {
    pub fn new(dataset: SoilDataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &SoilDataset {
        &self.dataset
    }

    pub fn resolve(&self, region_key: &str) -> SoilAttributes {
        self.resolve_detailed(region_key).attributes
    }

    /// Resolve a key and report which fields were synthesized.
    ///
    /// Unmatched keys get a fully synthesized record. For a matched key each
    /// missing field takes the seeded draw at its own stream position; present
    /// fields are rounded to 2 decimals.
    pub fn resolve_detailed(&self, region_key: &str) -> SoilResolution {
        let Some(record) = self.dataset.first(region_key) else {
            warn!(region = %region_key, "No soil record for region, synthesizing all fields");
            return SoilResolution {
                attributes: fallback::synthesize(region_key),
                matched: false,
                synthesized: SoilField::ALL.to_vec(),
            };
        };

        let draws = fallback::fallback_values(region_key);
        let mut synthesized = Vec::new();
        let [ph, clay, sand, silt, cec] = SoilField::ALL.map(|field| match record.field(field) {
            Some(v) => round2(v),
            None => {
                synthesized.push(field);
                draws[field.index()]
            }
        });

        if !synthesized.is_empty() {
            warn!(
                region = %region_key,
                fields = ?synthesized,
                "Soil record incomplete, synthesizing missing fields"
            );
        }
        let attributes = SoilAttributes { ph, clay, sand, silt, cec };
        debug!(region = %region_key, ?attributes, "Resolved soil attributes");

        SoilResolution {
            attributes,
            matched: true,
            synthesized,
        }
    }
}
