//! Deterministic soil value synthesis.
//!
//! Every resolution call builds a fresh `StdRng` seeded from the region key
//! and draws all five fields in a fixed order: pH, clay, sand, silt, CEC.
//! A missing field takes the draw at its own position, so the value
//! synthesized for "sand" is the same whether the whole record is missing or
//! only that one column.
//!
//! Note: `StdRng` output is stable for a given `rand` release but not
//! guaranteed across major versions.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use rand::{Rng, SeedableRng};

use crate::config::defaults;
use crate::types::{round2, SoilAttributes};

/// One of the five resolved soil properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilField {
    Ph,
    Clay,
    Sand,
    Silt,
    Cec,
}

impl SoilField {
    /// Draw order of the seeded stream.
    pub const ALL: [SoilField; 5] = [
        SoilField::Ph,
        SoilField::Clay,
        SoilField::Sand,
        SoilField::Silt,
        SoilField::Cec,
    ];

    /// Inclusive synthesis range.
    pub const fn range(self) -> (f64, f64) {
        match self {
            SoilField::Ph => defaults::PH_RANGE,
            SoilField::Clay => defaults::CLAY_RANGE,
            SoilField::Sand => defaults::SAND_RANGE,
            SoilField::Silt => defaults::SILT_RANGE,
            SoilField::Cec => defaults::CEC_RANGE,
        }
    }

    /// Column name in the soil dataset.
    pub const fn column(self) -> &'static str {
        match self {
            SoilField::Ph => "S_PH_H2O",
            SoilField::Clay => "S_CLAY",
            SoilField::Sand => "S_SAND",
            SoilField::Silt => "S_SILT",
            SoilField::Cec => "S_CEC_SOIL",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            SoilField::Ph => 0,
            SoilField::Clay => 1,
            SoilField::Sand => 2,
            SoilField::Silt => 3,
            SoilField::Cec => 4,
        }
    }
}

impl std::fmt::Display for SoilField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Stable 64-bit seed for a region key (first 8 bytes of its MD5 digest).
pub fn seed_for_key(key: &str) -> u64 {
    let digest = md5::compute(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    u64::from_le_bytes(bytes)
}

/// The full seeded draw for a region key, in [`SoilField::ALL`] order.
pub fn fallback_values(key: &str) -> [f64; 5] {
    let mut rng = StdRng::seed_from_u64(seed_for_key(key));
    SoilField::ALL.map(|field| {
        let (min, max) = field.range();
        round2(rng.gen_range(min..=max))
    })
}

/// A completely synthesized record for a key with no soil data.
pub fn synthesize(key: &str) -> SoilAttributes {
    let [ph, clay, sand, silt, cec] = fallback_values(key);
    SoilAttributes { ph, clay, sand, silt, cec }
}
