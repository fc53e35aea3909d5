//! Region -> crop label assignment.
//!
//! Built once at startup from the centroid keys and a finite crop pool, then
//! only read. Construction walks the keys in index order; for each key the
//! working pool is refilled if empty, shuffled, and one crop is popped off.
//! No crop repeats until the pool has been exhausted once.
//!
//! The shuffle is seeded only when the caller provides a seed. Without one
//! every process start produces a different assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::defaults::UNKNOWN_CROP;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CropError {
    #[error("crop pool is empty")]
    EmptyPool,
    #[error("no region keys to assign crops to")]
    NoRegions,
}

/// Immutable region key -> crop label mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropAssignment {
    assignments: HashMap<String, String>,
    pool_size: usize,
}

impl CropAssignment {
    /// Build an assignment, seeding the shuffle when `seed` is given.
    pub fn build<'a, K>(keys: K, pool: &[String], seed: Option<u64>) -> Result<Self, CropError>
    where
        K: IntoIterator<Item = &'a str>,
    {
        match seed {
            Some(seed) => Self::build_with_rng(keys, pool, &mut StdRng::seed_from_u64(seed)),
            None => Self::build_with_rng(keys, pool, &mut rand::thread_rng()),
        }
    }

    /// Build an assignment with a caller-supplied randomness source.
    pub fn build_with_rng<'a, K, R>(keys: K, pool: &[String], rng: &mut R) -> Result<Self, CropError>
    where
        K: IntoIterator<Item = &'a str>,
        R: Rng + ?Sized,
    {
        if pool.is_empty() {
            return Err(CropError::EmptyPool);
        }

        let mut assignments = HashMap::new();
        let mut working: Vec<&String> = Vec::with_capacity(pool.len());
        let mut refills = 0usize;

        for key in keys {
            if working.is_empty() {
                working.extend(pool.iter());
                refills += 1;
            }
            working.shuffle(rng);
            if let Some(crop) = working.pop() {
                assignments.insert(key.to_string(), crop.clone());
            }
        }

        if assignments.is_empty() {
            return Err(CropError::NoRegions);
        }

        info!(
            regions = assignments.len(),
            pool = pool.len(),
            pool_cycles = refills,
            "Crop assignment built"
        );
        Ok(Self {
            assignments,
            pool_size: pool.len(),
        })
    }

    /// Crop assigned to `region_key`, or `"Unknown Crop"` for keys that were
    /// not present at construction.
    pub fn get(&self, region_key: &str) -> &str {
        match self.assignments.get(region_key) {
            Some(crop) => crop,
            None => {
                debug!(region = %region_key, "No crop assigned to region");
                UNKNOWN_CROP
            }
        }
    }

    pub fn contains(&self, region_key: &str) -> bool {
        self.assignments.contains_key(region_key)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assignments.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pool(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}", 1000 + i)).collect()
    }

    #[test]
    fn test_one_entry_per_key_from_pool() {
        let pool = pool(&["Rice", "Corn", "Wheat"]);
        let keys = keys(10);
        let a = CropAssignment::build(keys.iter().map(String::as_str), &pool, Some(1)).unwrap();
        assert_eq!(a.len(), 10);
        for k in &keys {
            assert!(pool.contains(&a.get(k).to_string()));
        }
    }

    #[test]
    fn test_no_repeat_before_exhaustion() {
        let pool = pool(&["A", "B", "C", "D", "E"]);
        let keys = keys(12);
        let a = CropAssignment::build(keys.iter().map(String::as_str), &pool, Some(99)).unwrap();

        // Every consecutive block of pool-size keys is a permutation of the pool
        for chunk in keys.chunks(pool.len()) {
            let crops: Vec<&str> = chunk.iter().map(|k| a.get(k)).collect();
            let distinct: HashSet<&str> = crops.iter().copied().collect();
            assert_eq!(distinct.len(), crops.len(), "repeat within a cycle: {crops:?}");
        }
    }

    #[test]
    fn test_pool_larger_than_keys_gives_distinct_crops() {
        let pool = pool(crate::config::defaults::CROP_POOL);
        let keys = keys(20);
        let a = CropAssignment::build(keys.iter().map(String::as_str), &pool, None).unwrap();
        let distinct: HashSet<&str> = keys.iter().map(|k| a.get(k)).collect();
        assert_eq!(distinct.len(), 20);
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let pool = pool(&["A", "B", "C", "D"]);
        let keys = keys(9);
        let a = CropAssignment::build(keys.iter().map(String::as_str), &pool, Some(7)).unwrap();
        let b = CropAssignment::build(keys.iter().map(String::as_str), &pool, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_key_returns_sentinel() {
        let a = CropAssignment::build(["x"], &pool(&["Rice"]), None).unwrap();
        assert_eq!(a.get("x"), "Rice");
        assert_eq!(a.get("y"), "Unknown Crop");
        assert!(!a.contains("y"));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert_eq!(CropAssignment::build(["x"], &[], None), Err(CropError::EmptyPool));
        let none: [&str; 0] = [];
        assert_eq!(
            CropAssignment::build(none, &pool(&["Rice"]), None),
            Err(CropError::NoRegions)
        );
    }

    #[test]
    fn test_single_crop_pool_reused() {
        let keys = keys(3);
        let a = CropAssignment::build(keys.iter().map(String::as_str), &pool(&["Millet"]), None)
            .unwrap();
        assert!(keys.iter().all(|k| a.get(k) == "Millet"));
        assert_eq!(a.pool_size(), 1);
    }
}
