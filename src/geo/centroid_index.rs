//! Region centroid index
//!
//! Holds the fixed set of region reference points and answers nearest-region
//! queries by geodesic distance.
//!
//! ## Iteration order
//!
//! Centroids are kept in the order they were supplied: for the JSON loader
//! that is the order of keys in the file. Nearest-region ties and crop
//! assignment both follow this order, so it is part of the observable
//! contract.

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::geodesic_distance_km;
use crate::types::{Coordinate, CoordinateError};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("centroid index is empty")]
    EmptyIndex,
    #[error("duplicate region key {0:?}")]
    DuplicateKey(String),
    #[error("region {key:?} has an invalid centroid: {source}")]
    InvalidCentroid {
        key: String,
        #[source]
        source: CoordinateError,
    },
    #[error("region {key:?}: expected [latitude, longitude], got {value}")]
    MalformedEntry { key: String, value: String },
    #[error("centroid file must be a JSON object of key -> [lat, lon]")]
    NotAnObject,
    #[error("failed to read centroid file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse centroid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named region reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub key: String,
    pub location: Coordinate,
}

/// Result of a nearest-region query.
#[derive(Debug, Clone, Copy)]
pub struct NearestRegion<'a> {
    pub centroid: &'a Centroid,
    pub distance_km: f64,
}

impl NearestRegion<'_> {
    pub fn key(&self) -> &str {
        &self.centroid.key
    }
}

/// Immutable, non-empty set of region centroids.
#[derive(Debug, Clone)]
pub struct CentroidIndex {
    centroids: Vec<Centroid>,
}

impl CentroidIndex {
    /// Build an index, rejecting empty input and duplicate keys.
    pub fn new(centroids: Vec<Centroid>) -> Result<Self, GeoError> {
        if centroids.is_empty() {
            return Err(GeoError::EmptyIndex);
        }
        let mut seen = HashSet::with_capacity(centroids.len());
        for c in &centroids {
            if !seen.insert(c.key.as_str()) {
                return Err(GeoError::DuplicateKey(c.key.clone()));
            }
        }
        Ok(Self { centroids })
    }

    /// Build from `(key, latitude, longitude)` triples, validating each point.
    pub fn from_points<K, I>(points: I) -> Result<Self, GeoError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64, f64)>,
    {
        let centroids = points
            .into_iter()
            .map(|(key, lat, lon)| {
                let key = key.into();
                match Coordinate::new(lat, lon) {
                    Ok(location) => Ok(Centroid { key, location }),
                    Err(source) => Err(GeoError::InvalidCentroid { key, source }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(centroids)
    }

    /// Parse a `{ "<key>": [lat, lon], ... }` document, keeping file order.
    pub fn from_json_str(json: &str) -> Result<Self, GeoError> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(map) = root else {
            return Err(GeoError::NotAnObject);
        };

        let mut points = Vec::with_capacity(map.len());
        for (key, value) in map {
            match serde_json::from_value::<(f64, f64)>(value.clone()) {
                Ok((lat, lon)) => points.push((key, lat, lon)),
                Err(_) => {
                    return Err(GeoError::MalformedEntry {
                        key,
                        value: value.to_string(),
                    })
                }
            }
        }
        Self::from_points(points)
    }

    /// Load the centroid mapping from disk.
    pub fn load(path: &Path) -> Result<Self, GeoError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| GeoError::Io(path.to_path_buf(), e))?;
        let index = Self::from_json_str(&contents)?;
        info!(path = %path.display(), centroids = index.len(), "Loaded region centroids");
        Ok(index)
    }

    /// Key of the centroid closest to `point`.
    ///
    /// Linear scan over all centroids. On equal distances the centroid that
    /// comes first in iteration order wins.
    pub fn nearest(&self, point: &Coordinate) -> Result<NearestRegion<'_>, GeoError> {
        let mut best: Option<NearestRegion<'_>> = None;
        for centroid in &self.centroids {
            let distance_km = geodesic_distance_km(point, &centroid.location);
            if best.map_or(true, |b| distance_km < b.distance_km) {
                best = Some(NearestRegion { centroid, distance_km });
            }
        }

        let nearest = best.ok_or(GeoError::EmptyIndex)?;
        debug!(
            point = %point,
            region = %nearest.key(),
            distance_km = nearest.distance_km,
            "Resolved nearest region"
        );
        Ok(nearest)
    }

    pub fn get(&self, key: &str) -> Option<&Centroid> {
        self.centroids.iter().find(|c| c.key == key)
    }

    /// Region keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.centroids.iter().map(|c| c.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Centroid> {
        self.centroids.iter()
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }
}
