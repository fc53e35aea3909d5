//! Geodesic helpers and the region centroid index.
//!
//! Distances are great-circle distances on a spherical Earth using the
//! haversine formula with the IUGG mean radius.

mod centroid_index;

pub use centroid_index::{Centroid, CentroidIndex, GeoError, NearestRegion};

use crate::types::Coordinate;

/// Mean Earth radius (km).
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometres.
pub fn geodesic_distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against h drifting a hair above 1.0 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_MEAN_RADIUS_KM * c
}
