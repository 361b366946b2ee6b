//! Distance metrics and local plane conversions
//!
//! Beacon and subject positions are either geographic degrees (Haversine on a
//! spherical Earth) or campus-map coordinates scaled to meters.

use crate::core::{GeoPoint, EARTH_RADIUS_M};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// How positions are turned into metric distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Latitude/longitude in degrees, great-circle distance
    Haversine,
    /// Flat map coordinates, `meters_per_unit` meters per coordinate unit
    Planar { meters_per_unit: f64 },
}

impl Default for DistanceMetric {
    fn default() -> Self {
        DistanceMetric::Haversine
    }
}

impl DistanceMetric {
    /// Metric distance between two positions (meters)
    pub fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        match *self {
            DistanceMetric::Haversine => haversine_distance(a, b),
            DistanceMetric::Planar { meters_per_unit } => {
                let dlat = b.lat - a.lat;
                let dlng = b.lng - a.lng;
                (dlat * dlat + dlng * dlng).sqrt() * meters_per_unit
            }
        }
    }

    /// East/north offset of `point` from `origin` in meters
    pub fn to_local(&self, point: &GeoPoint, origin: &GeoPoint) -> Vector2<f64> {
        match *self {
            DistanceMetric::Haversine => {
                let lat0 = origin.lat.to_radians();
                let east = (point.lng - origin.lng).to_radians() * EARTH_RADIUS_M * lat0.cos();
                let north = (point.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
                Vector2::new(east, north)
            }
            DistanceMetric::Planar { meters_per_unit } => Vector2::new(
                (point.lng - origin.lng) * meters_per_unit,
                (point.lat - origin.lat) * meters_per_unit,
            ),
        }
    }

    /// Inverse of [`DistanceMetric::to_local`]
    pub fn from_local(&self, local: &Vector2<f64>, origin: &GeoPoint) -> GeoPoint {
        match *self {
            DistanceMetric::Haversine => {
                let lat0 = origin.lat.to_radians();
                let lat = origin.lat + (local.y / EARTH_RADIUS_M).to_degrees();
                let lng = origin.lng + (local.x / (EARTH_RADIUS_M * lat0.cos())).to_degrees();
                GeoPoint::new(lat, lng)
            }
            DistanceMetric::Planar { meters_per_unit } => GeoPoint::new(
                origin.lat + local.y / meters_per_unit,
                origin.lng + local.x / meters_per_unit,
            ),
        }
    }
}

/// Great-circle distance in meters (Haversine formula)
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}
