//! Point-in-polygon test for restricted zones
//!
//! Ray casting with a half-open latitude test per edge: `(v_i.lat > lat) !=
//! (v_j.lat > lat)`. A shared vertex is counted by exactly one of its two edges.
//! Points on the boundary resolve deterministically but depend on edge
//! direction; for the square `[(0,0), (0,10), (10,10), (10,0)]` the low-latitude
//! and low-longitude sides count as inside and the opposite sides as outside.

use crate::core::{GeoPoint, Zone};
use crate::validation::error::TrackingError;
use tracing::debug;

/// Minimum number of vertices of a zone polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Whether `point` lies inside the polygon described by `vertices`
pub fn contains(point: &GeoPoint, vertices: &[GeoPoint]) -> Result<bool, TrackingError> {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return Err(TrackingError::MalformedPolygon {
            zone_id: None,
            vertices: vertices.len(),
        });
    }
    Ok(ray_cast(point, vertices))
}

fn ray_cast(point: &GeoPoint, vertices: &[GeoPoint]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;

    for (i, vi) in vertices.iter().enumerate() {
        let vj = &vertices[j];
        if (vi.lat > point.lat) != (vj.lat > point.lat) {
            let crossing_lng = (vj.lng - vi.lng) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lng;
            if point.lng < crossing_lng {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Resolves which restricted zone, if any, holds a position
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneEvaluator;

impl ZoneEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Whether `point` lies inside `zone`
    pub fn zone_contains(&self, zone: &Zone, point: &GeoPoint) -> Result<bool, TrackingError> {
        contains(point, &zone.vertices).map_err(|e| match e {
            TrackingError::MalformedPolygon { vertices, .. } => TrackingError::MalformedPolygon {
                zone_id: Some(zone.id.clone()),
                vertices,
            },
            other => other,
        })
    }

    /// First zone in catalog order that contains `point`.
    ///
    /// Zones after the first match are not examined.
    pub fn first_match<'z>(&self, point: &GeoPoint, zones: &'z [Zone]) -> Result<Option<&'z Zone>, TrackingError> {
        for zone in zones {
            if self.zone_contains(zone, point)? {
                debug!(zone = %zone.id, lat = point.lat, lng = point.lng, "position inside zone");
                return Ok(Some(zone));
            }
        }
        Ok(None)
    }
}
