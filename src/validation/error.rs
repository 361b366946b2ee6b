//! Error classification for the tracking engine
//!
//! Running out of beacons is not an error: empty or partial detection sets are
//! reported through `TrackingOutcome`, and numeric fusion failures are recovered
//! inside the estimator. Only input that has no defined answer ends up here.

use thiserror::Error;

/// Errors raised by the tracking engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    /// Polygon with fewer than three vertices
    #[error("zone {} has {vertices} vertices, at least 3 are required", .zone_id.as_deref().unwrap_or("<unnamed>"))]
    MalformedPolygon {
        zone_id: Option<String>,
        vertices: usize,
    },
    /// Subject position that cannot be measured against any beacon
    #[error("subject position ({lat}, {lng}) is not a finite coordinate")]
    InvalidPosition { lat: f64, lng: f64 },
}

/// Result type for engine operations
pub type TrackingResult<T> = Result<T, TrackingError>;
