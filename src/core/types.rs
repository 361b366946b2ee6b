//! Core data types for the location estimation engine

use super::constants::{DEFAULT_COVERAGE_RADIUS_M, DEFAULT_TX_POWER_DBM};
use serde::{Deserialize, Serialize};

/// Position on the campus, in degrees or in map units depending on the distance metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Kind of area a beacon is installed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneCategory {
    Room,
    Corridor,
    Entrance,
    #[default]
    Other,
}

fn default_tx_power() -> i32 {
    DEFAULT_TX_POWER_DBM
}

fn default_coverage_radius() -> f64 {
    DEFAULT_COVERAGE_RADIUS_M
}

fn default_active() -> bool {
    true
}

/// Fixed virtual beacon with a known position and broadcast power
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    /// Stable unique identifier
    pub id: String,
    /// Human-readable label
    #[serde(default)]
    pub name: String,
    /// Installation position
    pub position: GeoPoint,
    /// Reference signal strength at 1 meter (dBm)
    #[serde(default = "default_tx_power")]
    pub tx_power_dbm: i32,
    /// Detection cutoff distance (meters)
    #[serde(default = "default_coverage_radius")]
    pub coverage_radius_m: f64,
    /// Inactive beacons are ignored by detection
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub zone_category: ZoneCategory,
}

impl Beacon {
    /// Create an active beacon with the default power and coverage
    pub fn new(id: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            position,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            coverage_radius_m: DEFAULT_COVERAGE_RADIUS_M,
            active: true,
            zone_category: ZoneCategory::Other,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tx_power(mut self, tx_power_dbm: i32) -> Self {
        self.tx_power_dbm = tx_power_dbm;
        self
    }

    pub fn with_coverage(mut self, coverage_radius_m: f64) -> Self {
        self.coverage_radius_m = coverage_radius_m;
        self
    }

    pub fn with_category(mut self, zone_category: ZoneCategory) -> Self {
        self.zone_category = zone_category;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Restricted polygon area, implicitly closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered polygon vertices; the last one connects back to the first
    #[serde(rename = "points")]
    pub vertices: Vec<GeoPoint>,
    /// Beacons installed inside the zone (informational)
    #[serde(default)]
    pub beacon_ids: Vec<String>,
}

impl Zone {
    pub fn new(id: impl Into<String>, vertices: Vec<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            vertices,
            beacon_ids: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_beacons(mut self, beacon_ids: Vec<String>) -> Self {
        self.beacon_ids = beacon_ids;
        self
    }
}

/// One beacon heard during a single estimation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub beacon: Beacon,
    /// Simulated received signal strength (dBm)
    pub signal_dbm: f64,
    /// Distance between the subject and the beacon (meters)
    pub distance_m: f64,
    pub zone_category: ZoneCategory,
}

/// Code path that produced an estimated coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Inverse-distance weighted centroid of the strongest beacons
    WeightedCentroid,
    /// Least-squares circle intersection over all detections
    Multilateration,
    /// Fusion failed numerically; the strongest beacon position is reported
    NearestBeaconFallback,
}

/// Estimated subject position produced by one tracking update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub subject_id: String,
    pub position: GeoPoint,
    /// Strongest-signal beacon
    pub nearest_beacon: Option<String>,
    /// Raw signal of the strongest beacon (dBm)
    pub signal_dbm: Option<f64>,
    pub in_restricted_zone: bool,
    pub zone_id: Option<String>,
    pub method: EstimationMethod,
}

impl PositionEstimate {
    /// Flag the estimate as inside the given zone
    pub fn mark_inside(&mut self, zone_id: impl Into<String>) {
        self.in_restricted_zone = true;
        self.zone_id = Some(zone_id.into());
    }
}
