//! Model constants shared by the propagation, detection and estimation stages

/// Signal value reported for a beacon that is out of range (dBm)
pub const UNDETECTABLE_SIGNAL_DBM: f64 = -100.0;

/// Path loss exponent for free-space propagation
pub const FREE_SPACE_PATH_LOSS_EXPONENT: f64 = 2.0;

/// Mean Earth radius used by the Haversine distance (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum number of detections needed to fuse a position
pub const MIN_DETECTIONS: usize = 3;

/// Number of strongest detections fused by the weighted centroid
pub const CENTROID_DETECTIONS: usize = 3;

/// Default beacon broadcast power at 1 m (dBm)
pub const DEFAULT_TX_POWER_DBM: i32 = -59;

/// Default beacon coverage radius (m)
pub const DEFAULT_COVERAGE_RADIUS_M: f64 = 10.0;
