//! Proximity location engine
//!
//! Estimates where a tracked subject is from the beacons it can hear and
//! flags positions that fall inside restricted zones. Signals follow a
//! log-distance path loss model, positions are fused from the strongest
//! detections, and zones are tested with ray casting.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;

// Re-export commonly used types
pub use core::{Beacon, Detection, EstimationMethod, GeoPoint, PositionEstimate, Zone, ZoneCategory};
pub use core::{EARTH_RADIUS_M, UNDETECTABLE_SIGNAL_DBM};
pub use algorithms::estimator::{estimate, FusionMode, PositionEstimator};
pub use algorithms::geodesy::{haversine_distance, DistanceMetric};
pub use algorithms::propagation::{estimate_distance, simulate_signal, PropagationModel};
pub use algorithms::zone::{contains, ZoneEvaluator};
pub use processing::detection::{detect, DetectionSimulator};
pub use processing::{TrackingOutcome, TrackingPipeline, ZoneTransition};
pub use validation::{CatalogIssue, CatalogValidator, TrackingError, TrackingResult, ValidationReport};
pub use utils::{CatalogSnapshot, ConfigError, ConfigurationManager, EngineConfig};
