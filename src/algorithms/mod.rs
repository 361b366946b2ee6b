//! Signal propagation, distance, fusion and zone geometry

pub mod propagation;
pub mod geodesy;
pub mod estimator;
pub mod zone;

pub use propagation::PropagationModel;
pub use geodesy::DistanceMetric;
pub use estimator::{FusionError, FusionMode, PositionEstimator};
pub use zone::ZoneEvaluator;
