//! Per-update tracking stages

pub mod detection;
pub mod pipeline;
pub mod transition;

pub use detection::DetectionSimulator;
pub use pipeline::{TrackingOutcome, TrackingPipeline};
pub use transition::ZoneTransition;
