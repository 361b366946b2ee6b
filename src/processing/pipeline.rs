//! Per-update orchestration: detection, fusion and zone evaluation
//!
//! The pipeline holds configuration only. Each call works on the snapshots it
//! is given and returns a fresh record, so one pipeline can serve many subjects
//! from many threads at once.

use crate::algorithms::estimator::PositionEstimator;
use crate::algorithms::geodesy::DistanceMetric;
use crate::algorithms::propagation::PropagationModel;
use crate::algorithms::zone::ZoneEvaluator;
use crate::core::{Beacon, Detection, GeoPoint, PositionEstimate, Zone};
use crate::processing::detection::DetectionSimulator;
use crate::utils::config::{ConfigError, EngineConfig};
use crate::validation::error::{TrackingError, TrackingResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of one tracking update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackingOutcome {
    /// No beacon in range; the subject cannot be located
    NoDetection,
    /// One or two beacons in range, not enough to fuse a position
    InsufficientDetections { detections: Vec<Detection> },
    /// Position estimated
    Located {
        estimate: PositionEstimate,
        detections: Vec<Detection>,
        /// Distance between the true and the estimated position (meters)
        error_m: f64,
    },
}

impl TrackingOutcome {
    pub fn estimate(&self) -> Option<&PositionEstimate> {
        match self {
            TrackingOutcome::Located { estimate, .. } => Some(estimate),
            _ => None,
        }
    }

    pub fn detections(&self) -> &[Detection] {
        match self {
            TrackingOutcome::NoDetection => &[],
            TrackingOutcome::InsufficientDetections { detections } => detections,
            TrackingOutcome::Located { detections, .. } => detections,
        }
    }

    pub fn is_located(&self) -> bool {
        matches!(self, TrackingOutcome::Located { .. })
    }

    /// Whether the subject was placed inside a restricted zone
    pub fn is_intrusion(&self) -> bool {
        self.estimate().map_or(false, |e| e.in_restricted_zone)
    }
}

/// Detection, fusion and zone evaluation for a single position update
#[derive(Debug, Clone)]
pub struct TrackingPipeline {
    simulator: DetectionSimulator,
    estimator: PositionEstimator,
    evaluator: ZoneEvaluator,
    metric: DistanceMetric,
}

impl Default for TrackingPipeline {
    fn default() -> Self {
        Self::from_validated(&EngineConfig::default())
    }
}

impl TrackingPipeline {
    /// Build a pipeline, rejecting out-of-range engine parameters
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Build from a config that already passed [`EngineConfig::validate`]
    pub(crate) fn from_validated(config: &EngineConfig) -> Self {
        let model = PropagationModel::with_exponent(config.path_loss_exponent);
        Self {
            simulator: DetectionSimulator::new(model, config.distance_metric),
            estimator: PositionEstimator::new(model, config.distance_metric, config.fusion_mode),
            evaluator: ZoneEvaluator::new(),
            metric: config.distance_metric,
        }
    }

    /// Locate a subject from its true position and flag zone intrusion.
    ///
    /// Zones are checked in catalog order and the first match wins. Running
    /// out of beacons is reported through the outcome, not as an error.
    pub fn update(
        &self,
        subject_id: &str,
        true_position: &GeoPoint,
        beacons: &[Beacon],
        zones: &[Zone],
    ) -> TrackingResult<TrackingOutcome> {
        if !true_position.is_finite() {
            return Err(TrackingError::InvalidPosition {
                lat: true_position.lat,
                lng: true_position.lng,
            });
        }

        let detections = self.simulator.detect(true_position, beacons);
        if detections.is_empty() {
            debug!(subject = subject_id, "no beacon in range");
            return Ok(TrackingOutcome::NoDetection);
        }

        let Some(mut estimate) = self.estimator.estimate(subject_id, &detections) else {
            return Ok(TrackingOutcome::InsufficientDetections { detections });
        };

        if let Some(zone) = self.evaluator.first_match(&estimate.position, zones)? {
            info!(subject = subject_id, zone = %zone.id, "subject inside restricted zone");
            estimate.mark_inside(zone.id.clone());
        }

        let error_m = self.metric.distance(true_position, &estimate.position);
        Ok(TrackingOutcome::Located {
            estimate,
            detections,
            error_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::estimator::FusionMode;
    use crate::core::EstimationMethod;

    fn planar_config() -> EngineConfig {
        EngineConfig {
            distance_metric: DistanceMetric::Planar { meters_per_unit: 1.0 },
            ..EngineConfig::default()
        }
    }

    fn triangle_beacons() -> Vec<Beacon> {
        vec![
            Beacon::new("b1", GeoPoint::new(0.0, 0.0)).with_coverage(20.0),
            Beacon::new("b2", GeoPoint::new(0.0, 10.0)).with_coverage(20.0),
            Beacon::new("b3", GeoPoint::new(10.0, 0.0)).with_coverage(20.0),
        ]
    }

    fn square(id: &str, min: f64, max: f64) -> Zone {
        Zone::new(
            id,
            vec![
                GeoPoint::new(min, min),
                GeoPoint::new(min, max),
                GeoPoint::new(max, max),
                GeoPoint::new(max, min),
            ],
        )
    }

    #[test]
    fn test_no_detection() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let outcome = pipeline
            .update("s", &GeoPoint::new(100.0, 100.0), &triangle_beacons(), &[])
            .unwrap();
        assert_eq!(outcome, TrackingOutcome::NoDetection);
        assert!(outcome.detections().is_empty());
        assert!(outcome.estimate().is_none());
    }

    #[test]
    fn test_insufficient_detections_keeps_partial_data() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let beacons = vec![
            Beacon::new("b1", GeoPoint::new(0.0, 0.0)),
            Beacon::new("b2", GeoPoint::new(0.0, 5.0)),
            Beacon::new("b3", GeoPoint::new(50.0, 50.0)),
        ];

        let outcome = pipeline.update("s", &GeoPoint::new(0.0, 1.0), &beacons, &[]).unwrap();
        match outcome {
            TrackingOutcome::InsufficientDetections { ref detections } => {
                assert_eq!(detections.len(), 2);
                assert_eq!(detections[0].beacon.id, "b1");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!outcome.is_located());
    }

    #[test]
    fn test_located_inside_zone() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let zones = vec![square("far", 50.0, 60.0), square("corner", 0.0, 3.0)];

        let outcome = pipeline
            .update("s", &GeoPoint::new(1.0, 1.0), &triangle_beacons(), &zones)
            .unwrap();
        let estimate = outcome.estimate().unwrap();
        assert!(estimate.in_restricted_zone);
        assert_eq!(estimate.zone_id.as_deref(), Some("corner"));
        assert!(outcome.is_intrusion());
    }

    #[test]
    fn test_first_matching_zone_wins() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let zones = vec![square("wing", 0.0, 5.0), square("corner", 0.0, 3.0)];

        let outcome = pipeline
            .update("s", &GeoPoint::new(1.0, 1.0), &triangle_beacons(), &zones)
            .unwrap();
        assert_eq!(outcome.estimate().unwrap().zone_id.as_deref(), Some("wing"));
    }

    #[test]
    fn test_located_outside_zones() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let zones = vec![square("far", 50.0, 60.0)];

        let outcome = pipeline
            .update("s", &GeoPoint::new(1.0, 1.0), &triangle_beacons(), &zones)
            .unwrap();
        let estimate = outcome.estimate().unwrap();
        assert!(!estimate.in_restricted_zone);
        assert!(estimate.zone_id.is_none());
        assert!(!outcome.is_intrusion());
    }

    #[test]
    fn test_malformed_zone_fails_fast() {
        let pipeline = TrackingPipeline::new(&planar_config()).unwrap();
        let zones = vec![Zone::new("line", vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(5.0, 5.0)])];

        let result = pipeline.update("s", &GeoPoint::new(1.0, 1.0), &triangle_beacons(), &zones);
        assert_eq!(
            result,
            Err(TrackingError::MalformedPolygon { zone_id: Some("line".to_string()), vertices: 2 })
        );
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let pipeline = TrackingPipeline::default();
        let result = pipeline.update("s", &GeoPoint::new(f64::NAN, 0.0), &triangle_beacons(), &[]);
        assert!(matches!(result, Err(TrackingError::InvalidPosition { .. })));
    }

    #[test]
    fn test_multilateration_mode() {
        let config = EngineConfig {
            fusion_mode: FusionMode::Multilateration,
            ..planar_config()
        };
        let pipeline = TrackingPipeline::new(&config).unwrap();

        let outcome = pipeline
            .update("s", &GeoPoint::new(1.0, 1.0), &triangle_beacons(), &[])
            .unwrap();
        match outcome {
            TrackingOutcome::Located { estimate, error_m, .. } => {
                assert_eq!(estimate.method, EstimationMethod::Multilateration);
                assert!(error_m < 1e-6);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let negative_scale = EngineConfig {
            distance_metric: DistanceMetric::Planar { meters_per_unit: -1.0 },
            ..EngineConfig::default()
        };
        assert!(matches!(
            TrackingPipeline::new(&negative_scale),
            Err(ConfigError::InvalidParameter { .. })
        ));

        let zero_scale = EngineConfig {
            distance_metric: DistanceMetric::Planar { meters_per_unit: 0.0 },
            ..EngineConfig::default()
        };
        assert!(TrackingPipeline::new(&zero_scale).is_err());

        let flat_loss = EngineConfig {
            path_loss_exponent: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            TrackingPipeline::new(&flat_loss),
            Err(ConfigError::InvalidParameter { ref parameter, .. }) if parameter == "path_loss_exponent"
        ));
    }

    #[test]
    fn test_outcome_serialization_tag() {
        let json = serde_json::to_value(TrackingOutcome::NoDetection).unwrap();
        assert_eq!(json["status"], "no_detection");
    }
}
