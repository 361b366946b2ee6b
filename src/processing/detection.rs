//! Simulated beacon detection for a known subject position

use crate::algorithms::geodesy::DistanceMetric;
use crate::algorithms::propagation::PropagationModel;
use crate::core::{Beacon, Detection, GeoPoint, UNDETECTABLE_SIGNAL_DBM};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Produces the beacons a subject would hear from its true position
#[derive(Debug, Clone, Default)]
pub struct DetectionSimulator {
    model: PropagationModel,
    metric: DistanceMetric,
}

impl DetectionSimulator {
    pub fn new(model: PropagationModel, metric: DistanceMetric) -> Self {
        Self { model, metric }
    }

    pub fn metric(&self) -> &DistanceMetric {
        &self.metric
    }

    /// Detected beacons, strongest signal first.
    ///
    /// Inactive beacons and beacons whose signal is not above the
    /// undetectable sentinel are dropped. Equal signals keep catalog order.
    pub fn detect(&self, true_position: &GeoPoint, beacons: &[Beacon]) -> Vec<Detection> {
        let mut detections: Vec<Detection> = beacons
            .iter()
            .filter(|beacon| beacon.active)
            .filter_map(|beacon| {
                let distance = self.metric.distance(true_position, &beacon.position);
                let signal = self
                    .model
                    .simulate_signal(distance, beacon.tx_power_dbm, beacon.coverage_radius_m);
                trace!(beacon = %beacon.id, distance, signal, "simulated beacon signal");

                if signal > UNDETECTABLE_SIGNAL_DBM {
                    Some(Detection {
                        beacon: beacon.clone(),
                        signal_dbm: signal,
                        distance_m: distance,
                        zone_category: beacon.zone_category,
                    })
                } else {
                    None
                }
            })
            .collect();

        detections.sort_by(|a, b| b.signal_dbm.partial_cmp(&a.signal_dbm).unwrap_or(Ordering::Equal));

        debug!(
            catalog = beacons.len(),
            detected = detections.len(),
            "beacon detection pass complete"
        );
        detections
    }
}

/// [`DetectionSimulator::detect`] with free-space propagation and Haversine distances
pub fn detect(true_position: &GeoPoint, beacons: &[Beacon]) -> Vec<Detection> {
    DetectionSimulator::default().detect(true_position, beacons)
}
