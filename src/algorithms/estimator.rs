//! Position fusion from beacon detections
//!
//! The default mode is an inverse-distance weighted centroid of the three
//! strongest beacons, which stays inside their triangle. Least-squares
//! multilateration over every detection is available as a separate mode.

use crate::algorithms::geodesy::DistanceMetric;
use crate::algorithms::propagation::PropagationModel;
use crate::core::{
    Detection, EstimationMethod, GeoPoint, PositionEstimate, CENTROID_DETECTIONS, MIN_DETECTIONS,
};
use nalgebra::{DMatrix, DVector, Vector2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, warn};

/// Fusion algorithm used by [`PositionEstimator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    #[default]
    WeightedCentroid,
    Multilateration,
}

/// Arithmetic failures of a fusion step; recovered by the estimator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    #[error("weight sum {sum} cannot normalize the centroid")]
    DegenerateWeights { sum: f64 },
    #[error("fused coordinate is not finite")]
    NonFinite,
    #[error("beacon geometry is singular (determinant {determinant:e})")]
    SingularGeometry { determinant: f64 },
    #[error("at least {required} anchors required, got {available}")]
    InsufficientAnchors { available: usize, required: usize },
}

/// Fuses detections into one coordinate
#[derive(Debug, Clone, Default)]
pub struct PositionEstimator {
    model: PropagationModel,
    metric: DistanceMetric,
    mode: FusionMode,
}

impl PositionEstimator {
    pub fn new(model: PropagationModel, metric: DistanceMetric, mode: FusionMode) -> Self {
        Self { model, metric, mode }
    }

    pub fn mode(&self) -> FusionMode {
        self.mode
    }

    /// Estimate the subject position, or `None` with fewer than three detections.
    ///
    /// Fusion failures never surface: the strongest beacon position is
    /// reported instead, tagged [`EstimationMethod::NearestBeaconFallback`].
    pub fn estimate(&self, subject_id: &str, detections: &[Detection]) -> Option<PositionEstimate> {
        if detections.len() < MIN_DETECTIONS {
            debug!(
                subject = subject_id,
                detections = detections.len(),
                "not enough detections to fuse a position"
            );
            return None;
        }

        // Stable, so equal signals keep catalog order
        let mut ranked: Vec<&Detection> = detections.iter().collect();
        ranked.sort_by(|a, b| b.signal_dbm.partial_cmp(&a.signal_dbm).unwrap_or(Ordering::Equal));
        let nearest = ranked[0];

        let fused = match self.mode {
            FusionMode::WeightedCentroid => {
                let anchors: Vec<(GeoPoint, f64)> = ranked
                    .iter()
                    .take(CENTROID_DETECTIONS)
                    .map(|d| (d.beacon.position, self.recovered_distance(d)))
                    .collect();
                weighted_centroid(&anchors).map(|p| (p, EstimationMethod::WeightedCentroid))
            }
            FusionMode::Multilateration => {
                let anchors: Vec<(GeoPoint, f64)> = ranked
                    .iter()
                    .map(|d| (d.beacon.position, self.recovered_distance(d)))
                    .collect();
                multilaterate(&anchors, &self.metric).map(|p| (p, EstimationMethod::Multilateration))
            }
        };

        let (position, method) = match fused {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    subject = subject_id,
                    beacon = %nearest.beacon.id,
                    error = %e,
                    "fusion failed, using strongest beacon position"
                );
                (nearest.beacon.position, EstimationMethod::NearestBeaconFallback)
            }
        };

        debug!(
            subject = subject_id,
            lat = position.lat,
            lng = position.lng,
            ?method,
            "position estimated"
        );

        Some(PositionEstimate {
            subject_id: subject_id.to_string(),
            position,
            nearest_beacon: Some(nearest.beacon.id.clone()),
            signal_dbm: Some(nearest.signal_dbm),
            in_restricted_zone: false,
            zone_id: None,
            method,
        })
    }

    fn recovered_distance(&self, detection: &Detection) -> f64 {
        self.model
            .estimate_distance(detection.signal_dbm, detection.beacon.tx_power_dbm)
    }
}

/// [`PositionEstimator::estimate`] with the default weighted centroid
pub fn estimate(subject_id: &str, detections: &[Detection]) -> Option<PositionEstimate> {
    PositionEstimator::default().estimate(subject_id, detections)
}

/// Inverse-distance weighted centroid, `w = 1 / (d + 1)`
pub fn weighted_centroid(anchors: &[(GeoPoint, f64)]) -> Result<GeoPoint, FusionError> {
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;
    let mut weight_sum = 0.0;

    for (position, distance) in anchors {
        let weight = 1.0 / (distance + 1.0);
        lat_sum += position.lat * weight;
        lng_sum += position.lng * weight;
        weight_sum += weight;
    }

    if !weight_sum.is_finite() || weight_sum <= 0.0 {
        return Err(FusionError::DegenerateWeights { sum: weight_sum });
    }

    let fused = GeoPoint::new(lat_sum / weight_sum, lng_sum / weight_sum);
    if !fused.is_finite() {
        return Err(FusionError::NonFinite);
    }
    Ok(fused)
}

/// Linearized least-squares circle intersection in a local metric plane.
///
/// Subtracting the first range equation from the others gives
/// `2 (p_i - p_0) . x = r_0^2 - r_i^2 + |p_i|^2 - |p_0|^2`.
pub fn multilaterate(anchors: &[(GeoPoint, f64)], metric: &DistanceMetric) -> Result<GeoPoint, FusionError> {
    if anchors.len() < MIN_DETECTIONS {
        return Err(FusionError::InsufficientAnchors {
            available: anchors.len(),
            required: MIN_DETECTIONS,
        });
    }

    let origin = anchors[0].0;
    let local: Vec<Vector2<f64>> = anchors.iter().map(|(p, _)| metric.to_local(p, &origin)).collect();
    let p0 = local[0];
    let r0 = anchors[0].1;

    let rows = anchors.len() - 1;
    let mut a = DMatrix::<f64>::zeros(rows, 2);
    let mut b = DVector::<f64>::zeros(rows);
    for i in 1..anchors.len() {
        let pi = local[i];
        let ri = anchors[i].1;
        a[(i - 1, 0)] = 2.0 * (pi.x - p0.x);
        a[(i - 1, 1)] = 2.0 * (pi.y - p0.y);
        b[i - 1] = r0.powi(2) - ri.powi(2) + pi.norm_squared() - p0.norm_squared();
    }

    let at = a.transpose();
    let ata = &at * &a;
    let atb = &at * &b;

    let determinant = ata.determinant();
    if !determinant.is_finite() || determinant.abs() <= 1e-9 * ata.norm_squared() {
        return Err(FusionError::SingularGeometry { determinant });
    }
    let inverse = ata
        .try_inverse()
        .ok_or(FusionError::SingularGeometry { determinant })?;
    let solution = inverse * atb;

    let fused = metric.from_local(&Vector2::new(solution[0], solution[1]), &origin);
    if !fused.is_finite() {
        return Err(FusionError::NonFinite);
    }
    Ok(fused)
}
