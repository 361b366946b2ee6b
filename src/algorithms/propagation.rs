//! Log-distance path loss model
//!
//! Converts a geometric distance into a simulated received signal strength and
//! back. Both directions share the same path loss exponent so that
//! `estimate_distance(simulate_signal(d))` recovers `d`.

use crate::core::{FREE_SPACE_PATH_LOSS_EXPONENT, UNDETECTABLE_SIGNAL_DBM};
use serde::{Deserialize, Serialize};

/// Path loss model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    /// Environment exponent (2.0 = free space, up to 4.0 indoors)
    pub path_loss_exponent: f64,
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self {
            path_loss_exponent: FREE_SPACE_PATH_LOSS_EXPONENT,
        }
    }
}

impl PropagationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exponent(path_loss_exponent: f64) -> Self {
        Self { path_loss_exponent }
    }

    /// Simulated signal strength received at `distance_m` from a beacon.
    ///
    /// Beyond the coverage radius the sentinel [`UNDETECTABLE_SIGNAL_DBM`] is
    /// returned exactly. A distance of zero (or less) yields the reference power.
    pub fn simulate_signal(&self, distance_m: f64, reference_dbm: i32, coverage_radius_m: f64) -> f64 {
        if distance_m > coverage_radius_m {
            return UNDETECTABLE_SIGNAL_DBM;
        }
        if distance_m <= 0.0 {
            return reference_dbm as f64;
        }

        reference_dbm as f64 - 10.0 * self.path_loss_exponent * distance_m.log10()
    }

    /// Distance implied by a received signal strength
    pub fn estimate_distance(&self, signal_dbm: f64, reference_dbm: i32) -> f64 {
        10f64.powf((reference_dbm as f64 - signal_dbm) / (10.0 * self.path_loss_exponent))
    }
}

/// [`PropagationModel::simulate_signal`] with the free-space exponent
pub fn simulate_signal(distance_m: f64, reference_dbm: i32, coverage_radius_m: f64) -> f64 {
    PropagationModel::default().simulate_signal(distance_m, reference_dbm, coverage_radius_m)
}

/// [`PropagationModel::estimate_distance`] with the free-space exponent
pub fn estimate_distance(signal_dbm: f64, reference_dbm: i32) -> f64 {
    PropagationModel::default().estimate_distance(signal_dbm, reference_dbm)
}
