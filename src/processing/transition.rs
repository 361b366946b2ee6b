//! Zone transitions between consecutive estimates of one subject
//!
//! The pipeline itself keeps no history. Callers that want one alert per
//! intrusion compare the previous estimate with the current one here.

use crate::core::PositionEstimate;
use serde::{Deserialize, Serialize};

/// Change in restricted-zone membership between two updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneTransition {
    /// Outside every zone before and after
    Outside,
    /// Was outside (or unknown), now inside
    Entered { zone_id: String },
    /// Still inside the same zone
    Remained { zone_id: String },
    /// Crossed directly from one zone into another
    Moved { from: String, to: String },
    /// Was inside, now outside
    Left { zone_id: String },
}

impl ZoneTransition {
    pub fn between(previous: Option<&PositionEstimate>, current: &PositionEstimate) -> Self {
        let before = previous.and_then(|p| p.zone_id.clone());
        match (before, current.zone_id.clone()) {
            (None, None) => ZoneTransition::Outside,
            (None, Some(zone_id)) => ZoneTransition::Entered { zone_id },
            (Some(zone_id), None) => ZoneTransition::Left { zone_id },
            (Some(from), Some(to)) if from == to => ZoneTransition::Remained { zone_id: to },
            (Some(from), Some(to)) => ZoneTransition::Moved { from, to },
        }
    }

    /// True for transitions that put the subject in a zone it was not in
    pub fn raises_alert(&self) -> bool {
        matches!(self, ZoneTransition::Entered { .. } | ZoneTransition::Moved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EstimationMethod, GeoPoint};

    fn estimate(zone: Option<&str>) -> PositionEstimate {
        let mut estimate = PositionEstimate {
            subject_id: "s".to_string(),
            position: GeoPoint::new(1.0, 1.0),
            nearest_beacon: None,
            signal_dbm: None,
            in_restricted_zone: false,
            zone_id: None,
            method: EstimationMethod::WeightedCentroid,
        };
        if let Some(zone) = zone {
            estimate.mark_inside(zone.to_string());
        }
        estimate
    }

    #[test]
    fn test_first_update() {
        assert_eq!(ZoneTransition::between(None, &estimate(None)), ZoneTransition::Outside);

        let entered = ZoneTransition::between(None, &estimate(Some("lab")));
        assert_eq!(entered, ZoneTransition::Entered { zone_id: "lab".to_string() });
        assert!(entered.raises_alert());
    }

    #[test]
    fn test_sequence() {
        let outside = estimate(None);
        let lab = estimate(Some("lab"));
        let office = estimate(Some("office"));

        assert!(ZoneTransition::between(Some(&outside), &lab).raises_alert());

        let remained = ZoneTransition::between(Some(&lab), &lab);
        assert_eq!(remained, ZoneTransition::Remained { zone_id: "lab".to_string() });
        assert!(!remained.raises_alert());

        let moved = ZoneTransition::between(Some(&lab), &office);
        assert_eq!(moved, ZoneTransition::Moved { from: "lab".to_string(), to: "office".to_string() });
        assert!(moved.raises_alert());

        let left = ZoneTransition::between(Some(&office), &outside);
        assert_eq!(left, ZoneTransition::Left { zone_id: "office".to_string() });
        assert!(!left.raises_alert());
    }
}
