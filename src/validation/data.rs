use crate::algorithms::geodesy::DistanceMetric;
use crate::algorithms::zone::MIN_POLYGON_VERTICES;
use crate::core::{Beacon, GeoPoint, Zone, MIN_DETECTIONS};
use std::collections::HashSet;
use thiserror::Error;

/// Problems found in a beacon or zone catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogIssue {
    #[error("beacon {beacon_id}: coverage radius {radius_m} m must be positive")]
    InvalidCoverage { beacon_id: String, radius_m: f64 },
    #[error("beacon {beacon_id}: position is not a finite coordinate")]
    NonFinitePosition { beacon_id: String },
    #[error("beacon {beacon_id}: latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { beacon_id: String, lat: f64 },
    #[error("beacon {beacon_id}: longitude {lng} outside [-180, 180]")]
    LongitudeOutOfRange { beacon_id: String, lng: f64 },
    #[error("duplicate beacon id {beacon_id}")]
    DuplicateBeacon { beacon_id: String },
    #[error("zone {zone_id}: {vertices} vertices, at least 3 are required")]
    MalformedZone { zone_id: String, vertices: usize },
    #[error("zone {zone_id}: vertex {index} is not a finite coordinate")]
    NonFiniteVertex { zone_id: String, index: usize },
    #[error("duplicate zone id {zone_id}")]
    DuplicateZone { zone_id: String },
    #[error("zone {zone_id} references unknown beacon {beacon_id}")]
    UnknownZoneBeacon { zone_id: String, beacon_id: String },
    #[error("zone {zone_id} encloses no area")]
    ZeroAreaZone { zone_id: String },
    #[error("only {active} active beacons, a position needs {required}")]
    TooFewActiveBeacons { active: usize, required: usize },
}

/// Outcome of a catalog check
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems that make the catalog unusable
    pub errors: Vec<CatalogIssue>,
    /// Problems the engine tolerates
    pub warnings: Vec<CatalogIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks beacon and zone snapshots before they are handed to the engine
#[derive(Debug, Clone, Default)]
pub struct CatalogValidator {
    metric: DistanceMetric,
}

impl CatalogValidator {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    pub fn validate(&self, beacons: &[Beacon], zones: &[Zone]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut beacon_ids = HashSet::new();

        for beacon in beacons {
            if !beacon_ids.insert(beacon.id.as_str()) {
                report.errors.push(CatalogIssue::DuplicateBeacon {
                    beacon_id: beacon.id.clone(),
                });
            }
            if !(beacon.coverage_radius_m.is_finite() && beacon.coverage_radius_m > 0.0) {
                report.errors.push(CatalogIssue::InvalidCoverage {
                    beacon_id: beacon.id.clone(),
                    radius_m: beacon.coverage_radius_m,
                });
            }
            self.check_beacon_position(beacon, &mut report);
        }

        let active = beacons.iter().filter(|b| b.active).count();
        if active < MIN_DETECTIONS {
            report.warnings.push(CatalogIssue::TooFewActiveBeacons {
                active,
                required: MIN_DETECTIONS,
            });
        }

        let mut zone_ids = HashSet::new();
        for zone in zones {
            if !zone_ids.insert(zone.id.as_str()) {
                report.errors.push(CatalogIssue::DuplicateZone { zone_id: zone.id.clone() });
            }
            self.check_zone(zone, &beacon_ids, &mut report);
        }

        report
    }

    fn check_beacon_position(&self, beacon: &Beacon, report: &mut ValidationReport) {
        let position = &beacon.position;
        if !position.is_finite() {
            report.errors.push(CatalogIssue::NonFinitePosition {
                beacon_id: beacon.id.clone(),
            });
            return;
        }

        // Planar map coordinates have no fixed range
        if let DistanceMetric::Haversine = self.metric {
            if !(-90.0..=90.0).contains(&position.lat) {
                report.errors.push(CatalogIssue::LatitudeOutOfRange {
                    beacon_id: beacon.id.clone(),
                    lat: position.lat,
                });
            }
            if !(-180.0..=180.0).contains(&position.lng) {
                report.errors.push(CatalogIssue::LongitudeOutOfRange {
                    beacon_id: beacon.id.clone(),
                    lng: position.lng,
                });
            }
        }
    }

    fn check_zone(&self, zone: &Zone, beacon_ids: &HashSet<&str>, report: &mut ValidationReport) {
        if zone.vertices.len() < MIN_POLYGON_VERTICES {
            report.errors.push(CatalogIssue::MalformedZone {
                zone_id: zone.id.clone(),
                vertices: zone.vertices.len(),
            });
        }

        let mut finite = true;
        for (index, vertex) in zone.vertices.iter().enumerate() {
            if !vertex.is_finite() {
                finite = false;
                report.errors.push(CatalogIssue::NonFiniteVertex {
                    zone_id: zone.id.clone(),
                    index,
                });
            }
        }

        if finite && zone.vertices.len() >= MIN_POLYGON_VERTICES && polygon_area(&zone.vertices) == 0.0 {
            report.warnings.push(CatalogIssue::ZeroAreaZone { zone_id: zone.id.clone() });
        }

        for beacon_id in &zone.beacon_ids {
            if !beacon_ids.contains(beacon_id.as_str()) {
                report.errors.push(CatalogIssue::UnknownZoneBeacon {
                    zone_id: zone.id.clone(),
                    beacon_id: beacon_id.clone(),
                });
            }
        }
    }
}

/// Unsigned shoelace area in coordinate units
fn polygon_area(vertices: &[GeoPoint]) -> f64 {
    let mut twice_area = 0.0;
    let mut j = vertices.len() - 1;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = &vertices[j];
        twice_area += (vj.lng + vi.lng) * (vj.lat - vi.lat);
        j = i;
    }
    (twice_area / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacons() -> Vec<Beacon> {
        vec![
            Beacon::new("a", GeoPoint::new(36.75, 3.05)),
            Beacon::new("b", GeoPoint::new(36.7501, 3.05)),
            Beacon::new("c", GeoPoint::new(36.75, 3.0501)),
        ]
    }

    fn square(id: &str) -> Zone {
        Zone::new(
            id,
            vec![
                GeoPoint::new(36.75, 3.05),
                GeoPoint::new(36.75, 3.0502),
                GeoPoint::new(36.7502, 3.0502),
                GeoPoint::new(36.7502, 3.05),
            ],
        )
    }

    #[test]
    fn test_valid_catalog() {
        let zones = vec![square("lab").with_beacons(vec!["a".to_string()])];
        let report = CatalogValidator::default().validate(&beacons(), &zones);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_invalid_beacons() {
        let mut catalog = beacons();
        catalog.push(Beacon::new("a", GeoPoint::new(95.0, -200.0)).with_coverage(0.0));
        catalog.push(Beacon::new("nan", GeoPoint::new(f64::NAN, 0.0)).with_coverage(f64::NAN));

        let report = CatalogValidator::default().validate(&catalog, &[]);
        assert!(!report.is_valid());
        assert!(report.errors.contains(&CatalogIssue::DuplicateBeacon { beacon_id: "a".to_string() }));
        assert!(report.errors.contains(&CatalogIssue::LatitudeOutOfRange { beacon_id: "a".to_string(), lat: 95.0 }));
        assert!(report.errors.contains(&CatalogIssue::LongitudeOutOfRange { beacon_id: "a".to_string(), lng: -200.0 }));
        assert!(report.errors.contains(&CatalogIssue::NonFinitePosition { beacon_id: "nan".to_string() }));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, CatalogIssue::InvalidCoverage { beacon_id, .. } if beacon_id == "nan")));
    }

    #[test]
    fn test_planar_metric_skips_degree_ranges() {
        let catalog = vec![
            Beacon::new("a", GeoPoint::new(250.0, 400.0)),
            Beacon::new("b", GeoPoint::new(260.0, 400.0)),
            Beacon::new("c", GeoPoint::new(250.0, 410.0)),
        ];
        let validator = CatalogValidator::new(DistanceMetric::Planar { meters_per_unit: 0.1 });
        assert!(validator.validate(&catalog, &[]).is_valid());
    }

    #[test]
    fn test_invalid_zones() {
        let zones = vec![
            square("lab"),
            square("lab"),
            Zone::new("line", vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]),
            square("ghost").with_beacons(vec!["zz".to_string()]),
        ];

        let report = CatalogValidator::default().validate(&beacons(), &zones);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors.contains(&CatalogIssue::DuplicateZone { zone_id: "lab".to_string() }));
        assert!(report.errors.contains(&CatalogIssue::MalformedZone { zone_id: "line".to_string(), vertices: 2 }));
        assert!(report.errors.contains(&CatalogIssue::UnknownZoneBeacon {
            zone_id: "ghost".to_string(),
            beacon_id: "zz".to_string()
        }));
    }

    #[test]
    fn test_warnings() {
        let catalog = vec![Beacon::new("a", GeoPoint::new(0.0, 0.0)), Beacon::new("b", GeoPoint::new(0.0, 1.0)).inactive()];
        let zones = vec![Zone::new(
            "flat",
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)],
        )];

        let report = CatalogValidator::default().validate(&catalog, &zones);
        assert!(report.is_valid());
        assert!(report.warnings.contains(&CatalogIssue::TooFewActiveBeacons { active: 1, required: 3 }));
        assert!(report.warnings.contains(&CatalogIssue::ZeroAreaZone { zone_id: "flat".to_string() }));
    }

    #[test]
    fn test_polygon_area() {
        let unit = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0), GeoPoint::new(3.0, 2.0), GeoPoint::new(3.0, 0.0)];
        assert!((polygon_area(&unit) - 6.0).abs() < 1e-12);
    }
}
