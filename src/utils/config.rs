use crate::algorithms::estimator::FusionMode;
use crate::algorithms::geodesy::DistanceMetric;
use crate::core::{Beacon, Zone, FREE_SPACE_PATH_LOSS_EXPONENT};
use crate::processing::pipeline::TrackingPipeline;
use crate::validation::data::{CatalogIssue, CatalogValidator, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Lowest accepted path loss exponent (free space)
pub const MIN_PATH_LOSS_EXPONENT: f64 = 2.0;

/// Highest accepted path loss exponent (dense indoor)
pub const MAX_PATH_LOSS_EXPONENT: f64 = 4.0;

/// Engine-wide estimation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Environment exponent of the propagation model
    pub path_loss_exponent: f64,
    /// How coordinates are measured
    pub distance_metric: DistanceMetric,
    /// Fusion algorithm
    pub fusion_mode: FusionMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_loss_exponent: FREE_SPACE_PATH_LOSS_EXPONENT,
            distance_metric: DistanceMetric::Haversine,
            fusion_mode: FusionMode::WeightedCentroid,
        }
    }
}

impl EngineConfig {
    /// Check every parameter, returning the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_path_loss_exponent(self.path_loss_exponent)?;
        check_distance_metric(&self.distance_metric)?;
        Ok(())
    }
}

/// Beacon and zone snapshot handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub beacons: Vec<Beacon>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("failed to access config file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}'", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog rejected: {}", .0.first().map(|e| e.to_string()).unwrap_or_default())]
    InvalidCatalog(Vec<CatalogIssue>),
    #[error("unknown beacon {0}")]
    UnknownBeacon(String),
    #[error("no file path set for saving configuration")]
    NoFilePath,
}

/// On-disk layout of a configuration file
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFileData {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(flatten)]
    catalog: CatalogSnapshot,
}

/// Owns the engine parameters and the catalog snapshot
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    engine: EngineConfig,
    catalog: CatalogSnapshot,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load it from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// Replace the engine parameters after validation
    pub fn update_engine_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        check_catalog(&config.distance_metric, &self.catalog)?;
        self.engine = config;
        self.is_modified = true;
        Ok(())
    }

    /// Replace the catalog after validation; warnings are logged and returned
    pub fn replace_catalog(&mut self, catalog: CatalogSnapshot) -> Result<ValidationReport, ConfigError> {
        let report = check_catalog(&self.engine.distance_metric, &catalog)?;
        self.catalog = catalog;
        self.is_modified = true;
        Ok(report)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref().to_path_buf();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let data: ConfigFileData = serde_json::from_str(&content).map_err(|source| ConfigError::Serialization {
            path: path.clone(),
            source,
        })?;

        data.engine.validate()?;
        check_catalog(&data.engine.distance_metric, &data.catalog)?;
        self.engine = data.engine;
        self.catalog = data.catalog;

        info!(
            path = %path.display(),
            beacons = self.catalog.beacons.len(),
            zones = self.catalog.zones.len(),
            "configuration loaded"
        );
        self.config_file_path = Some(path);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref().to_path_buf();
        let data = ConfigFileData {
            engine: self.engine.clone(),
            catalog: self.catalog.clone(),
        };

        let content = serde_json::to_string_pretty(&data).map_err(|source| ConfigError::Serialization {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        self.config_file_path = Some(path);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> Result<(), ConfigError> {
        let path = self.config_file_path.clone().ok_or(ConfigError::NoFilePath)?;
        self.save_to_file(path)
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Update the path loss exponent, returning the previous value
    pub fn set_path_loss_exponent(&mut self, exponent: f64) -> Result<f64, ConfigError> {
        check_path_loss_exponent(exponent)?;
        let old_value = self.engine.path_loss_exponent;
        self.engine.path_loss_exponent = exponent;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Switch fusion algorithm, returning the previous one
    pub fn set_fusion_mode(&mut self, mode: FusionMode) -> FusionMode {
        let old_value = self.engine.fusion_mode;
        self.engine.fusion_mode = mode;
        self.is_modified = true;
        old_value
    }

    /// Switch distance metric, returning the previous one.
    ///
    /// The catalog is re-validated since degree ranges only apply to Haversine.
    pub fn set_distance_metric(&mut self, metric: DistanceMetric) -> Result<DistanceMetric, ConfigError> {
        check_distance_metric(&metric)?;
        check_catalog(&metric, &self.catalog)?;

        let old_value = self.engine.distance_metric;
        self.engine.distance_metric = metric;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Enable or disable a beacon, returning its previous state
    pub fn set_beacon_active(&mut self, beacon_id: &str, active: bool) -> Result<bool, ConfigError> {
        let beacon = self
            .catalog
            .beacons
            .iter_mut()
            .find(|b| b.id == beacon_id)
            .ok_or_else(|| ConfigError::UnknownBeacon(beacon_id.to_string()))?;

        let old_value = beacon.active;
        beacon.active = active;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Add a beacon or replace the one with the same id
    pub fn upsert_beacon(&mut self, beacon: Beacon) -> Result<(), ConfigError> {
        let mut catalog = self.catalog.clone();
        match catalog.beacons.iter_mut().find(|b| b.id == beacon.id) {
            Some(existing) => *existing = beacon,
            None => catalog.beacons.push(beacon),
        }
        self.replace_catalog(catalog).map(|_| ())
    }

    /// Remove a beacon; zones no longer list it
    pub fn remove_beacon(&mut self, beacon_id: &str) -> Option<Beacon> {
        let index = self.catalog.beacons.iter().position(|b| b.id == beacon_id)?;
        for zone in &mut self.catalog.zones {
            zone.beacon_ids.retain(|id| id != beacon_id);
        }
        self.is_modified = true;
        Some(self.catalog.beacons.remove(index))
    }

    /// Add a zone or replace the one with the same id
    pub fn upsert_zone(&mut self, zone: Zone) -> Result<(), ConfigError> {
        let mut catalog = self.catalog.clone();
        match catalog.zones.iter_mut().find(|z| z.id == zone.id) {
            Some(existing) => *existing = zone,
            None => catalog.zones.push(zone),
        }
        self.replace_catalog(catalog).map(|_| ())
    }

    pub fn remove_zone(&mut self, zone_id: &str) -> Option<Zone> {
        let index = self.catalog.zones.iter().position(|z| z.id == zone_id)?;
        self.is_modified = true;
        Some(self.catalog.zones.remove(index))
    }

    pub fn active_beacons(&self) -> Vec<&Beacon> {
        self.catalog.beacons.iter().filter(|b| b.active).collect()
    }

    /// Build a pipeline for the current engine parameters
    pub fn pipeline(&self) -> TrackingPipeline {
        TrackingPipeline::from_validated(&self.engine)
    }
}

fn check_catalog(metric: &DistanceMetric, catalog: &CatalogSnapshot) -> Result<ValidationReport, ConfigError> {
    let report = CatalogValidator::new(*metric).validate(&catalog.beacons, &catalog.zones);
    if !report.is_valid() {
        return Err(ConfigError::InvalidCatalog(report.errors));
    }
    for issue in &report.warnings {
        warn!(%issue, "catalog warning");
    }
    Ok(report)
}

fn check_path_loss_exponent(exponent: f64) -> Result<(), ConfigError> {
    if !(MIN_PATH_LOSS_EXPONENT..=MAX_PATH_LOSS_EXPONENT).contains(&exponent) {
        return Err(ConfigError::InvalidParameter {
            parameter: "path_loss_exponent".to_string(),
            value: exponent.to_string(),
            reason: format!(
                "Path loss exponent must be between {} and {}",
                MIN_PATH_LOSS_EXPONENT, MAX_PATH_LOSS_EXPONENT
            ),
        });
    }
    Ok(())
}

fn check_distance_metric(metric: &DistanceMetric) -> Result<(), ConfigError> {
    if let DistanceMetric::Planar { meters_per_unit } = *metric {
        if !(meters_per_unit.is_finite() && meters_per_unit > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "distance_metric.meters_per_unit".to_string(),
                value: meters_per_unit.to_string(),
                reason: "Map scale must be a positive number of meters".to_string(),
            });
        }
    }
    Ok(())
}
