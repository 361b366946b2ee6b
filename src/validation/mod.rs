//! Catalog validation and error reporting

pub mod data;
pub mod error;

pub use data::{CatalogIssue, CatalogValidator, ValidationReport};
pub use error::{TrackingError, TrackingResult};
