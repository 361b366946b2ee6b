//! Core types and constants for the location estimation engine

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
