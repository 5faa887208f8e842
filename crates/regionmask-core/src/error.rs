//! Error types for regionmask

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionmaskError {
    // Outline and grid validation errors
    #[error("Shape error: {reason}")]
    Shape { reason: String },

    #[error("Size mismatch for {what}: expected {expected} entries, found {found}")]
    SizeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Key mismatch for {what}: {reason}")]
    KeyMismatch { what: String, reason: String },

    #[error("Region number {number} is defined more than once")]
    DuplicateNumber { number: u32 },

    #[error("Identifier '{key}' is used by region {first} and region {second}")]
    DuplicateIdentifier {
        key: String,
        first: u32,
        second: u32,
    },

    #[error("Non-finite coordinate in {what}")]
    NonFiniteCoordinate { what: String },

    #[error("Invalid geometry in region {number}: {reason}")]
    InvalidGeometry { number: u32, reason: String },

    // Lookup errors
    #[error("Region not found: {key}")]
    KeyNotFound { key: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegionmaskError>;
