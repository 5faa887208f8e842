//! regionmask core - Region models, lookup, and configuration
//!
//! This crate contains the region collection data model (regions, outlines,
//! bounds, identifier lookup) and the layered configuration used by the mask
//! engine in `regionmask-geo`.

pub mod config;
pub mod error;
pub mod models;

pub use config::{MaskConfig, MaskOptions};
pub use error::{RegionmaskError, Result};
pub use models::{
    Bounds, LonConvention, Outline, Region, RegionGeometry, RegionInput, RegionKey, Regions,
    RegionsBuilder, Selection, Selector, ValidityMode, WrapLon,
};
