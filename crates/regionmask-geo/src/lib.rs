//! regionmask geo - Longitude handling, validation, and mask rasterization
//!
//! This crate turns region collections from `regionmask-core` into gridded
//! masks, wrapping grid longitudes to the convention of the regions.

pub mod longitude;
pub mod mask;
pub mod validation;

pub use longitude::{grid_convention, resolve_target, wrap_grid, wrap_value};
pub use mask::{mask, mask_3d, Grid, Mask3D, MaskExt};
pub use validation::{count_invalid_regions, validate_region, validate_regions};
