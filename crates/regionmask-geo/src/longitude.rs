//! Longitude convention detection and wrapping

use ndarray::Array2;
use regionmask_core::models::{LonConvention, WrapLon};

/// Detect the convention of a grid's longitudes, `None` for an empty grid
pub fn grid_convention(lon: &Array2<f64>) -> Option<LonConvention> {
    if lon.is_empty() {
        return None;
    }

    let lon_min = lon.iter().copied().fold(f64::INFINITY, f64::min);
    let lon_max = lon.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(LonConvention::detect(lon_min, lon_max))
}

/// Target convention for grid longitudes, `None` if they are used as given
pub fn resolve_target(wrap: WrapLon, regions: LonConvention) -> Option<LonConvention> {
    match wrap {
        WrapLon::Auto => Some(regions),
        WrapLon::Disabled => None,
        WrapLon::To180 => Some(LonConvention::Lon180),
        WrapLon::To360 => Some(LonConvention::Lon360),
    }
}

/// Wrap a longitude to a convention.
///
/// Values inside the closed interval of the convention are returned
/// unchanged, so 180 stays 180 and 360 stays 360. Values outside are shifted
/// by a multiple of 360 into the half-open interval.
pub fn wrap_value(lon: f64, convention: LonConvention) -> f64 {
    let (lo, hi) = convention.range();
    if lon.is_nan() || (lo..=hi).contains(&lon) {
        return lon;
    }
    (lon - lo).rem_euclid(360.0) + lo
}

/// Wrap every longitude of a grid to a convention
pub fn wrap_grid(lon: &Array2<f64>, convention: LonConvention) -> Array2<f64> {
    lon.mapv(|value| wrap_value(value, convention))
}
