//! Raster masks of regions on latitude/longitude grids

use crate::longitude::{grid_convention, resolve_target, wrap_grid};
use crate::validation::{validate_region, validate_regions};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, Zip};
use regionmask_core::config::MaskOptions;
use regionmask_core::error::{RegionmaskError, Result};
use regionmask_core::models::{LonConvention, Region, Regions, ValidityMode};
use std::sync::Arc;

/// Latitude/longitude coordinates of every grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lon: Array2<f64>,
    lat: Array2<f64>,
}

impl Grid {
    /// Broadcast 1D coordinate axes to a grid of shape `(lat.len(), lon.len())`
    pub fn from_axes(lon: Array1<f64>, lat: Array1<f64>) -> Result<Self> {
        let shape = (lat.len(), lon.len());
        let lon = Array2::from_shape_fn(shape, |(_, i)| lon[i]);
        let lat = Array2::from_shape_fn(shape, |(j, _)| lat[j]);
        Self::from_mesh(lon, lat)
    }

    /// Use 2D coordinate arrays, which must have the same shape
    pub fn from_mesh(lon: Array2<f64>, lat: Array2<f64>) -> Result<Self> {
        if lon.dim() != lat.dim() {
            return Err(RegionmaskError::Shape {
                reason: format!(
                    "lon and lat must have the same shape, found {:?} and {:?}",
                    lon.dim(),
                    lat.dim()
                ),
            });
        }

        check_finite(&lon, "lon")?;
        check_finite(&lat, "lat")?;

        Ok(Self { lon, lat })
    }

    /// Scattered points, laid out as a grid of shape `(1, n)`
    pub fn from_points(lon: Vec<f64>, lat: Vec<f64>) -> Result<Self> {
        if lon.len() != lat.len() {
            return Err(RegionmaskError::Shape {
                reason: format!(
                    "lon and lat must have the same length, found {} and {}",
                    lon.len(),
                    lat.len()
                ),
            });
        }

        let n = lon.len();
        let lon = Array2::from_shape_vec((1, n), lon)
            .map_err(|e| RegionmaskError::Shape { reason: e.to_string() })?;
        let lat = Array2::from_shape_vec((1, n), lat)
            .map_err(|e| RegionmaskError::Shape { reason: e.to_string() })?;
        Self::from_mesh(lon, lat)
    }

    /// Shape as `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }
}

fn check_finite(values: &Array2<f64>, what: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(RegionmaskError::NonFiniteCoordinate { what: what.to_string() })
    }
}

/// One boolean grid per region, stacked along the first axis
#[derive(Debug, Clone, PartialEq)]
pub struct Mask3D {
    data: Array3<bool>,
    numbers: Vec<u32>,
    names: Vec<String>,
    abbrevs: Vec<String>,
}

impl Mask3D {
    /// Boolean masks with shape `(regions, rows, columns)`
    pub fn data(&self) -> &Array3<bool> {
        &self.data
    }

    /// Region numbers along the first axis, ascending
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn abbrevs(&self) -> &[String] {
        &self.abbrevs
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// The mask of one region
    pub fn region(&self, number: u32) -> Option<ArrayView2<'_, bool>> {
        let index = self.numbers.iter().position(|n| *n == number)?;
        Some(self.data.index_axis(Axis(0), index))
    }

    /// Remove regions that contain no grid cell
    pub fn drop_empty(self) -> Self {
        let keep: Vec<usize> = self
            .data
            .outer_iter()
            .enumerate()
            .filter(|(_, slice)| slice.iter().any(|&hit| hit))
            .map(|(i, _)| i)
            .collect();

        Self {
            data: self.data.select(Axis(0), &keep),
            numbers: keep.iter().map(|&i| self.numbers[i]).collect(),
            names: keep.iter().map(|&i| self.names[i].clone()).collect(),
            abbrevs: keep.iter().map(|&i| self.abbrevs[i].clone()).collect(),
        }
    }

    /// Collapse to a single-label mask; overlapping cells get the highest number
    pub fn flatten(&self) -> Array2<f64> {
        let (_, rows, cols) = self.data.dim();
        let mut labels = Array2::from_elem((rows, cols), f64::NAN);

        for (slice, number) in self.data.outer_iter().zip(&self.numbers) {
            let value = f64::from(*number);
            Zip::from(&mut labels).and(&slice).for_each(|label, &hit| {
                if hit {
                    *label = value;
                }
            });
        }

        labels
    }
}

/// Masking methods on region collections
pub trait MaskExt {
    /// Label every grid cell with the number of the region containing it
    fn mask(&self, grid: &Grid, options: &MaskOptions) -> Result<Array2<f64>>;

    /// One boolean grid per region
    fn mask_3d(&self, grid: &Grid, options: &MaskOptions) -> Result<Mask3D>;
}

impl MaskExt for Regions {
    fn mask(&self, grid: &Grid, options: &MaskOptions) -> Result<Array2<f64>> {
        mask(self, grid, options)
    }

    fn mask_3d(&self, grid: &Grid, options: &MaskOptions) -> Result<Mask3D> {
        mask_3d(self, grid, options)
    }
}

/// Label every grid cell with the number of the region containing it.
///
/// Cells outside all regions are NaN. Regions are applied in ascending
/// number order and overwrite earlier ones, so a cell covered by several
/// regions gets the highest number.
pub fn mask(regions: &Regions, grid: &Grid, options: &MaskOptions) -> Result<Array2<f64>> {
    let (ordered, lon) = prepare(regions, grid, options)?;
    let mut labels = Array2::from_elem(grid.shape(), f64::NAN);

    for (region, _) in ordered.iter().filter(|(_, usable)| *usable) {
        let hits = region_hits(region, &lon, grid.lat());
        let value = f64::from(region.number());
        Zip::from(&mut labels).and(&hits).for_each(|label, &hit| {
            if hit {
                *label = value;
            }
        });
    }

    tracing::debug!(
        "Masked {} regions on a {:?} grid, {} cells labeled",
        regions.len(),
        grid.shape(),
        labels.iter().filter(|v| !v.is_nan()).count()
    );

    Ok(labels)
}

/// One boolean grid per region, in ascending number order.
///
/// Overlaps are preserved: a cell inside two regions is `true` in both.
pub fn mask_3d(regions: &Regions, grid: &Grid, options: &MaskOptions) -> Result<Mask3D> {
    let (ordered, lon) = prepare(regions, grid, options)?;
    let (rows, cols) = grid.shape();
    let mut data = Array3::from_elem((ordered.len(), rows, cols), false);

    for (i, (region, usable)) in ordered.iter().enumerate() {
        if *usable {
            let hits = region_hits(region, &lon, grid.lat());
            data.index_axis_mut(Axis(0), i).assign(&hits);
        }
    }

    let mask = Mask3D {
        data,
        numbers: ordered.iter().map(|(r, _)| r.number()).collect(),
        names: ordered.iter().map(|(r, _)| r.name().to_string()).collect(),
        abbrevs: ordered.iter().map(|(r, _)| r.abbrev().to_string()).collect(),
    };

    tracing::debug!("Built 3D mask for {} regions on a {:?} grid", mask.len(), grid.shape());

    if options.drop_empty {
        Ok(mask.drop_empty())
    } else {
        Ok(mask)
    }
}

/// Validate the regions, sort them by number and bring the grid longitudes
/// to the convention of the regions.
///
/// Strict validity fails on the first invalid region. Lenient validity keeps
/// invalid regions but flags them as unusable, so they label no cells.
fn prepare<'a>(
    regions: &'a Regions,
    grid: &Grid,
    options: &MaskOptions,
) -> Result<(Vec<(&'a Arc<Region>, bool)>, Array2<f64>)> {
    if options.validity == ValidityMode::Strict {
        validate_regions(regions)?;
    }

    let mut ordered: Vec<(&Arc<Region>, bool)> = regions
        .iter()
        .map(|region| match options.validity {
            ValidityMode::Strict => (region, true),
            ValidityMode::Lenient => {
                let usable = validate_region(region).is_valid;
                if !usable {
                    tracing::debug!("Skipping region {} with invalid geometry", region.number());
                }
                (region, usable)
            }
        })
        .collect();
    ordered.sort_by_key(|(r, _)| r.number());

    if let Some(bounds) = regions.bounds_global() {
        if LonConvention::is_mixed(bounds.min_lon, bounds.max_lon) {
            tracing::warn!(
                "Region longitudes span {} to {}, which fits neither -180..180 nor 0..360; \
                 treating them as -180..180",
                bounds.min_lon,
                bounds.max_lon
            );
        }
    }

    let regions_convention = regions.lon_convention();
    let lon = match resolve_target(options.wrap_lon, regions_convention) {
        Some(target) => {
            tracing::debug!(
                "Wrapping grid longitudes from {:?} to {:?}",
                grid_convention(grid.lon()),
                target
            );
            wrap_grid(grid.lon(), target)
        }
        None => grid.lon().clone(),
    };

    Ok((ordered, lon))
}

/// Bounding-box prune, then exact containment for the remaining cells
fn region_hits(region: &Region, lon: &Array2<f64>, lat: &Array2<f64>) -> Array2<bool> {
    let bounds = region.bounds();
    let geometry = region.polygon();
    let mut hits = Array2::from_elem(lon.dim(), false);
    let mut candidates = 0usize;

    Zip::from(&mut hits).and(lon).and(lat).for_each(|hit, &x, &y| {
        if bounds.contains(x, y) {
            candidates += 1;
            *hit = geometry.contains_point(x, y);
        }
    });

    tracing::trace!(
        "Region {} ({}): {} candidate cells, {} contained",
        region.number(),
        region.abbrev(),
        candidates,
        hits.iter().filter(|&&hit| hit).count()
    );

    hits
}
