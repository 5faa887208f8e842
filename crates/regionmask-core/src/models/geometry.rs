//! Geometry types shared by the region models and the mask engine.
//!
//! `Outline` is what callers hand in, `RegionGeometry` is what a region
//! exposes after construction. Both wrap `geo` crate types so containment,
//! envelopes and centroids come from the geometry provider.

use crate::error::{RegionmaskError, Result};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Outline of a single region as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Ordered (lon, lat) vertices of one ring, closing point optional
    RawRing(Vec<[f64; 2]>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Outline {
    /// Build a raw ring from an Nx2 vertex table.
    ///
    /// Fails with [`RegionmaskError::Shape`] unless the table has at least one
    /// row and every row has exactly two columns, and with
    /// [`RegionmaskError::NonFiniteCoordinate`] for NaN or infinite vertices.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(RegionmaskError::Shape {
                reason: "Outline must be 2D, found no vertices".to_string(),
            });
        }

        let mut ring = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match row.as_slice() {
                [lon, lat] if lon.is_finite() && lat.is_finite() => ring.push([*lon, *lat]),
                [_, _] => {
                    return Err(RegionmaskError::NonFiniteCoordinate {
                        what: format!("outline vertex {}", i),
                    })
                }
                _ => {
                    return Err(RegionmaskError::Shape {
                        reason: format!(
                            "Outline must have Nx2 elements, vertex {} has {} columns",
                            i,
                            row.len()
                        ),
                    })
                }
            }
        }

        Ok(Outline::RawRing(ring))
    }

    /// Whether every vertex, holes included, is finite
    pub fn is_finite(&self) -> bool {
        let finite = |x: f64, y: f64| x.is_finite() && y.is_finite();
        match self {
            Outline::RawRing(ring) => ring.iter().all(|[x, y]| finite(*x, *y)),
            Outline::Polygon(polygon) => polygon_is_finite(polygon),
            Outline::MultiPolygon(polygons) => polygons.iter().all(polygon_is_finite),
        }
    }

    /// Whether the outline was given as a (multi)polygon rather than a raw ring
    pub fn is_polygon(&self) -> bool {
        !matches!(self, Outline::RawRing(_))
    }
}

fn polygon_is_finite(polygon: &Polygon<f64>) -> bool {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.coords())
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

impl TryFrom<Vec<Vec<f64>>> for Outline {
    type Error = RegionmaskError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Outline::from_rows(rows)
    }
}

impl From<Vec<[f64; 2]>> for Outline {
    fn from(ring: Vec<[f64; 2]>) -> Self {
        Outline::RawRing(ring)
    }
}

impl From<Vec<(f64, f64)>> for Outline {
    fn from(ring: Vec<(f64, f64)>) -> Self {
        Outline::RawRing(ring.into_iter().map(|(lon, lat)| [lon, lat]).collect())
    }
}

impl From<&[(f64, f64)]> for Outline {
    fn from(ring: &[(f64, f64)]) -> Self {
        Outline::RawRing(ring.iter().map(|&(lon, lat)| [lon, lat]).collect())
    }
}

impl From<Polygon<f64>> for Outline {
    fn from(polygon: Polygon<f64>) -> Self {
        Outline::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for Outline {
    fn from(polygons: MultiPolygon<f64>) -> Self {
        Outline::MultiPolygon(polygons)
    }
}

/// Polygon geometry of a constructed region
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl RegionGeometry {
    /// The sub-polygons; a single polygon is a one-element slice
    pub fn parts(&self) -> &[Polygon<f64>] {
        match self {
            RegionGeometry::Polygon(polygon) => std::slice::from_ref(polygon),
            RegionGeometry::MultiPolygon(polygons) => &polygons.0,
        }
    }

    /// Envelope of the geometry, [`Bounds::EMPTY`] for empty geometries
    pub fn bounds(&self) -> Bounds {
        let rect = match self {
            RegionGeometry::Polygon(polygon) => polygon.bounding_rect(),
            RegionGeometry::MultiPolygon(polygons) => polygons.bounding_rect(),
        };
        rect.map(Bounds::from).unwrap_or(Bounds::EMPTY)
    }

    /// Point-in-polygon test.
    ///
    /// A point counts as contained when it lies inside the exterior of any
    /// part and outside all of that part's holes. Points on a boundary are
    /// not contained.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        let point = Point::new(lon, lat);
        self.parts().iter().any(|polygon| polygon.contains(&point))
    }
}

/// Axis-aligned bounds (min_lon, min_lat, max_lon, max_lat)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Bounds of an empty geometry; contains no point
    pub const EMPTY: Bounds =
        Bounds { min_lon: f64::NAN, min_lat: f64::NAN, max_lon: f64::NAN, max_lat: f64::NAN };

    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    pub fn is_empty(&self) -> bool {
        self.to_array().iter().any(|v| v.is_nan())
    }

    /// Closed-interval test on both axes
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }

    /// Componentwise min/max of two bounds, ignoring empty ones
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Longitude convention of a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LonConvention {
    /// Signed longitudes, -180..180
    Lon180,
    /// Unsigned longitudes, 0..360
    Lon360,
}

impl LonConvention {
    /// Decide the convention from a longitude extent.
    ///
    /// Any negative longitude means signed data; everything else is treated
    /// as unsigned. NaN extents (no data) count as unsigned.
    pub fn detect(lon_min: f64, lon_max: f64) -> Self {
        if lon_min < 0.0 {
            LonConvention::Lon180
        } else {
            LonConvention::Lon360
        }
    }

    /// An extent that fits neither convention; [`LonConvention::detect`]
    /// classifies it as signed
    pub fn is_mixed(lon_min: f64, lon_max: f64) -> bool {
        lon_min < 0.0 && lon_max > 180.0
    }

    /// Closed interval of valid longitudes
    pub fn range(&self) -> (f64, f64) {
        match self {
            LonConvention::Lon180 => (-180.0, 180.0),
            LonConvention::Lon360 => (0.0, 360.0),
        }
    }
}

/// How the mask engine reconciles grid longitudes with region longitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WrapLon {
    /// Wrap grid longitudes to the convention of the regions
    #[default]
    Auto,
    /// Use grid longitudes as given
    Disabled,
    /// Always wrap grid longitudes to -180..180
    To180,
    /// Always wrap grid longitudes to 0..360
    To360,
}

/// Geometry validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidityMode {
    /// Strict validation - reject regions with invalid outlines
    Strict,
    /// Lenient validation - degenerate regions simply contain nothing
    #[default]
    Lenient,
}
