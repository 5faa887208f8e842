use crate::models::geometry::{Bounds, Outline, RegionGeometry};
use geo::algorithm::area::Area;
use geo::algorithm::centroid::Centroid;
use geo::{LineString, Polygon};
use std::fmt;
use std::sync::OnceLock;

/// A single named, numbered region.
///
/// Exactly one of polygon and coords is authoritative after construction;
/// the other one, and the bounds, are derived on first access and cached.
#[derive(Debug)]
pub struct Region {
    number: u32,
    name: String,
    abbrev: String,
    is_polygon: bool,
    polygon: OnceLock<RegionGeometry>,
    coords: OnceLock<Vec<[f64; 2]>>,
    bounds: OnceLock<Bounds>,
    centroid: [f64; 2],
}

impl Region {
    /// Create a region.
    ///
    /// When `centroid` is `None` it is computed from the polygon; for a
    /// multipolygon the centroid of the largest-area part is used.
    pub fn new(
        number: u32,
        name: impl Into<String>,
        abbrev: impl Into<String>,
        outline: Outline,
        centroid: Option<[f64; 2]>,
    ) -> Self {
        let is_polygon = outline.is_polygon();

        let (polygon, coords) = match outline {
            Outline::RawRing(ring) => (OnceLock::new(), OnceLock::from(ring)),
            Outline::Polygon(polygon) => {
                (OnceLock::from(RegionGeometry::Polygon(polygon)), OnceLock::new())
            }
            Outline::MultiPolygon(polygons) => {
                (OnceLock::from(RegionGeometry::MultiPolygon(polygons)), OnceLock::new())
            }
        };

        let mut region = Self {
            number,
            name: name.into(),
            abbrev: abbrev.into(),
            is_polygon,
            polygon,
            coords,
            bounds: OnceLock::new(),
            centroid: [f64::NAN, f64::NAN],
        };

        region.centroid = match centroid {
            Some(centroid) => centroid,
            None => compute_centroid(region.polygon()),
        };

        region
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbrev(&self) -> &str {
        &self.abbrev
    }

    /// Whether the region was constructed from a (multi)polygon
    pub fn is_polygon(&self) -> bool {
        self.is_polygon
    }

    /// Label position of the region as (lon, lat)
    pub fn centroid(&self) -> [f64; 2] {
        self.centroid
    }

    /// Polygon or multipolygon of the region
    pub fn polygon(&self) -> &RegionGeometry {
        self.polygon.get_or_init(|| {
            let ring = self.coords.get().cloned().unwrap_or_default();
            RegionGeometry::Polygon(Polygon::new(LineString::from(ring), vec![]))
        })
    }

    /// Vertices of the region outline.
    ///
    /// Exterior rings of a multipolygon are concatenated with a `[NaN, NaN]`
    /// row between consecutive parts.
    pub fn coords(&self) -> &[[f64; 2]] {
        self.coords.get_or_init(|| {
            let mut coords = Vec::new();
            for polygon in self.polygon().parts() {
                coords.extend(polygon.exterior().coords().map(|c| [c.x, c.y]));
                coords.push([f64::NAN, f64::NAN]);
            }
            coords.pop();
            coords
        })
    }

    /// Bounds of the region (min_lon, min_lat, max_lon, max_lat)
    pub fn bounds(&self) -> Bounds {
        *self.bounds.get_or_init(|| self.polygon().bounds())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region: {} ({} / {})\ncenter: [{}, {}]",
            self.name, self.abbrev, self.number, self.centroid[0], self.centroid[1]
        )
    }
}

// The part centroid is much more stable than the combined centroid for
// disjoint or self-intersecting multipolygons.
fn compute_centroid(geometry: &RegionGeometry) -> [f64; 2] {
    let centroid = match geometry {
        RegionGeometry::Polygon(polygon) => polygon.centroid(),
        RegionGeometry::MultiPolygon(polygons) => {
            let mut largest = 0.0;
            let mut centroid = None;
            for polygon in polygons.iter() {
                let area = polygon.unsigned_area();
                if area > largest {
                    largest = area;
                    centroid = polygon.centroid();
                }
            }
            centroid.or_else(|| polygons.centroid())
        }
    };

    centroid.map(|p| [p.x(), p.y()]).unwrap_or([f64::NAN, f64::NAN])
}
