use regionmask_core::error::{RegionmaskError, Result};
use regionmask_core::models::{Region, RegionGeometry, Regions};
use std::collections::HashSet;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }
}

/// Validate the geometry of a single region.
///
/// Every part needs an exterior ring with at least three distinct vertices,
/// holes likewise, and all vertices must be finite.
pub fn validate_region(region: &Region) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let geometry = region.polygon();

    if geometry.parts().is_empty() {
        result.add_error("MultiPolygon".to_string(), "Geometry has no polygons".to_string());
        return result;
    }

    for (i, polygon) in geometry.parts().iter().enumerate() {
        let prefix = match geometry {
            RegionGeometry::Polygon(_) => "Polygon".to_string(),
            RegionGeometry::MultiPolygon(_) => format!("MultiPolygon[{}]", i),
        };

        validate_ring(polygon.exterior(), &format!("{} exterior", prefix), &mut result);
        for (j, interior) in polygon.interiors().iter().enumerate() {
            validate_ring(interior, &format!("{} interior[{}]", prefix, j), &mut result);
        }
    }

    result
}

fn validate_ring(ring: &geo::LineString<f64>, location: &str, result: &mut ValidationResult) {
    for (i, coord) in ring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result
                .add_error(format!("{}[{}]", location, i), "Coordinates must be finite".to_string());
        }
    }

    let distinct: HashSet<(u64, u64)> =
        ring.0.iter().map(|c| (c.x.to_bits(), c.y.to_bits())).collect();
    if distinct.len() < 3 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 3 distinct vertices, found {}", distinct.len()),
        );
    }
}

/// Fail with the first problem found in any region of the collection
pub fn validate_regions(regions: &Regions) -> Result<()> {
    for region in regions {
        let validation = validate_region(region);
        if let Some(error) = validation.errors.first() {
            return Err(RegionmaskError::InvalidGeometry {
                number: region.number(),
                reason: format!("{}: {}", error.location, error.reason),
            });
        }
    }
    Ok(())
}

/// Count regions with invalid geometry
pub fn count_invalid_regions(regions: &Regions) -> usize {
    regions.iter().filter(|r| !validate_region(r).is_valid).count()
}
