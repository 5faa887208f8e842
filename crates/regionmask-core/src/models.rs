pub mod geometry;
pub mod keys;
pub mod region;
pub mod regions;

pub use geometry::{Bounds, LonConvention, Outline, RegionGeometry, ValidityMode, WrapLon};
pub use keys::{RegionInput, RegionKey, Selection, Selector};
pub use region::Region;
pub use regions::{Regions, RegionsBuilder};
