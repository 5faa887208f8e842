use crate::error::{RegionmaskError, Result};
use crate::models::geometry::{Bounds, LonConvention, Outline, RegionGeometry};
use crate::models::keys::{
    check_unique_numbers, sanitize_labels, RegionInput, RegionKey, Selection, Selector,
};
use crate::models::region::Region;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An ordered collection of uniquely numbered regions.
///
/// Regions are shared through `Arc`, so subsets returned by
/// [`Regions::subset`] point at the same `Region` values as their parent.
#[derive(Debug, Clone)]
pub struct Regions {
    regions: Vec<Arc<Region>>,
    region_ids: HashMap<RegionKey, u32>,
    positions: HashMap<u32, usize>,
    name: String,
    source: Option<String>,
}

impl Regions {
    /// Build a collection from positional outlines with default numbers,
    /// names and abbreviations
    pub fn new<O: Into<Outline>>(outlines: Vec<O>) -> Result<Self> {
        Self::builder(outlines).build()
    }

    /// Start building a collection from positional outlines
    pub fn builder<O: Into<Outline>>(outlines: Vec<O>) -> RegionsBuilder {
        RegionsBuilder::new(RegionInput::Positional(
            outlines.into_iter().map(Into::into).collect(),
        ))
    }

    /// Start building a collection from outlines keyed by region number
    pub fn builder_by_number<O: Into<Outline>>(
        outlines: impl IntoIterator<Item = (u32, O)>,
    ) -> RegionsBuilder {
        RegionsBuilder::new(outlines.into_iter().map(|(n, o)| (n, o.into())).collect())
    }

    /// Assemble a collection from already constructed regions
    pub fn from_regions(
        regions: Vec<Arc<Region>>,
        name: impl Into<String>,
        source: Option<String>,
    ) -> Result<Self> {
        let region_ids = index_identifiers(&regions)?;
        let positions = regions.iter().enumerate().map(|(i, r)| (r.number(), i)).collect();

        Ok(Self { regions, region_ids, positions, name: name.into(), source })
    }

    /// Name of the collection
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source of the region definitions
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over the regions in the order of [`Regions::numbers`]
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Region>> {
        self.regions.iter()
    }

    /// Mapping of every number, name and abbreviation to its region number
    pub fn region_ids(&self) -> &HashMap<RegionKey, u32> {
        &self.region_ids
    }

    pub fn numbers(&self) -> Vec<u32> {
        self.regions.iter().map(|r| r.number()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name()).collect()
    }

    pub fn abbrevs(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.abbrev()).collect()
    }

    pub fn coords(&self) -> Vec<&[[f64; 2]]> {
        self.regions.iter().map(|r| r.coords()).collect()
    }

    pub fn polygons(&self) -> Vec<&RegionGeometry> {
        self.regions.iter().map(|r| r.polygon()).collect()
    }

    pub fn centroids(&self) -> Vec<[f64; 2]> {
        self.regions.iter().map(|r| r.centroid()).collect()
    }

    pub fn bounds(&self) -> Vec<Bounds> {
        self.regions.iter().map(|r| r.bounds()).collect()
    }

    /// Whether at least one region was constructed from a (multi)polygon
    pub fn is_polygon(&self) -> bool {
        self.regions.iter().any(|r| r.is_polygon())
    }

    /// Componentwise min/max over all region bounds, `None` when empty
    pub fn bounds_global(&self) -> Option<Bounds> {
        self.regions.iter().map(|r| r.bounds()).reduce(|acc, b| acc.union(&b))
    }

    /// Longitude convention spanned by [`Regions::bounds_global`]
    pub fn lon_convention(&self) -> LonConvention {
        let bounds = self.bounds_global().unwrap_or(Bounds::EMPTY);
        LonConvention::detect(bounds.min_lon, bounds.max_lon)
    }

    /// If the regions use longitudes from -180 to 180
    pub fn lon_180(&self) -> bool {
        self.lon_convention() == LonConvention::Lon180
    }

    /// If the regions use longitudes from 0 to 360
    pub fn lon_360(&self) -> bool {
        !self.lon_180()
    }

    /// Map a number, name or abbreviation to the region number
    pub fn map_key(&self, key: impl Into<RegionKey>) -> Result<u32> {
        let key = key.into();
        self.region_ids
            .get(&key)
            .copied()
            .ok_or_else(|| RegionmaskError::KeyNotFound { key: key.to_string() })
    }

    /// Map a list of keys to region numbers.
    ///
    /// The result is sorted and free of duplicates; the input order is not kept.
    pub fn map_keys<K: Into<RegionKey>>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Vec<u32>> {
        let mut numbers =
            keys.into_iter().map(|k| self.map_key(k)).collect::<Result<Vec<_>>>()?;
        numbers.sort_unstable();
        numbers.dedup();
        Ok(numbers)
    }

    /// Select a single region or a subset, depending on the selector
    pub fn item(&self, selector: impl Into<Selector>) -> Result<Selection> {
        match selector.into() {
            Selector::One(key) => self.get(key).map(|r| Selection::Region(Arc::clone(r))),
            Selector::Many(keys) => self.subset(keys).map(Selection::Regions),
        }
    }

    /// The region for a number, name or abbreviation
    pub fn get(&self, key: impl Into<RegionKey>) -> Result<&Arc<Region>> {
        let key = key.into();
        let number = self.map_key(key.clone())?;
        self.region(number).ok_or_else(|| RegionmaskError::KeyNotFound { key: key.to_string() })
    }

    /// A new collection with the selected regions in ascending number order.
    ///
    /// The regions are shared with `self`; name and source are copied.
    pub fn subset<K: Into<RegionKey>>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Regions> {
        let numbers = self.map_keys(keys)?;
        let regions = numbers.iter().filter_map(|n| self.region(*n)).cloned().collect();
        Regions::from_regions(regions, self.name.clone(), self.source.clone())
    }

    fn region(&self, number: u32) -> Option<&Arc<Region>> {
        self.positions.get(&number).and_then(|i| self.regions.get(*i))
    }
}

impl<'a> IntoIterator for &'a Regions {
    type Item = &'a Arc<Region>;
    type IntoIter = std::slice::Iter<'a, Arc<Region>>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl fmt::Display for Regions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' Regions", self.len(), self.name)?;
        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " ({})", source)?;
        }
        write!(f, "\n{}", self.abbrevs().join(" "))
    }
}

/// Builder for [`Regions`]
#[derive(Debug, Clone)]
pub struct RegionsBuilder {
    outlines: RegionInput<Outline>,
    numbers: Option<Vec<u32>>,
    names: Option<RegionInput<String>>,
    abbrevs: Option<RegionInput<String>>,
    centroids: Option<RegionInput<[f64; 2]>>,
    name: String,
    source: Option<String>,
}

impl RegionsBuilder {
    pub fn new(outlines: RegionInput<Outline>) -> Self {
        Self {
            outlines,
            numbers: None,
            names: None,
            abbrevs: None,
            centroids: None,
            name: "unnamed".to_string(),
            source: None,
        }
    }

    /// Region numbers; default `0..outlines.len()`
    pub fn numbers(mut self, numbers: impl IntoIterator<Item = u32>) -> Self {
        self.numbers = Some(numbers.into_iter().collect());
        self
    }

    /// Names aligned with the numbers; default `"Region{number}"`
    pub fn names<S: Into<String>>(mut self, names: Vec<S>) -> Self {
        self.names = Some(RegionInput::from(names).map(Into::into));
        self
    }

    pub fn names_by_number<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = (u32, S)>,
    ) -> Self {
        self.names = Some(names.into_iter().map(|(n, s)| (n, s.into())).collect());
        self
    }

    /// Abbreviations aligned with the numbers; default `"r{number}"`
    pub fn abbrevs<S: Into<String>>(mut self, abbrevs: Vec<S>) -> Self {
        self.abbrevs = Some(RegionInput::from(abbrevs).map(Into::into));
        self
    }

    pub fn abbrevs_by_number<S: Into<String>>(
        mut self,
        abbrevs: impl IntoIterator<Item = (u32, S)>,
    ) -> Self {
        self.abbrevs = Some(abbrevs.into_iter().map(|(n, s)| (n, s.into())).collect());
        self
    }

    /// Label positions aligned with the numbers; computed when not given
    pub fn centroids(mut self, centroids: impl Into<RegionInput<[f64; 2]>>) -> Self {
        self.centroids = Some(centroids.into());
        self
    }

    /// Name of the collection; default `"unnamed"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn build(self) -> Result<Regions> {
        let numbers = match self.numbers {
            Some(numbers) => numbers,
            None => (0..self.outlines.len() as u32).collect(),
        };
        check_unique_numbers(&numbers)?;

        let outlines = self.outlines.align(&numbers, "outlines")?;
        if let Some((number, _)) = numbers.iter().zip(&outlines).find(|(_, o)| !o.is_finite()) {
            return Err(RegionmaskError::NonFiniteCoordinate {
                what: format!("outline of region {}", number),
            });
        }
        let names = sanitize_labels(self.names, &numbers, "names", "Region")?;
        let abbrevs = sanitize_labels(self.abbrevs, &numbers, "abbrevs", "r")?;
        let centroids: Vec<Option<[f64; 2]>> = match self.centroids {
            Some(centroids) => {
                centroids.align(&numbers, "centroids")?.into_iter().map(Some).collect()
            }
            None => vec![None; numbers.len()],
        };

        let regions: Vec<Arc<Region>> = numbers
            .iter()
            .zip(outlines)
            .zip(names)
            .zip(abbrevs)
            .zip(centroids)
            .map(|((((number, outline), name), abbrev), centroid)| {
                Arc::new(Region::new(*number, name, abbrev, outline, centroid))
            })
            .collect();

        tracing::debug!("Built {} regions for collection '{}'", regions.len(), self.name);

        Regions::from_regions(regions, self.name, self.source)
    }
}

/// Index numbers, abbreviations and names, rejecting identifiers that
/// would resolve to more than one region
fn index_identifiers(regions: &[Arc<Region>]) -> Result<HashMap<RegionKey, u32>> {
    let mut ids = HashMap::with_capacity(regions.len() * 3);

    for region in regions {
        let number = region.number();
        if ids.insert(RegionKey::Number(number), number).is_some() {
            return Err(RegionmaskError::DuplicateNumber { number });
        }

        for label in [region.abbrev(), region.name()] {
            match ids.entry(RegionKey::from(label)) {
                Entry::Occupied(entry) if *entry.get() != number => {
                    return Err(RegionmaskError::DuplicateIdentifier {
                        key: label.to_string(),
                        first: *entry.get(),
                        second: number,
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(number);
                }
            }
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_squares() -> Vec<Vec<(f64, f64)>> {
        vec![
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            vec![(0.0, 1.0), (0.0, 2.0), (1.0, 2.0), (1.0, 1.0)],
        ]
    }

    fn example() -> Regions {
        Regions::builder(unit_squares())
            .names(vec!["Unit Square1", "Unit Square2"])
            .abbrevs(vec!["uSq1", "uSq2"])
            .name("Example")
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let regions = Regions::new(unit_squares()).unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions.numbers(), vec![0, 1]);
        assert_eq!(regions.names(), vec!["Region0", "Region1"]);
        assert_eq!(regions.abbrevs(), vec!["r0", "r1"]);
        assert_eq!(regions.name(), "unnamed");
        assert_eq!(regions.source(), None);
        assert!(!regions.is_polygon());
    }

    #[test]
    fn test_keyed_inputs() {
        let squares = unit_squares();
        let outlines = vec![(2, squares[1].clone()), (1, squares[0].clone())];
        let regions = Regions::builder_by_number(outlines)
            .numbers(vec![1, 2])
            .names_by_number(vec![(1, "Unit Square1"), (2, "Unit Square2")])
            .abbrevs_by_number(vec![(2, "uSq2"), (1, "uSq1")])
            .build()
            .unwrap();

        assert_eq!(regions.numbers(), vec![1, 2]);
        assert_eq!(regions.get(1u32).unwrap().abbrev(), "uSq1");
        assert_eq!(regions.get("uSq2").unwrap().bounds(), Bounds::new(0.0, 1.0, 1.0, 2.0));
    }

    #[test]
    fn test_size_mismatch() {
        let result = Regions::builder(unit_squares()).names(vec!["only one"]).build();
        assert!(matches!(result, Err(RegionmaskError::SizeMismatch { .. })));

        let result = Regions::builder(unit_squares()).numbers(vec![0, 1, 2]).build();
        assert!(matches!(result, Err(RegionmaskError::SizeMismatch { .. })));
    }

    #[test]
    fn test_key_mismatch() {
        let result = Regions::builder(unit_squares())
            .abbrevs_by_number(vec![(0, "a"), (7, "b")])
            .build();
        assert!(matches!(result, Err(RegionmaskError::KeyMismatch { .. })));
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let result = Regions::builder(unit_squares()).numbers(vec![3, 3]).build();
        assert!(matches!(result, Err(RegionmaskError::DuplicateNumber { number: 3 })));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let result = Regions::builder(unit_squares()).abbrevs(vec!["same", "same"]).build();
        match result {
            Err(RegionmaskError::DuplicateIdentifier { key, first, second }) => {
                assert_eq!(key, "same");
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("Expected DuplicateIdentifier, got {:?}", other),
        }

        // Name of one region equal to the abbreviation of another
        let result = Regions::builder(unit_squares()).names(vec!["r1", "Second"]).build();
        assert!(matches!(result, Err(RegionmaskError::DuplicateIdentifier { .. })));
    }

    #[test]
    fn test_name_equal_to_own_abbrev_is_allowed() {
        let regions = Regions::builder(unit_squares())
            .names(vec!["A", "B"])
            .abbrevs(vec!["A", "B"])
            .build()
            .unwrap();
        assert_eq!(regions.map_key("B").unwrap(), 1);
    }

    #[test]
    fn test_region_ids_consistent() {
        let regions = example();
        let ids = regions.region_ids();

        assert_eq!(ids.len(), 6);
        for region in &regions {
            let number = region.number();
            assert_eq!(ids[&RegionKey::Number(number)], number);
            assert_eq!(ids[&RegionKey::from(region.name())], number);
            assert_eq!(ids[&RegionKey::from(region.abbrev())], number);

            let by_number = regions.get(number).unwrap();
            let by_name = regions.get(region.name()).unwrap();
            let by_abbrev = regions.get(region.abbrev()).unwrap();
            assert!(Arc::ptr_eq(by_number, by_name));
            assert!(Arc::ptr_eq(by_number, by_abbrev));
        }
    }

    #[test]
    fn test_map_key_not_found() {
        let regions = example();
        assert!(matches!(regions.map_key("nope"), Err(RegionmaskError::KeyNotFound { .. })));
        assert!(matches!(regions.map_key(5u32), Err(RegionmaskError::KeyNotFound { .. })));
        assert!(regions.map_keys(vec!["uSq1", "nope"]).is_err());
    }

    #[test]
    fn test_map_keys_sorted_unique() {
        let regions = example();
        let keys = vec![
            RegionKey::from("uSq2"),
            RegionKey::Number(0),
            RegionKey::from("Unit Square2"),
        ];
        assert_eq!(regions.map_keys(keys).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_subset_shares_regions() {
        let regions = Regions::builder(unit_squares()).source("test").build().unwrap();
        let subset = regions.subset(vec!["r1", "r0", "r1"]).unwrap();

        assert_eq!(subset.numbers(), vec![0, 1]);
        assert_eq!(subset.name(), "unnamed");
        assert_eq!(subset.source(), Some("test"));
        assert!(Arc::ptr_eq(subset.get(0u32).unwrap(), regions.get(0u32).unwrap()));

        let single = regions.subset(vec!["r1"]).unwrap();
        assert_eq!(single.numbers(), vec![1]);
        assert!(single.get("r0").is_err());
    }

    #[test]
    fn test_item_dispatch() {
        let regions = example();

        let region = regions.item("uSq2").unwrap().into_region().unwrap();
        assert_eq!(region.number(), 1);

        let subset = regions.item(vec!["uSq2"]).unwrap().into_regions().unwrap();
        assert_eq!(subset.len(), 1);
        assert!(regions.item(vec![0u32, 9]).is_err());
    }

    #[test]
    fn test_iteration_follows_numbers() {
        let regions = Regions::builder(unit_squares()).numbers(vec![5, 2]).build().unwrap();
        let iterated: Vec<u32> = regions.iter().map(|r| r.number()).collect();
        assert_eq!(iterated, regions.numbers());
        assert_eq!(iterated, vec![5, 2]);
    }

    #[test]
    fn test_bounds_global_and_convention() {
        let regions = example();
        assert_eq!(regions.bounds_global(), Some(Bounds::new(0.0, 0.0, 1.0, 2.0)));
        assert!(regions.lon_360());
        assert!(!regions.lon_180());

        let signed = Regions::new(vec![vec![(-10.0, 0.0), (-10.0, 5.0), (5.0, 5.0)]]).unwrap();
        assert!(signed.lon_180());
        assert!(!signed.lon_360());
    }

    #[test]
    fn test_empty_collection() {
        let regions = Regions::new(Vec::<Outline>::new()).unwrap();
        assert!(regions.is_empty());
        assert_eq!(regions.bounds_global(), None);
        assert!(regions.lon_360());
    }

    #[test]
    fn test_centroids_given_by_builder() {
        let regions = Regions::builder(unit_squares())
            .centroids(vec![[0.5, 0.25], [0.5, 1.75]])
            .build()
            .unwrap();
        assert_eq!(regions.centroids(), vec![[0.5, 0.25], [0.5, 1.75]]);
    }

    #[test]
    fn test_display() {
        let regions = example();
        assert_eq!(regions.to_string(), "2 'Example' Regions\nuSq1 uSq2");

        let regions =
            Regions::builder(unit_squares()).name("Example").source("Test").build().unwrap();
        assert_eq!(regions.to_string(), "2 'Example' Regions (Test)\nr0 r1");
    }

    #[test]
    fn test_non_finite_outline_rejected() {
        let mut outlines = unit_squares();
        outlines.push(vec![(0.0, 0.0), (f64::NAN, 1.0), (1.0, 1.0), (1.0, 0.0)]);

        match Regions::builder(outlines).numbers(vec![0, 1, 7]).build() {
            Err(RegionmaskError::NonFiniteCoordinate { what }) => {
                assert_eq!(what, "outline of region 7")
            }
            other => panic!("Expected NonFiniteCoordinate, got {:?}", other),
        }
    }
}
