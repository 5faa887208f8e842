//! Integration tests for region collections

use geo::{LineString, MultiPolygon, Polygon};
use proptest::prelude::*;
use regionmask_core::{Bounds, Outline, RegionKey, Regions};
use std::sync::Arc;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    Polygon::new(LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]), vec![])
}

#[test]
fn test_mixed_outline_kinds() {
    let outlines = vec![
        Outline::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
        Outline::from(rect(2.0, 0.0, 3.0, 1.0)),
        Outline::from(MultiPolygon::new(vec![rect(4.0, 0.0, 5.0, 1.0), rect(6.0, 0.0, 9.0, 3.0)])),
    ];
    let regions = Regions::builder(outlines).numbers(vec![10, 20, 30]).build().unwrap();

    assert!(regions.is_polygon());
    assert_eq!(regions.numbers(), vec![10, 20, 30]);
    assert_eq!(regions.polygons()[2].parts().len(), 2);
    assert_eq!(regions.bounds_global(), Some(Bounds::new(0.0, 0.0, 9.0, 3.0)));

    let centroid = regions.get("r30").unwrap().centroid();
    assert!((centroid[0] - 7.5).abs() < 1e-10);
    assert!((centroid[1] - 1.5).abs() < 1e-10);
}

#[test]
fn test_subset_of_subset_keeps_sharing() {
    let outlines: Vec<Polygon<f64>> =
        (0..5).map(|i| rect(i as f64, 0.0, i as f64 + 1.0, 1.0)).collect();
    let regions = Regions::builder(outlines).name("strip").build().unwrap();

    let keys = vec![RegionKey::from("r4"), RegionKey::Number(1), 3u32.into()];
    let subset = regions.subset(keys).unwrap();
    assert_eq!(subset.numbers(), vec![1, 3, 4]);
    assert_eq!(subset.name(), "strip");

    let inner = subset.subset(vec!["Region4"]).unwrap();
    assert!(Arc::ptr_eq(inner.get(4u32).unwrap(), regions.get(4u32).unwrap()));
}

proptest! {
    #[test]
    fn bounds_global_is_componentwise_extent(
        boxes in prop::collection::vec(
            (-180.0f64..170.0, -90.0f64..80.0, 0.1f64..10.0, 0.1f64..10.0),
            1..8,
        )
    ) {
        let outlines: Vec<Polygon<f64>> = boxes
            .iter()
            .map(|&(x, y, w, h)| rect(x, y, x + w, y + h))
            .collect();
        let regions = Regions::new(outlines).unwrap();
        let bounds = regions.bounds();
        let global = regions.bounds_global().unwrap();

        let min_lon = bounds.iter().map(|b| b.min_lon).fold(f64::INFINITY, f64::min);
        let min_lat = bounds.iter().map(|b| b.min_lat).fold(f64::INFINITY, f64::min);
        let max_lon = bounds.iter().map(|b| b.max_lon).fold(f64::NEG_INFINITY, f64::max);
        let max_lat = bounds.iter().map(|b| b.max_lat).fold(f64::NEG_INFINITY, f64::max);

        prop_assert_eq!(global, Bounds::new(min_lon, min_lat, max_lon, max_lat));
        prop_assert!(regions.lon_180() != regions.lon_360());
        prop_assert_eq!(regions.lon_180(), min_lon < 0.0);
    }

    #[test]
    fn subset_is_sorted_and_unique(picks in prop::collection::vec(0u32..6, 1..12)) {
        let outlines: Vec<Polygon<f64>> =
            (0..6).map(|i| rect(i as f64, 0.0, i as f64 + 1.0, 1.0)).collect();
        let regions = Regions::new(outlines).unwrap();

        let labels: Vec<String> = picks.iter().map(|n| format!("r{}", n)).collect();
        let subset = regions.subset(labels).unwrap();

        let mut expected = picks.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(subset.numbers(), expected);
    }
}
