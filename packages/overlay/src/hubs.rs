//! Market hub aggregation.
//!
//! Reduces the raw wholesale-market point locations to one representative
//! centroid per market category. Grouping uses a `BTreeMap` so hub order
//! is deterministic across runs regardless of input order.

use std::collections::BTreeMap;

use fragility_map_models::{MarketHub, MarketPoint};
use geo::Point;

/// Groups market points by category and reduces each group to its planar
/// centroid (independent arithmetic means of x and y, not area-weighted).
///
/// Groups are built only from present points, so no category ever emits
/// a degenerate hub.
#[must_use]
pub fn aggregate(points: &[MarketPoint]) -> Vec<MarketHub> {
    let mut groups: BTreeMap<&str, Vec<Point<f64>>> = BTreeMap::new();
    for point in points {
        groups
            .entry(point.category.as_str())
            .or_default()
            .push(point.location);
    }

    groups
        .into_iter()
        .map(|(category, locations)| {
            #[allow(clippy::cast_precision_loss)]
            let count = locations.len() as f64;
            let x = locations.iter().map(|p| p.x()).sum::<f64>() / count;
            let y = locations.iter().map(|p| p.y()).sum::<f64>() / count;
            MarketHub {
                category: category.to_string(),
                centroid: Point::new(x, y),
            }
        })
        .collect()
}
