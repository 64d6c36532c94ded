//! Nearest-hub proximity.

use fragility_map_models::MarketHub;
use geo::Point;

/// Planar distance from `centroid` to the nearest hub, or `None` when no
/// hubs exist. Ties between equidistant hubs are allowed to resolve
/// arbitrarily; only the distance is retained.
#[must_use]
pub fn nearest_hub_distance(centroid: Point<f64>, hubs: &[MarketHub]) -> Option<f64> {
    hubs.iter()
        .map(|hub| fragility_map_geometry::distance(centroid, hub.centroid))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(category: &str, x: f64, y: f64) -> MarketHub {
        MarketHub {
            category: category.to_string(),
            centroid: Point::new(x, y),
        }
    }

    #[test]
    fn picks_the_minimum_distance() {
        let hubs = vec![hub("Produce", 10.0, 0.0), hub("Fish", 0.0, 2.0)];
        let d = nearest_hub_distance(Point::new(0.0, 0.0), &hubs).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn equidistant_hubs_yield_the_shared_distance() {
        let hubs = vec![hub("A", 3.0, 0.0), hub("B", -3.0, 0.0)];
        let d = nearest_hub_distance(Point::new(0.0, 0.0), &hubs).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_hubs_yields_none() {
        assert!(nearest_hub_distance(Point::new(1.0, 1.0), &[]).is_none());
    }
}
