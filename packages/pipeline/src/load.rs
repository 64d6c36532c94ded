//! Feature collection loaders.
//!
//! Adapts raw `GeoJSON` features into the typed collections the overlay
//! engine consumes. Features without usable geometry are dropped here
//! with a warning and a count, before any scoring begins; the overlay
//! engine never sees them.

use fragility_map_models::{FloodZone, MarketPoint, Tract, TruckRoute};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::Value;

use crate::config::Config;

/// Market category assigned when a point has no `MARKET` property.
const DEFAULT_MARKET_CATEGORY: &str = "Other";

/// Route type whose routes receive the through-route weight.
const THROUGH_ROUTE_TYPE: &str = "Through";

/// Adapts tract features, deriving area and centroid once per tract.
///
/// Returns the tracts in input order plus the number of features dropped
/// for missing or unusable geometry.
#[must_use]
pub fn tracts(collection: &FeatureCollection) -> (Vec<Tract>, u64) {
    let mut tracts = Vec::with_capacity(collection.features.len());
    let mut dropped = 0;

    for feature in &collection.features {
        let geometry = match fragility_map_geometry::to_multi_polygon(feature.geometry.as_ref()) {
            Ok(geometry) => geometry,
            Err(error) => {
                log::warn!("Dropping tract feature: {error}");
                dropped += 1;
                continue;
            }
        };
        let properties = feature.properties.clone().unwrap_or_default();
        tracts.push(Tract {
            geoid: geoid(&properties),
            area: fragility_map_geometry::area(&geometry),
            centroid: fragility_map_geometry::centroid(&geometry),
            // Parse cannot fail here: to_multi_polygon already proved the
            // geometry present and well formed.
            raw_geometry: feature
                .geometry
                .clone()
                .unwrap_or_else(|| geojson::Geometry::new(geojson::Value::from(&geometry))),
            geometry,
            properties,
        });
    }

    (tracts, dropped)
}

/// Adapts flood zone features.
#[must_use]
pub fn flood_zones(collection: &FeatureCollection) -> (Vec<FloodZone>, u64) {
    let mut zones = Vec::with_capacity(collection.features.len());
    let mut dropped = 0;

    for feature in &collection.features {
        match fragility_map_geometry::to_multi_polygon(feature.geometry.as_ref()) {
            Ok(geometry) => zones.push(FloodZone { geometry }),
            Err(error) => {
                log::warn!("Dropping flood zone feature: {error}");
                dropped += 1;
            }
        }
    }

    (zones, dropped)
}

/// Adapts truck route features, classifying each route's weight once
/// from its `routetype` property.
#[must_use]
pub fn truck_routes(collection: &FeatureCollection, config: &Config) -> (Vec<TruckRoute>, u64) {
    let mut routes = Vec::with_capacity(collection.features.len());
    let mut dropped = 0;

    for feature in &collection.features {
        match fragility_map_geometry::to_multi_line_string(feature.geometry.as_ref()) {
            Ok(geometry) => routes.push(TruckRoute {
                geometry,
                weight: route_weight(feature, config),
            }),
            Err(error) => {
                log::warn!("Dropping truck route feature: {error}");
                dropped += 1;
            }
        }
    }

    (routes, dropped)
}

/// Adapts market point features, tagging each with its category.
#[must_use]
pub fn market_points(collection: &FeatureCollection) -> (Vec<MarketPoint>, u64) {
    let mut points = Vec::with_capacity(collection.features.len());
    let mut dropped = 0;

    for feature in &collection.features {
        match fragility_map_geometry::to_point(feature.geometry.as_ref()) {
            Ok(location) => points.push(MarketPoint {
                category: market_category(feature),
                location,
            }),
            Err(error) => {
                log::warn!("Dropping market feature: {error}");
                dropped += 1;
            }
        }
    }

    (points, dropped)
}

/// GEOID from a tract's properties. Numeric GEOIDs are stringified;
/// a missing property yields an empty string, matching the reference
/// output.
fn geoid(properties: &JsonObject) -> String {
    match properties.get("geoid") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn route_weight(feature: &Feature, config: &Config) -> f64 {
    let route_type = feature
        .properties
        .as_ref()
        .and_then(|p| p.get("routetype"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if route_type == THROUGH_ROUTE_TYPE {
        config.truck_weight_through
    } else {
        config.truck_weight_other
    }
}

fn market_category(feature: &Feature) -> String {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get("MARKET"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MARKET_CATEGORY)
        .to_string()
}
