//! Result emitter.
//!
//! Reassembles each tract's original geometry and properties with the
//! seven computed metrics. Output order matches input order exactly; no
//! re-sorting. Metrics are rounded to four decimal places for output
//! stability and smaller files.

use fragility_map_models::{Tract, TractScore};
use geojson::{Feature, FeatureCollection};
use serde_json::json;

/// Decimal places kept on every emitted metric.
const OUTPUT_PRECISION: u32 = 4;

/// Rounds to [`OUTPUT_PRECISION`] decimal places, half away from zero.
#[must_use]
pub fn round_metric(value: f64) -> f64 {
    let scale = f64::from(10_u32.pow(OUTPUT_PRECISION));
    (value * scale).round() / scale
}

/// Builds the output feature collection from the scored tracts.
///
/// `tracts` and `scores` are parallel slices in input order; geometry is
/// the input geometry untouched, properties are the originals plus the
/// computed metrics.
#[must_use]
pub fn feature_collection(tracts: &[Tract], scores: &[TractScore]) -> FeatureCollection {
    let features = tracts
        .iter()
        .zip(scores)
        .map(|(tract, score)| scored_feature(tract, score))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn scored_feature(tract: &Tract, score: &TractScore) -> Feature {
    let mut properties = tract.properties.clone();
    for (key, value) in [
        ("flood_exposure", score.raw.flood_exposure),
        ("truck_dependency", score.raw.truck_dependency),
        ("hub_proximity", score.raw.hub_proximity),
        ("flood_exposure_norm", score.normalized.flood_exposure),
        ("truck_dependency_norm", score.normalized.truck_dependency),
        ("hub_proximity_norm", score.normalized.hub_proximity),
        ("logistics_fragility", score.logistics_fragility),
    ] {
        properties.insert(key.to_string(), json!(round_metric(value)));
    }

    Feature {
        bbox: None,
        geometry: Some(tract.raw_geometry.clone()),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
