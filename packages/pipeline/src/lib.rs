#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Logistics fragility scoring pipeline.
//!
//! Loads four `GeoJSON` feature collections (census tracts, flood zones,
//! truck routes, wholesale markets), overlays them per tract, normalizes
//! the three raw signals against population maxima, composes the
//! weighted fragility index, and writes one scored feature collection.
//!
//! Scoring runs as two sequential, side-effect-free stages: a per-tract
//! raw pass (pure function per tract) and a normalization pass over the
//! full collection. The stages communicate through an explicit
//! intermediate collection, never through shared running state, so the
//! population maxima are only ever computed after every raw score
//! exists.
//!
//! Any fatal condition (missing input file, malformed top-level
//! structure) aborts before the output file is touched; the output is
//! materialized in memory and written in a single shot.

pub mod config;
pub mod emit;
pub mod load;
pub mod progress;

use std::fs;
use std::path::{Path, PathBuf};

use fragility_map_models::{
    DroppedFeatures, OverlaySkips, RawScore, RunSummary, ScoreDistribution, TractScore,
};
use fragility_map_overlay::index::{FloodIndex, RouteIndex};
use geojson::{FeatureCollection, GeoJson};
use thiserror::Error;

pub use config::Config;
use progress::ProgressCallback;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An input file is not valid `GeoJSON`.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying `GeoJSON` error.
        source: geojson::Error,
    },

    /// An input file parsed but is not a feature collection.
    #[error("{path} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection {
        /// Path to the input file.
        path: PathBuf,
    },

    /// The scored output could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path to the output file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Everything a completed scoring pass produces.
pub struct PipelineOutput {
    /// The scored feature collection, in input tract order.
    pub collection: FeatureCollection,
    /// Per-tract terminal score records.
    pub scores: Vec<TractScore>,
    /// Run diagnostics.
    pub summary: RunSummary,
}

/// Runs the full pipeline: read inputs, score, write output.
///
/// # Errors
///
/// Returns an error if any input file is missing or malformed, or if the
/// output cannot be written. Nothing is written on a fatal error.
pub fn run(
    config: &Config,
    progress: &dyn ProgressCallback,
) -> Result<RunSummary, PipelineError> {
    let tracts = read_collection(&config.inputs.tracts)?;
    let flood_zones = read_collection(&config.inputs.flood_zones)?;
    let truck_routes = read_collection(&config.inputs.truck_routes)?;
    let markets = read_collection(&config.inputs.markets)?;

    let output = score_collections(
        &tracts,
        &flood_zones,
        &truck_routes,
        &markets,
        config,
        progress,
    );

    let text = GeoJson::from(output.collection).to_string();
    fs::write(&config.output, text).map_err(|source| PipelineError::Write {
        path: config.output.clone(),
        source,
    })?;
    log::info!(
        "Wrote {} scored tracts to {}",
        output.summary.tracts_scored,
        config.output.display()
    );

    Ok(output.summary)
}

/// Scores already-parsed feature collections.
///
/// Split from [`run`] so tests and embedders can drive the pipeline with
/// in-memory collections.
#[must_use]
pub fn score_collections(
    tracts: &FeatureCollection,
    flood_zones: &FeatureCollection,
    truck_routes: &FeatureCollection,
    markets: &FeatureCollection,
    config: &Config,
    progress: &dyn ProgressCallback,
) -> PipelineOutput {
    let (tracts, dropped_tracts) = load::tracts(tracts);
    log::info!("Loaded {} census tracts", tracts.len());

    let (zones, dropped_zones) = load::flood_zones(flood_zones);
    log::info!("Loaded {} flood zones", zones.len());

    let (routes, dropped_routes) = load::truck_routes(truck_routes, config);
    log::info!("Loaded {} truck routes", routes.len());

    let (points, dropped_markets) = load::market_points(markets);
    let hubs = fragility_map_overlay::hubs::aggregate(&points);
    log::info!(
        "Created {} market hub centroids from {} points",
        hubs.len(),
        points.len()
    );

    let floods = FloodIndex::build(zones);
    let route_index = RouteIndex::build(routes);

    // Stage one: raw signals per tract, pure against read-only inputs.
    progress.set_total(tracts.len() as u64);
    let raw_scores: Vec<RawScore> = tracts
        .iter()
        .map(|tract| {
            let (raw, skips) =
                fragility_map_overlay::score_tract(tract, &floods, &route_index, &hubs);
            progress.inc(1);
            RawScore {
                geoid: tract.geoid.clone(),
                raw,
                skips,
            }
        })
        .collect();
    progress.finish(format!("Scored {} tracts", raw_scores.len()));

    let over_exposed = raw_scores
        .iter()
        .filter(|s| s.raw.flood_exposure > 1.0)
        .count();
    if over_exposed > 0 {
        // Overlapping flood polygons double-count shared ground, pushing
        // the exposure ratio past 1.0. Preserved behavior, made visible.
        log::warn!("{over_exposed} tracts have flood exposure above 1.0");
    }

    // Stage two: normalize against whole-population maxima and compose.
    let maxima = fragility_map_score::maxima(raw_scores.iter().map(|s| &s.raw));
    log::info!(
        "Max values - Flood: {:.4}, Truck: {:.4}, Hub: {:.4}",
        maxima.flood_exposure,
        maxima.truck_dependency,
        maxima.hub_proximity
    );

    let mut skips = OverlaySkips::default();
    let scores: Vec<TractScore> = raw_scores
        .into_iter()
        .map(|raw_score| {
            skips.absorb(raw_score.skips);
            let normalized = fragility_map_score::normalize(&raw_score.raw, &maxima);
            let logistics_fragility =
                fragility_map_score::compose(&normalized, &config.composite_weights);
            TractScore {
                geoid: raw_score.geoid,
                raw: raw_score.raw,
                normalized,
                logistics_fragility,
            }
        })
        .collect();

    if skips.any() {
        log::warn!(
            "Skipped {} flood and {} route contributions on geometry faults",
            skips.flood,
            skips.routes
        );
    }

    let distribution = distribution(&scores);
    if let Some(d) = &distribution {
        log::info!(
            "Fragility distribution - min: {:.4}, max: {:.4}, mean: {:.4}, median: {:.4}",
            d.min,
            d.max,
            d.mean,
            d.median
        );
    }

    let collection = emit::feature_collection(&tracts, &scores);
    let summary = RunSummary {
        tracts_scored: scores.len() as u64,
        hubs_built: hubs.len() as u64,
        dropped: DroppedFeatures {
            tracts: dropped_tracts,
            flood_zones: dropped_zones,
            truck_routes: dropped_routes,
            markets: dropped_markets,
        },
        skips,
        maxima,
        distribution,
    };

    PipelineOutput {
        collection,
        scores,
        summary,
    }
}

/// Reads and parses one input feature collection.
///
/// # Errors
///
/// Fatal on a missing file, invalid `GeoJSON`, or a top-level structure
/// that is not a feature collection.
pub fn read_collection(path: &Path) -> Result<FeatureCollection, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = text.parse().map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    FeatureCollection::try_from(geojson).map_err(|_| PipelineError::NotFeatureCollection {
        path: path.to_path_buf(),
    })
}

/// Distribution of the composite index; `None` for an empty run.
fn distribution(scores: &[TractScore]) -> Option<ScoreDistribution> {
    if scores.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = scores.iter().map(|s| s.logistics_fragility).collect();
    values.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        f64::midpoint(values[mid - 1], values[mid])
    } else {
        values[mid]
    };

    Some(ScoreDistribution {
        min: values[0],
        max: values[values.len() - 1],
        mean,
        median,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Feature;
    use super::progress::NullProgress;
    use serde_json::{Value, json};

    fn feature(geometry: geojson::Value, properties: Value) -> Feature {
        let Value::Object(properties) = properties else {
            panic!("properties must be an object");
        };
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geometry)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> geojson::Value {
        geojson::Value::Polygon(vec![vec![
            vec![x0, y0],
            vec![x1, y0],
            vec![x1, y1],
            vec![x0, y1],
            vec![x0, y0],
        ]])
    }

    fn empty_collection() -> FeatureCollection {
        collection(vec![])
    }

    fn metric(fc: &FeatureCollection, idx: usize, key: &str) -> f64 {
        fc.features[idx]
            .properties
            .as_ref()
            .unwrap()
            .get(key)
            .and_then(Value::as_f64)
            .unwrap()
    }

    /// Two-tract scenario pinning every stage:
    ///
    /// Tract A (2x2 at origin): flood covers half its area, one
    /// through-route contributes 1.0 units of length, nearest hub sits
    /// 2.0 units from its centroid. Tract B (2x2 at x=10): fully
    /// flooded, no routes, nearest hub 4.0 units away. B sets the flood
    /// and hub maxima, A the truck maximum.
    fn scenario() -> (FeatureCollection, FeatureCollection, FeatureCollection, FeatureCollection)
    {
        let tracts = collection(vec![
            feature(square(0.0, 0.0, 2.0, 2.0), json!({"geoid": "A"})),
            feature(square(10.0, 0.0, 12.0, 2.0), json!({"geoid": "B"})),
        ]);
        let floods = collection(vec![
            feature(square(0.0, 0.0, 2.0, 1.0), json!({})),
            feature(square(10.0, 0.0, 12.0, 2.0), json!({})),
        ]);
        let routes = collection(vec![feature(
            geojson::Value::LineString(vec![vec![1.0, 0.5], vec![1.0, 1.5]]),
            json!({"routetype": "Through"}),
        )]);
        let markets = collection(vec![
            feature(geojson::Value::Point(vec![1.0, 3.0]), json!({"MARKET": "Produce"})),
            feature(geojson::Value::Point(vec![11.0, 5.0]), json!({"MARKET": "Fish"})),
        ]);
        (tracts, floods, routes, markets)
    }

    #[test]
    fn end_to_end_scenario_scores_match() {
        let (tracts, floods, routes, markets) = scenario();
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );

        assert_eq!(output.summary.tracts_scored, 2);
        assert_eq!(output.summary.hubs_built, 2);
        assert!(!output.summary.skips.any());

        let fc = &output.collection;
        assert!((metric(fc, 0, "flood_exposure") - 0.5).abs() < 1e-9);
        assert!((metric(fc, 0, "flood_exposure_norm") - 0.5).abs() < 1e-9);
        assert!((metric(fc, 0, "truck_dependency") - 1.0).abs() < 1e-9);
        assert!((metric(fc, 0, "truck_dependency_norm") - 1.0).abs() < 1e-9);
        assert!((metric(fc, 0, "hub_proximity") - 2.0).abs() < 1e-9);
        assert!((metric(fc, 0, "hub_proximity_norm") - 0.5).abs() < 1e-9);
        // 0.4*1.0 + 0.4*0.5 + 0.2*0.5
        assert!((metric(fc, 0, "logistics_fragility") - 0.7).abs() < 1e-9);

        assert!((metric(fc, 1, "flood_exposure_norm") - 1.0).abs() < 1e-9);
        assert!((metric(fc, 1, "truck_dependency_norm") - 0.0).abs() < 1e-9);
        assert!((metric(fc, 1, "hub_proximity_norm") - 0.0).abs() < 1e-9);
        assert!((metric(fc, 1, "logistics_fragility") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn rerun_is_bit_identical() {
        let (tracts, floods, routes, markets) = scenario();
        let config = Config::default();
        let first = score_collections(&tracts, &floods, &routes, &markets, &config, &NullProgress);
        let second =
            score_collections(&tracts, &floods, &routes, &markets, &config, &NullProgress);
        assert_eq!(
            GeoJson::from(first.collection).to_string(),
            GeoJson::from(second.collection).to_string()
        );
    }

    #[test]
    fn zero_flood_overlap_normalizes_to_zero_everywhere() {
        let (tracts, _, routes, markets) = scenario();
        let floods = collection(vec![feature(square(100.0, 100.0, 101.0, 101.0), json!({}))]);
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );
        for score in &output.scores {
            assert!(score.normalized.flood_exposure.abs() < 1e-12);
        }
    }

    #[test]
    fn normalized_fields_stay_in_unit_interval() {
        let (tracts, floods, routes, markets) = scenario();
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );
        for score in &output.scores {
            for value in [
                score.normalized.flood_exposure,
                score.normalized.truck_dependency,
                score.normalized.hub_proximity,
                score.logistics_fragility,
            ] {
                assert!((0.0..=1.0).contains(&value), "out of bounds: {value}");
            }
        }
    }

    #[test]
    fn output_preserves_input_tract_order() {
        let (tracts, floods, routes, markets) = scenario();
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );
        let geoids: Vec<_> = output.scores.iter().map(|s| s.geoid.as_str()).collect();
        assert_eq!(geoids, vec!["A", "B"]);
    }

    #[test]
    fn empty_inputs_yield_empty_output_without_faulting() {
        let output = score_collections(
            &empty_collection(),
            &empty_collection(),
            &empty_collection(),
            &empty_collection(),
            &Config::default(),
            &NullProgress,
        );
        assert_eq!(output.summary.tracts_scored, 0);
        assert!(output.summary.distribution.is_none());
        assert!(output.collection.features.is_empty());
    }

    #[test]
    fn missing_geometry_features_are_dropped_and_counted() {
        let (mut tracts, floods, routes, markets) = scenario();
        tracts.features.push(Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: Some(geojson::JsonObject::new()),
            foreign_members: None,
        });
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );
        assert_eq!(output.summary.tracts_scored, 2);
        assert_eq!(output.summary.dropped.tracts, 1);
    }

    #[test]
    fn missing_input_file_is_fatal() {
        let err = read_collection(Path::new("does/not/exist.geojson")).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn non_feature_collection_input_is_fatal() {
        // A bare geometry parses as GeoJson but is not a collection.
        let geojson: GeoJson = r#"{"type":"Point","coordinates":[0.0,0.0]}"#.parse().unwrap();
        assert!(FeatureCollection::try_from(geojson).is_err());
    }

    #[test]
    fn distribution_median_averages_even_counts() {
        let (tracts, floods, routes, markets) = scenario();
        let output = score_collections(
            &tracts,
            &floods,
            &routes,
            &markets,
            &Config::default(),
            &NullProgress,
        );
        let d = output.summary.distribution.unwrap();
        assert!((d.min - 0.4).abs() < 1e-9);
        assert!((d.max - 0.7).abs() < 1e-9);
        assert!((d.mean - 0.55).abs() < 1e-9);
        assert!((d.median - 0.55).abs() < 1e-9);
    }
}
