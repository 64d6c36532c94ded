#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial overlay engine.
//!
//! Computes the three raw risk signals for a census tract: areal flood
//! overlap, weighted linear truck-route overlap, and nearest-hub
//! distance. Flood zones and routes are queried through bulk-loaded
//! R-tree indexes so each tract only pays for exact intersection against
//! features whose bounding boxes touch its own.
//!
//! Every per-feature overlay attempt resolves to an explicit outcome:
//! either a contribution or a counted skip. A degenerate geometry drops
//! that one contribution and the tract's processing continues.

pub mod hubs;
pub mod index;
pub mod proximity;

use fragility_map_models::{MarketHub, OverlaySkips, RawSignals, Tract};
use geo::Intersects;

use crate::index::{FloodIndex, RouteIndex, polygon_envelope};

/// Outcome of a single per-feature overlay attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayOutcome {
    /// The feature contributed this much area or weighted length.
    Contribution(f64),
    /// The feature's bounding box touched the tract but the geometry
    /// operation faulted; the contribution is dropped.
    Skipped,
}

/// Accumulated overlay result for one tract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayReport {
    /// Flood intersection area over tract area; 0 for zero-area tracts.
    pub flood_exposure: f64,
    /// Sum of clipped route length times route weight.
    pub truck_dependency: f64,
    /// Contributions skipped on geometry faults.
    pub skips: OverlaySkips,
}

/// Runs both overlay computations and the proximity lookup for one tract.
///
/// Tracts with no hubs in range get a proximity of 0; the normalizer's
/// zero-maximum guard then zeroes the signal for the whole population.
#[must_use]
pub fn score_tract(
    tract: &Tract,
    floods: &FloodIndex,
    routes: &RouteIndex,
    hubs: &[MarketHub],
) -> (RawSignals, OverlaySkips) {
    let report = overlay_tract(tract, floods, routes);
    let hub_proximity =
        proximity::nearest_hub_distance(tract.centroid, hubs).unwrap_or_default();

    (
        RawSignals {
            flood_exposure: report.flood_exposure,
            truck_dependency: report.truck_dependency,
            hub_proximity,
        },
        report.skips,
    )
}

/// Computes flood exposure and truck dependency for one tract.
#[must_use]
pub fn overlay_tract(tract: &Tract, floods: &FloodIndex, routes: &RouteIndex) -> OverlayReport {
    let envelope = polygon_envelope(&tract.geometry);
    let mut skips = OverlaySkips::default();

    let mut flood_area = 0.0;
    for entry in floods.candidates(&envelope) {
        if !tract.geometry.intersects(&entry.zone.geometry) {
            continue;
        }
        match flood_contribution(tract, &entry.zone.geometry) {
            OverlayOutcome::Contribution(area) => flood_area += area,
            OverlayOutcome::Skipped => skips.flood += 1,
        }
    }

    // Intersection areas accumulate across all intersecting flood
    // polygons without a union step: overlapping flood polygons
    // double-count their shared ground, so the ratio can exceed 1.0.
    let flood_exposure = if tract.area > 0.0 {
        flood_area / tract.area
    } else {
        0.0
    };

    let mut truck_dependency = 0.0;
    for entry in routes.candidates(&envelope) {
        if !tract.geometry.intersects(&entry.route.geometry) {
            continue;
        }
        match route_contribution(tract, entry.route.weight, &entry.route.geometry) {
            OverlayOutcome::Contribution(length) => truck_dependency += length,
            OverlayOutcome::Skipped => skips.routes += 1,
        }
    }

    OverlayReport {
        flood_exposure,
        truck_dependency,
        skips,
    }
}

fn flood_contribution(tract: &Tract, flood: &geo::MultiPolygon<f64>) -> OverlayOutcome {
    match fragility_map_geometry::intersection_area(&tract.geometry, flood) {
        Ok(area) => OverlayOutcome::Contribution(area),
        Err(fault) => {
            log::debug!("Tract {}: skipping flood overlay ({fault})", tract.geoid);
            OverlayOutcome::Skipped
        }
    }
}

fn route_contribution(
    tract: &Tract,
    weight: f64,
    route: &geo::MultiLineString<f64>,
) -> OverlayOutcome {
    match fragility_map_geometry::clipped_length(&tract.geometry, route) {
        Ok(length) => OverlayOutcome::Contribution(length * weight),
        Err(fault) => {
            log::debug!("Tract {}: skipping route overlay ({fault})", tract.geoid);
            OverlayOutcome::Skipped
        }
    }
}
