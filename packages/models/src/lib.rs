#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core data types for the logistics fragility pipeline.
//!
//! The pipeline overlays flood zones, truck routes, and wholesale market
//! hubs onto census tract polygons and combines three normalized risk
//! signals into one composite fragility index. These types carry data
//! between the pipeline stages; none of them mutate after construction,
//! so the per-tract scoring loop can treat every collection as read-only.

use geo::{MultiLineString, MultiPolygon, Point};
use geojson::JsonObject;
use serde::{Deserialize, Serialize};

/// A census tract, the unit of scoring.
///
/// Geometry is held twice: the parsed [`MultiPolygon`] drives the overlay
/// math, while `raw_geometry` preserves the exact input `GeoJSON` shape so
/// the output feature collection echoes it byte-for-byte.
#[derive(Debug, Clone)]
pub struct Tract {
    /// Census GEOID (state FIPS + county FIPS + tract code). Empty when
    /// the input feature carries no `geoid` property.
    pub geoid: String,
    /// Parsed tract polygon(s).
    pub geometry: MultiPolygon<f64>,
    /// Unsigned planar area in native coordinate units.
    pub area: f64,
    /// Area centroid used for hub proximity.
    pub centroid: Point<f64>,
    /// Geometry exactly as it appeared in the input, passed through to
    /// the output untouched.
    pub raw_geometry: geojson::Geometry,
    /// Original feature properties, passed through to the output.
    pub properties: JsonObject,
}

/// A flood-risk polygon. Carries no weighting.
#[derive(Debug, Clone)]
pub struct FloodZone {
    /// Parsed flood polygon(s), in the same reference frame as the tracts.
    pub geometry: MultiPolygon<f64>,
}

/// A truck route with its dependency weight.
///
/// The weight is a static classification derived once at load time from
/// the route's `routetype` property: through-routes carry more weight
/// than local routes.
#[derive(Debug, Clone)]
pub struct TruckRoute {
    /// Parsed route line(s).
    pub geometry: MultiLineString<f64>,
    /// Dependency weight applied to intersected route length.
    pub weight: f64,
}

/// A raw wholesale-market point location, tagged with its category.
#[derive(Debug, Clone)]
pub struct MarketPoint {
    /// Market category (`MARKET` property, defaulting to "Other").
    pub category: String,
    /// Point location.
    pub location: Point<f64>,
}

/// A representative centroid for one market category.
///
/// Built once per run by averaging the category's point locations; never
/// mutated afterward.
#[derive(Debug, Clone)]
pub struct MarketHub {
    /// Market category this hub represents.
    pub category: String,
    /// Planar mean of the category's point coordinates.
    pub centroid: Point<f64>,
}

/// The three raw risk signals computed for one tract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSignals {
    /// Flood intersection area divided by tract area. May exceed 1.0 when
    /// flood polygons overlap each other inside the tract.
    pub flood_exposure: f64,
    /// Sum of intersected route length times route weight. Absolute
    /// weighted length, not normalized by tract size.
    pub truck_dependency: f64,
    /// Planar distance from the tract centroid to the nearest hub.
    pub hub_proximity: f64,
}

/// The three signals rescaled into [0, 1] against the population maxima.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSignals {
    /// `flood_exposure / max(flood_exposure)`, 0 when the maximum is 0.
    pub flood_exposure: f64,
    /// `truck_dependency / max(truck_dependency)`, 0 when the maximum is 0.
    pub truck_dependency: f64,
    /// `1 - hub_proximity / max(hub_proximity)`, 0 when the maximum is 0.
    /// Polarity-inverted so proximity, not distance, increases risk.
    pub hub_proximity: f64,
}

/// Per-signal maxima observed across the entire tract population.
///
/// Computed once after the raw pass completes; every tract in a run is
/// normalized against the same scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMaxima {
    /// Largest flood exposure ratio in the population.
    pub flood_exposure: f64,
    /// Largest weighted truck length in the population.
    pub truck_dependency: f64,
    /// Largest nearest-hub distance in the population.
    pub hub_proximity: f64,
}

/// Composite weights applied to the normalized signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeWeights {
    /// Weight on the normalized truck dependency signal.
    pub truck: f64,
    /// Weight on the normalized flood exposure signal.
    pub flood: f64,
    /// Weight on the inverted, normalized hub proximity signal.
    pub hub: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            truck: 0.4,
            flood: 0.4,
            hub: 0.2,
        }
    }
}

impl CompositeWeights {
    /// Sum of the three weights. Valid configurations sum to 1.0.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.truck + self.flood + self.hub
    }
}

/// Overlay contributions skipped because a geometry operation faulted.
///
/// A skip drops one flood or route contribution for one tract; the rest
/// of the tract's processing continues. Counts are summed across the run
/// and surfaced in the [`RunSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySkips {
    /// Flood polygon contributions skipped.
    pub flood: u64,
    /// Truck route contributions skipped.
    pub routes: u64,
}

impl OverlaySkips {
    /// Fold another tract's skip counts into this total.
    pub fn absorb(&mut self, other: Self) {
        self.flood += other.flood;
        self.routes += other.routes;
    }

    /// Whether any contribution was skipped.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.flood > 0 || self.routes > 0
    }
}

/// Stage-one output: one tract's raw signals plus its skip counts.
#[derive(Debug, Clone)]
pub struct RawScore {
    /// GEOID of the scored tract.
    pub geoid: String,
    /// Raw signal values before normalization.
    pub raw: RawSignals,
    /// Overlay contributions skipped for this tract.
    pub skips: OverlaySkips,
}

/// Terminal result record for one tract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TractScore {
    /// GEOID of the scored tract.
    pub geoid: String,
    /// Raw signal values.
    pub raw: RawSignals,
    /// Signals rescaled against the population maxima.
    pub normalized: NormalizedSignals,
    /// Weighted composite fragility index. Nominally in [0, 1]; can
    /// exceed 1.0 only through the flood double-counting edge case.
    pub logistics_fragility: f64,
}

/// Input features dropped before scoring because they had no usable
/// geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedFeatures {
    /// Census tract features dropped.
    pub tracts: u64,
    /// Flood zone features dropped.
    pub flood_zones: u64,
    /// Truck route features dropped.
    pub truck_routes: u64,
    /// Market point features dropped.
    pub markets: u64,
}

/// Distribution of the composite index across all scored tracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    /// Smallest composite index.
    pub min: f64,
    /// Largest composite index.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (midpoint average for even counts).
    pub median: f64,
}

/// Diagnostics for one complete pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of tracts scored and emitted.
    pub tracts_scored: u64,
    /// Number of market hubs built.
    pub hubs_built: u64,
    /// Input features dropped for missing geometry.
    pub dropped: DroppedFeatures,
    /// Overlay contributions skipped across all tracts.
    pub skips: OverlaySkips,
    /// Population maxima used for normalization.
    pub maxima: SignalMaxima,
    /// Composite score distribution; `None` when no tracts were scored.
    pub distribution: Option<ScoreDistribution>,
}
