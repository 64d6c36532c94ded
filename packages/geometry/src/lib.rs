#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` geometry adapter and fault-tolerant overlay primitives.
//!
//! Parses raw `GeoJSON` geometries into typed `geo` shapes and wraps the
//! overlay operations (polygon intersection area, line clipping, planar
//! distance) so a single degenerate geometry never aborts a tract's
//! processing. Everything downstream of the adapter works in typed `geo`
//! shapes; the serialized format does not leak past this crate.

use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Distance, Euclidean, Length, MultiLineString,
    MultiPolygon, Point,
};
use thiserror::Error;

/// Errors that can occur while adapting a raw geometry record.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The feature carried no geometry at all. Recoverable: the feature
    /// is dropped before processing, never fed to the overlay engine.
    #[error("Feature has no geometry")]
    Missing,

    /// The geometry parsed but is not a type this adapter accepts.
    #[error("Unsupported geometry type: expected {expected}, found {found}")]
    Unsupported {
        /// The geometry family the caller asked for.
        expected: &'static str,
        /// The geometry type actually present.
        found: &'static str,
    },

    /// The `GeoJSON` coordinate arrays could not be converted.
    #[error("Geometry conversion failed: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// A geometry operation that faulted mid-computation on a degenerate
/// shape. The offending contribution is skipped, not fatal.
#[derive(Debug, Error)]
#[error("Geometry fault during {op}")]
pub struct GeometryFault {
    /// The operation that faulted.
    pub op: &'static str,
}

/// Parse a raw `GeoJSON` geometry into a [`MultiPolygon`].
/// Accepts both `Polygon` and `MultiPolygon` geometry types.
///
/// # Errors
///
/// Returns [`GeometryError::Missing`] for an absent geometry,
/// [`GeometryError::Unsupported`] for a non-areal type, and
/// [`GeometryError::Conversion`] for malformed coordinate arrays.
pub fn to_multi_polygon(
    geometry: Option<&geojson::Geometry>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    match parse(geometry)? {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => Err(GeometryError::Unsupported {
            expected: "Polygon or MultiPolygon",
            found: kind(&other),
        }),
    }
}

/// Parse a raw `GeoJSON` geometry into a [`MultiLineString`].
/// Accepts both `LineString` and `MultiLineString` geometry types.
///
/// # Errors
///
/// Same taxonomy as [`to_multi_polygon`].
pub fn to_multi_line_string(
    geometry: Option<&geojson::Geometry>,
) -> Result<MultiLineString<f64>, GeometryError> {
    match parse(geometry)? {
        geo::Geometry::MultiLineString(mls) => Ok(mls),
        geo::Geometry::LineString(ls) => Ok(MultiLineString(vec![ls])),
        other => Err(GeometryError::Unsupported {
            expected: "LineString or MultiLineString",
            found: kind(&other),
        }),
    }
}

/// Parse a raw `GeoJSON` geometry into a [`Point`].
///
/// # Errors
///
/// Same taxonomy as [`to_multi_polygon`].
pub fn to_point(geometry: Option<&geojson::Geometry>) -> Result<Point<f64>, GeometryError> {
    match parse(geometry)? {
        geo::Geometry::Point(p) => Ok(p),
        other => Err(GeometryError::Unsupported {
            expected: "Point",
            found: kind(&other),
        }),
    }
}

fn parse(geometry: Option<&geojson::Geometry>) -> Result<geo::Geometry<f64>, GeometryError> {
    let geometry = geometry.ok_or(GeometryError::Missing)?;
    geo::Geometry::<f64>::try_from(geometry.clone()).map_err(|e| GeometryError::Conversion {
        message: e.to_string(),
    })
}

const fn kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// Unsigned planar area of a multipolygon in native coordinate units.
#[must_use]
pub fn area(mp: &MultiPolygon<f64>) -> f64 {
    mp.unsigned_area()
}

/// Area centroid of a multipolygon.
///
/// Zero-area shapes have no area centroid; fall back to the bounding
/// rectangle center, then the origin, so every tract still gets a
/// proximity signal instead of poisoning the run.
#[must_use]
pub fn centroid(mp: &MultiPolygon<f64>) -> Point<f64> {
    mp.centroid().unwrap_or_else(|| {
        mp.bounding_rect()
            .map_or_else(|| Point::new(0.0, 0.0), |rect| rect.center().into())
    })
}

/// Area of the intersection of two multipolygons.
///
/// # Errors
///
/// Boolean overlay can fault on self-intersecting or otherwise degenerate
/// rings; the fault is captured as a [`GeometryFault`] so the caller can
/// skip this one contribution and continue.
pub fn intersection_area(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<f64, GeometryFault> {
    catch_unwind(AssertUnwindSafe(|| a.intersection(b).unsigned_area()))
        .map_err(|_| GeometryFault { op: "intersection" })
}

/// Total length of `lines` clipped to the interior of `clip_to`.
///
/// # Errors
///
/// Same fault capture as [`intersection_area`].
pub fn clipped_length(
    clip_to: &MultiPolygon<f64>,
    lines: &MultiLineString<f64>,
) -> Result<f64, GeometryFault> {
    catch_unwind(AssertUnwindSafe(|| {
        Euclidean.length(&clip_to.clip(lines, false))
    }))
    .map_err(|_| GeometryFault { op: "clip" })
}

/// Planar Euclidean distance between two points, in native coordinate
/// units. Deliberately not geodesic: the inputs share one projected
/// reference frame.
#[must_use]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    Euclidean.distance(a, b)
}
