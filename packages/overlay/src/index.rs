//! R-tree indexes over the read-only overlay inputs.
//!
//! The per-tract loop is an O(tracts × features) nested intersection
//! test without pruning. Bulk-loading flood polygons and truck routes
//! into R-trees lets each tract query only the features whose bounding
//! boxes touch its own, before paying for exact intersection.

use fragility_map_models::{FloodZone, TruckRoute};
use geo::{BoundingRect, MultiLineString, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};

/// A flood polygon stored in the R-tree with its precomputed envelope.
pub struct FloodEntry {
    envelope: AABB<[f64; 2]>,
    /// The indexed flood zone.
    pub zone: FloodZone,
}

impl RTreeObject for FloodEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A truck route stored in the R-tree with its precomputed envelope.
pub struct RouteEntry {
    envelope: AABB<[f64; 2]>,
    /// The indexed route.
    pub route: TruckRoute,
}

impl RTreeObject for RouteEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Bulk-loaded R-tree over the flood zone collection.
pub struct FloodIndex {
    tree: RTree<FloodEntry>,
}

impl FloodIndex {
    /// Builds the index from the loaded flood zones.
    #[must_use]
    pub fn build(zones: Vec<FloodZone>) -> Self {
        let entries = zones
            .into_iter()
            .map(|zone| FloodEntry {
                envelope: polygon_envelope(&zone.geometry),
                zone,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed flood zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no flood zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Flood zones whose bounding boxes intersect `envelope`.
    pub fn candidates(
        &self,
        envelope: &AABB<[f64; 2]>,
    ) -> impl Iterator<Item = &FloodEntry> + '_ {
        self.tree.locate_in_envelope_intersecting(envelope)
    }
}

/// Bulk-loaded R-tree over the truck route collection.
pub struct RouteIndex {
    tree: RTree<RouteEntry>,
}

impl RouteIndex {
    /// Builds the index from the loaded routes.
    #[must_use]
    pub fn build(routes: Vec<TruckRoute>) -> Self {
        let entries = routes
            .into_iter()
            .map(|route| RouteEntry {
                envelope: line_envelope(&route.geometry),
                route,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Routes whose bounding boxes intersect `envelope`.
    pub fn candidates(
        &self,
        envelope: &AABB<[f64; 2]>,
    ) -> impl Iterator<Item = &RouteEntry> + '_ {
        self.tree.locate_in_envelope_intersecting(envelope)
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
pub fn polygon_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

/// Compute the bounding box envelope for a [`MultiLineString`].
pub fn line_envelope(mls: &MultiLineString<f64>) -> AABB<[f64; 2]> {
    mls.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
