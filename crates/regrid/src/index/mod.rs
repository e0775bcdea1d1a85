//! Spatial indexes for nearest-neighbor and radius queries.
//!
//! Distances are Euclidean in `(lat, lon)` degree space, the same metric
//! the gridded products are matched with upstream. Among exactly
//! equidistant candidates the point inserted first (lowest slot) wins, for
//! every index implementation.

pub mod bucket;
pub mod kdtree;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::point_set::PointSet;
use crate::types::FieldValue;

pub use bucket::BucketIndex;
pub use kdtree::KdTree;

/// Which spatial index to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Balanced 2D k-d tree.
    #[default]
    KdTree,
    /// Uniform grid of buckets; fast for dense, evenly spread sources.
    Bucket,
}

impl FromStr for IndexKind {
    type Err = RegridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "kdtree" | "kd-tree" | "kd_tree" => Ok(Self::KdTree),
            "bucket" | "grid" => Ok(Self::Bucket),
            other => Err(RegridError::invalid_config(format!(
                "unknown index kind '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KdTree => write!(f, "kdtree"),
            Self::Bucket => write!(f, "bucket"),
        }
    }
}

/// A point found by an index query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position of the point in the indexed slice.
    pub slot: usize,
    pub distance: f64,
}

/// A fixed set of `[lat, lon]` points supporting proximity queries.
///
/// Implementations are immutable after construction.
pub trait SpatialIndex: Send + Sync {
    /// The indexed points, in insertion order.
    fn points(&self) -> &[[f64; 2]];

    /// Closest point to `(lat, lon)`; ties go to the lowest slot.
    fn nearest(&self, lat: f64, lon: f64) -> Option<Hit>;

    /// All points within `radius`, ordered by distance then slot.
    fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Vec<Hit>;

    fn len(&self) -> usize {
        self.points().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest point for each `[lat, lon]` query.
    fn nearest_batch(&self, queries: &[[f64; 2]]) -> Vec<Option<Hit>> {
        queries.iter().map(|q| self.nearest(q[0], q[1])).collect()
    }
}

/// Best candidate seen so far during a nearest query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Best {
    pub dist_sq: f64,
    pub slot: usize,
}

impl Best {
    pub fn new() -> Self {
        Self {
            dist_sq: f64::INFINITY,
            slot: usize::MAX,
        }
    }

    #[inline]
    pub fn offer(&mut self, dist_sq: f64, slot: usize) {
        if dist_sq < self.dist_sq || (dist_sq == self.dist_sq && slot < self.slot) {
            self.dist_sq = dist_sq;
            self.slot = slot;
        }
    }

    pub fn found(&self) -> bool {
        self.slot != usize::MAX
    }

    pub fn into_hit(self) -> Option<Hit> {
        self.found().then(|| Hit {
            slot: self.slot,
            distance: self.dist_sq.sqrt(),
        })
    }
}

#[inline]
pub(crate) fn dist_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

/// Sort `(dist_sq, slot)` candidates and convert them to hits.
pub(crate) fn into_sorted_hits(mut found: Vec<(f64, usize)>) -> Vec<Hit> {
    found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    found
        .into_iter()
        .map(|(d, slot)| Hit {
            slot,
            distance: d.sqrt(),
        })
        .collect()
}

/// A neighbor expressed in terms of the source point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in its [`PointSet`].
    pub index: usize,
    /// Position among the valid points.
    pub slot: usize,
    pub distance: f64,
}

/// Spatial index over the valid points of one [`PointSet`].
///
/// Built once and never updated; a changed point set needs a new index.
pub struct NearestNeighborIndex {
    inner: Box<dyn SpatialIndex>,
    /// PointSet index of every slot, ascending.
    members: Vec<usize>,
    kind: IndexKind,
}

impl NearestNeighborIndex {
    /// Index the valid points of `points`.
    pub fn build<T: FieldValue>(points: &PointSet<T>, kind: IndexKind, occupancy: usize) -> Self {
        let members: Vec<usize> = points.valid_indices().collect();
        let coords: Vec<[f64; 2]> = members.iter().map(|&i| points.coordinates()[i]).collect();

        let inner: Box<dyn SpatialIndex> = match kind {
            IndexKind::KdTree => Box::new(KdTree::build(coords)),
            IndexKind::Bucket => Box::new(BucketIndex::build(coords, occupancy)),
        };

        debug!(kind = %kind, points = members.len(), "Built nearest-neighbor index");

        Self {
            inner,
            members,
            kind,
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Coordinates of the indexed points, by slot.
    pub fn points(&self) -> &[[f64; 2]] {
        self.inner.points()
    }

    /// PointSet index of every slot.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn nearest(&self, lat: f64, lon: f64) -> Option<Neighbor> {
        self.inner.nearest(lat, lon).map(|h| self.to_neighbor(h))
    }

    pub fn nearest_batch(&self, queries: &[[f64; 2]]) -> Vec<Option<Neighbor>> {
        self.inner
            .nearest_batch(queries)
            .into_iter()
            .map(|h| h.map(|h| self.to_neighbor(h)))
            .collect()
    }

    pub fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Vec<Neighbor> {
        self.inner
            .within_radius(lat, lon, radius)
            .into_iter()
            .map(|h| self.to_neighbor(h))
            .collect()
    }

    #[inline]
    fn to_neighbor(&self, hit: Hit) -> Neighbor {
        Neighbor {
            index: self.members[hit.slot],
            slot: hit.slot,
            distance: hit.distance,
        }
    }
}

impl std::fmt::Debug for NearestNeighborIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestNeighborIndex")
            .field("kind", &self.kind)
            .field("points", &self.members.len())
            .finish()
    }
}
