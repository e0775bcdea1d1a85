//! Implicit 2D k-d tree.
//!
//! The tree is stored as a permutation of point slots: the median of every
//! sub-range is its node and the halves on either side are its children,
//! alternating between the latitude and longitude axis with depth.

use super::{dist_sq, into_sorted_hits, Best, Hit, SpatialIndex};

/// Balanced k-d tree over `[lat, lon]` points.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<[f64; 2]>,
    order: Vec<usize>,
}

impl KdTree {
    /// Build the tree. O(n log n).
    pub fn build(points: Vec<[f64; 2]>) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        partition(&points, &mut order, 0);
        Self { points, order }
    }

    fn nearest_in(&self, lo: usize, hi: usize, depth: usize, q: [f64; 2], best: &mut Best) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let slot = self.order[mid];
        let p = self.points[slot];
        best.offer(dist_sq(q, p), slot);

        let axis = depth % 2;
        let diff = q[axis] - p[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.nearest_in(near.0, near.1, depth + 1, q, best);
        // Equal distance still has to be searched for a lower slot.
        if diff * diff <= best.dist_sq {
            self.nearest_in(far.0, far.1, depth + 1, q, best);
        }
    }

    fn radius_in(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        q: [f64; 2],
        r_sq: f64,
        found: &mut Vec<(f64, usize)>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let slot = self.order[mid];
        let p = self.points[slot];
        let d = dist_sq(q, p);
        if d <= r_sq {
            found.push((d, slot));
        }

        let axis = depth % 2;
        let diff = q[axis] - p[axis];
        if diff <= 0.0 || diff * diff <= r_sq {
            self.radius_in(lo, mid, depth + 1, q, r_sq, found);
        }
        if diff >= 0.0 || diff * diff <= r_sq {
            self.radius_in(mid + 1, hi, depth + 1, q, r_sq, found);
        }
    }
}

/// Arrange `order` so every sub-range's median splits it on the depth axis.
fn partition(points: &[[f64; 2]], order: &mut [usize], depth: usize) {
    if order.len() <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

    let (left, right) = order.split_at_mut(mid);
    partition(points, left, depth + 1);
    partition(points, &mut right[1..], depth + 1);
}

impl SpatialIndex for KdTree {
    fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    fn nearest(&self, lat: f64, lon: f64) -> Option<Hit> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        let mut best = Best::new();
        self.nearest_in(0, self.order.len(), 0, [lat, lon], &mut best);
        best.into_hit()
    }

    fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Vec<Hit> {
        if !lat.is_finite() || !lon.is_finite() || !(radius >= 0.0) {
            return Vec::new();
        }
        let mut found = Vec::new();
        self.radius_in(
            0,
            self.order.len(),
            0,
            [lat, lon],
            radius * radius,
            &mut found,
        );
        into_sorted_hits(found)
    }
}
