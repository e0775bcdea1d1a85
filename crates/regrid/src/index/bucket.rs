//! Uniform bucket grid.
//!
//! Points are binned into square cells sized so that each holds about
//! `occupancy` points on average. Nearest queries scan rings of cells
//! outwards from the query cell and stop once the next ring cannot hold
//! anything closer than the current best.

use super::{dist_sq, into_sorted_hits, Best, Hit, SpatialIndex};

/// Upper bound on the number of buckets along one axis.
const MAX_BUCKETS_PER_AXIS: usize = 1 << 14;

/// Bucket grid over `[lat, lon]` points.
#[derive(Debug, Clone)]
pub struct BucketIndex {
    points: Vec<[f64; 2]>,
    origin: [f64; 2],
    cell: f64,
    rows: usize,
    cols: usize,
    /// CSR offsets into `entries`, one per bucket plus a terminator.
    starts: Vec<usize>,
    /// Point slots grouped by bucket, ascending within each bucket.
    entries: Vec<usize>,
}

impl BucketIndex {
    /// Bin `points` with roughly `occupancy` points per bucket.
    pub fn build(points: Vec<[f64; 2]>, occupancy: usize) -> Self {
        let n = points.len();
        let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for p in &points {
            for axis in 0..2 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }
        if n == 0 {
            lo = [0.0, 0.0];
            hi = [0.0, 0.0];
        }

        let buckets = (n / occupancy.max(1)).max(1) as f64;
        let (h, w) = (hi[0] - lo[0], hi[1] - lo[1]);
        let cell = if h > 0.0 && w > 0.0 {
            (h * w / buckets).sqrt()
        } else if h.max(w) > 0.0 {
            h.max(w) / buckets
        } else {
            1.0
        };

        let rows = ((h / cell).floor() as usize + 1).min(MAX_BUCKETS_PER_AXIS);
        let cols = ((w / cell).floor() as usize + 1).min(MAX_BUCKETS_PER_AXIS);

        let mut index = Self {
            points,
            origin: lo,
            cell,
            rows,
            cols,
            starts: vec![0; rows * cols + 1],
            entries: vec![0; n],
        };
        index.fill_buckets();
        index
    }

    fn fill_buckets(&mut self) {
        let bucket_of: Vec<usize> = self
            .points
            .iter()
            .map(|&p| {
                let (r, c) = self.clamped_cell(p);
                r * self.cols + c
            })
            .collect();

        for &b in &bucket_of {
            self.starts[b + 1] += 1;
        }
        for b in 0..self.rows * self.cols {
            self.starts[b + 1] += self.starts[b];
        }

        let mut cursor = self.starts.clone();
        for (slot, &b) in bucket_of.iter().enumerate() {
            self.entries[cursor[b]] = slot;
            cursor[b] += 1;
        }
    }

    fn clamped_cell(&self, p: [f64; 2]) -> (usize, usize) {
        let clamp = |v: f64, origin: f64, n: usize| -> usize {
            let i = ((v - origin) / self.cell).floor();
            if i <= 0.0 {
                0
            } else {
                (i as usize).min(n - 1)
            }
        };
        (
            clamp(p[0], self.origin[0], self.rows),
            clamp(p[1], self.origin[1], self.cols),
        )
    }

    #[inline]
    fn bucket(&self, r: usize, c: usize) -> &[usize] {
        let b = r * self.cols + c;
        &self.entries[self.starts[b]..self.starts[b + 1]]
    }

    fn scan_bucket(&self, r: isize, c: isize, q: [f64; 2], best: &mut Best) {
        if r < 0 || c < 0 || r as usize >= self.rows || c as usize >= self.cols {
            return;
        }
        for &slot in self.bucket(r as usize, c as usize) {
            best.offer(dist_sq(q, self.points[slot]), slot);
        }
    }
}

impl SpatialIndex for BucketIndex {
    fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    fn nearest(&self, lat: f64, lon: f64) -> Option<Hit> {
        if self.points.is_empty() || !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        let q = [lat, lon];
        let (r0, c0) = self.clamped_cell(q);
        let (r0, c0) = (r0 as isize, c0 as isize);
        let max_ring = self.rows.max(self.cols) as isize;

        let mut best = Best::new();
        for ring in 0..=max_ring {
            if ring > 0 && best.found() {
                // Nothing in this ring or beyond is closer than this.
                let bound = (ring - 1) as f64 * self.cell;
                if bound * bound > best.dist_sq {
                    break;
                }
            }

            if ring == 0 {
                self.scan_bucket(r0, c0, q, &mut best);
                continue;
            }
            for c in (c0 - ring)..=(c0 + ring) {
                self.scan_bucket(r0 - ring, c, q, &mut best);
                self.scan_bucket(r0 + ring, c, q, &mut best);
            }
            for r in (r0 - ring + 1)..=(r0 + ring - 1) {
                self.scan_bucket(r, c0 - ring, q, &mut best);
                self.scan_bucket(r, c0 + ring, q, &mut best);
            }
        }
        best.into_hit()
    }

    fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Vec<Hit> {
        if self.points.is_empty() || !lat.is_finite() || !lon.is_finite() || !(radius >= 0.0) {
            return Vec::new();
        }
        let q = [lat, lon];
        let r_sq = radius * radius;
        let (r_lo, c_lo) = self.clamped_cell([lat - radius, lon - radius]);
        let (r_hi, c_hi) = self.clamped_cell([lat + radius, lon + radius]);

        let mut found = Vec::new();
        for r in r_lo..=r_hi {
            for c in c_lo..=c_hi {
                for &slot in self.bucket(r, c) {
                    let d = dist_sq(q, self.points[slot]);
                    if d <= r_sq {
                        found.push((d, slot));
                    }
                }
            }
        }
        into_sorted_hits(found)
    }
}
