//! Delaunay triangulation and barycentric interpolation.
//!
//! Incremental Bowyer-Watson insertion inside a large enclosing triangle.
//! Each new point is located by walking across neighbor links, the cavity
//! of triangles whose circumcircle contains it is grown from there, and the
//! cavity is re-triangulated as a fan around the point.
//!
//! Triangles touching the enclosing triangle's corners lie outside the
//! convex hull of the input; queries landing in them report no value.

use std::collections::HashMap;

use tracing::debug;

const NONE: usize = usize::MAX;

/// Number of artificial corner vertices stored ahead of the input points.
const SUPER: usize = 3;

/// Relative tolerance for treating a query as lying on a hull edge.
const EDGE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    /// Vertex ids, counter-clockwise.
    v: [usize; 3],
    /// `n[k]` is the triangle across the edge opposite `v[k]`.
    n: [usize; 3],
    alive: bool,
}

impl Triangle {
    fn is_exterior(&self) -> bool {
        self.v.iter().any(|&v| v < SUPER)
    }
}

/// A query location expressed as weights on three input points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    /// Input point indices.
    pub points: [usize; 3],
    /// Weights summing to one.
    pub weights: [f64; 3],
}

/// Delaunay triangulation of a set of `[lat, lon]` points.
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Enclosing triangle corners followed by the input points.
    vertices: Vec<[f64; 2]>,
    triangles: Vec<Triangle>,
    interior: usize,
    duplicates: usize,
    eps: f64,
}

#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive when `d` lies strictly inside the circumcircle of CCW `abc`.
#[inline]
fn incircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx)
}

impl Triangulation {
    /// Triangulate `points`. Exact duplicates are kept only once.
    pub fn build(points: &[[f64; 2]]) -> Self {
        let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for p in points {
            for axis in 0..2 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }
        if points.is_empty() {
            lo = [0.0, 0.0];
            hi = [0.0, 0.0];
        }

        let extent = (hi[0] - lo[0]).max(hi[1] - lo[1]);
        let d = if extent > 0.0 { extent } else { 1.0 };
        let (cx, cy) = ((lo[0] + hi[0]) / 2.0, (lo[1] + hi[1]) / 2.0);

        let mut vertices = Vec::with_capacity(points.len() + SUPER);
        vertices.push([cx - 20.0 * d, cy - 10.0 * d]);
        vertices.push([cx + 20.0 * d, cy - 10.0 * d]);
        vertices.push([cx, cy + 20.0 * d]);
        vertices.extend_from_slice(points);

        let mut tri = Self {
            vertices,
            triangles: vec![Triangle {
                v: [0, 1, 2],
                n: [NONE; 3],
                alive: true,
            }],
            interior: 0,
            duplicates: 0,
            eps: EDGE_EPS * d * d,
        };

        let mut hint = 0;
        let mut marks = Vec::new();
        for vid in SUPER..tri.vertices.len() {
            if !tri.insert(vid, &mut hint, &mut marks) {
                tri.duplicates += 1;
            }
        }
        tri.compact();
        tri.interior = tri.triangles.iter().filter(|t| !t.is_exterior()).count();

        debug!(
            points = points.len(),
            triangles = tri.interior,
            duplicates = tri.duplicates,
            "Built Delaunay triangulation"
        );
        tri
    }

    /// Number of input points, duplicates included.
    pub fn num_points(&self) -> usize {
        self.vertices.len() - SUPER
    }

    /// Number of triangles inside the convex hull.
    pub fn num_triangles(&self) -> usize {
        self.interior
    }

    /// Input points skipped because an identical point came first.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// True when the input spans no area (fewer than three distinct
    /// points, or all collinear). Every query then reports no value.
    pub fn is_degenerate(&self) -> bool {
        self.interior == 0
    }

    /// Interior triangles as CCW triples of input point indices.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles
            .iter()
            .filter(|t| !t.is_exterior())
            .map(|t| [t.v[0] - SUPER, t.v[1] - SUPER, t.v[2] - SUPER])
    }

    fn insert(&mut self, vid: usize, hint: &mut usize, marks: &mut Vec<usize>) -> bool {
        let p = self.vertices[vid];
        let start = match self.walk(p, *hint) {
            Some(t) => t,
            None => return false,
        };
        if self.triangles[start]
            .v
            .iter()
            .any(|&v| self.vertices[v] == p)
        {
            return false;
        }

        // Grow the cavity of triangles whose circumcircle holds `p`.
        marks.resize(self.triangles.len(), NONE);
        marks[start] = vid;
        let mut cavity = vec![start];
        let mut stack = vec![start];
        while let Some(t) = stack.pop() {
            for k in 0..3 {
                let nb = self.triangles[t].n[k];
                if nb != NONE && marks[nb] != vid && self.in_circumcircle(nb, p) {
                    marks[nb] = vid;
                    cavity.push(nb);
                    stack.push(nb);
                }
            }
        }

        // Cavity boundary as directed edges (a, b) with the triangle beyond.
        let mut boundary = Vec::with_capacity(cavity.len() + 2);
        for &t in &cavity {
            let tri = self.triangles[t];
            for k in 0..3 {
                let nb = tri.n[k];
                if nb == NONE || marks[nb] != vid {
                    boundary.push((tri.v[(k + 1) % 3], tri.v[(k + 2) % 3], nb));
                }
            }
        }
        for &t in &cavity {
            self.triangles[t].alive = false;
        }

        let base = self.triangles.len();
        let mut by_start: HashMap<usize, usize> = HashMap::with_capacity(boundary.len());
        for (j, &(a, b, outer)) in boundary.iter().enumerate() {
            let t = base + j;
            self.triangles.push(Triangle {
                v: [a, b, vid],
                n: [NONE, NONE, outer],
                alive: true,
            });
            by_start.insert(a, t);
            if outer != NONE {
                let o = &mut self.triangles[outer];
                for k in 0..3 {
                    if o.v[(k + 1) % 3] == b && o.v[(k + 2) % 3] == a {
                        o.n[k] = t;
                    }
                }
            }
        }

        // Stitch the fan: (a, b, p) meets (b, c, p) across edge (b, p).
        for (j, &(_, b, _)) in boundary.iter().enumerate() {
            let t = base + j;
            if let Some(&next) = by_start.get(&b) {
                self.triangles[t].n[0] = next;
                self.triangles[next].n[1] = t;
            }
        }

        *hint = base;
        true
    }

    fn in_circumcircle(&self, t: usize, p: [f64; 2]) -> bool {
        let [a, b, c] = self.triangles[t].v;
        incircle(self.vertices[a], self.vertices[b], self.vertices[c], p) > 0.0
    }

    /// Walk from `start` towards the triangle containing `p`.
    fn walk(&self, p: [f64; 2], start: usize) -> Option<usize> {
        let mut t = if start < self.triangles.len() && self.triangles[start].alive {
            start
        } else {
            self.triangles.iter().position(|t| t.alive)?
        };

        for _ in 0..self.triangles.len() + 16 {
            let tri = &self.triangles[t];
            let mut next = NONE;
            for k in 0..3 {
                let a = self.vertices[tri.v[(k + 1) % 3]];
                let b = self.vertices[tri.v[(k + 2) % 3]];
                if orient(a, b, p) < 0.0 {
                    next = tri.n[k];
                    if next == NONE {
                        return None;
                    }
                    break;
                }
            }
            if next == NONE {
                return Some(t);
            }
            t = next;
        }

        // Walk did not settle (cycling on nearly degenerate input).
        self.scan(p)
    }

    fn scan(&self, p: [f64; 2]) -> Option<usize> {
        self.triangles.iter().position(|tri| {
            tri.alive
                && (0..3).all(|k| {
                    let a = self.vertices[tri.v[(k + 1) % 3]];
                    let b = self.vertices[tri.v[(k + 2) % 3]];
                    orient(a, b, p) >= 0.0
                })
        })
    }

    /// Drop dead triangles and renumber neighbor links.
    fn compact(&mut self) {
        let mut remap = vec![NONE; self.triangles.len()];
        let mut kept = Vec::with_capacity(self.triangles.len() / 2 + 1);
        for (i, t) in self.triangles.iter().enumerate() {
            if t.alive {
                remap[i] = kept.len();
                kept.push(*t);
            }
        }
        for t in &mut kept {
            for n in &mut t.n {
                if *n != NONE {
                    *n = remap[*n];
                }
            }
        }
        self.triangles = kept;
    }

    /// Locate `(lat, lon)` inside the convex hull.
    ///
    /// `hint` is the triangle to start walking from and is updated to the
    /// triangle found, so nearby consecutive queries stay cheap.
    pub fn locate(&self, lat: f64, lon: f64, hint: &mut usize) -> Option<Barycentric> {
        if self.is_degenerate() || !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        let p = [lat, lon];
        let t = self.walk(p, *hint)?;
        *hint = t;

        let tri = self.triangles[t];
        // Exact hits on an input vertex, including hull corners.
        for &v in &tri.v {
            if v >= SUPER && self.vertices[v] == p {
                return Some(Barycentric {
                    points: [v - SUPER; 3],
                    weights: [1.0, 0.0, 0.0],
                });
            }
        }

        if !tri.is_exterior() {
            return Some(self.weights(&tri, p));
        }

        // On a hull edge, the walk may stop on the outer side.
        for k in 0..3 {
            let (a, b) = (tri.v[(k + 1) % 3], tri.v[(k + 2) % 3]);
            let nb = tri.n[k];
            if a < SUPER || b < SUPER || nb == NONE {
                continue;
            }
            if orient(self.vertices[a], self.vertices[b], p).abs() <= self.eps {
                let inner = self.triangles[nb];
                if !inner.is_exterior() && self.contains_loosely(&inner, p) {
                    *hint = nb;
                    return Some(self.weights(&inner, p));
                }
            }
        }
        None
    }

    fn contains_loosely(&self, tri: &Triangle, p: [f64; 2]) -> bool {
        (0..3).all(|k| {
            let a = self.vertices[tri.v[(k + 1) % 3]];
            let b = self.vertices[tri.v[(k + 2) % 3]];
            orient(a, b, p) >= -self.eps
        })
    }

    fn weights(&self, tri: &Triangle, p: [f64; 2]) -> Barycentric {
        let [a, b, c] = tri.v;
        let (pa, pb, pc) = (self.vertices[a], self.vertices[b], self.vertices[c]);
        let area = orient(pa, pb, pc);
        Barycentric {
            points: [a - SUPER, b - SUPER, c - SUPER],
            weights: [
                orient(pb, pc, p) / area,
                orient(pc, pa, p) / area,
                orient(pa, pb, p) / area,
            ],
        }
    }

    /// Linearly interpolate `values` (one per input point) at `(lat, lon)`.
    pub fn interpolate(&self, values: &[f64], lat: f64, lon: f64, hint: &mut usize) -> Option<f64> {
        let bc = self.locate(lat, lon, hint)?;
        let v: f64 = bc
            .points
            .iter()
            .zip(&bc.weights)
            .map(|(&i, &w)| if w == 0.0 { 0.0 } else { w * values[i] })
            .sum();
        v.is_finite().then_some(v)
    }
}
