//! Regular lat/lon target grids.
//!
//! Axes are ascending: row 0 is `lat_min`, column 0 is `lon_min`, and data
//! laid out on the grid is row-major (latitude-major).

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{GridError, GridResult};

/// Upper bound on nodes per axis; anything larger is a misconfigured resolution.
const MAX_AXIS_LEN: f64 = 1.0e7;

/// Bounds and resolution of a regular grid, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    /// Node spacing in degrees.
    pub resolution: f64,
}

/// A validated regular lat/lon grid.
///
/// Immutable once constructed; the node arrays are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridBounds", into = "GridBounds")]
pub struct GridSpecification {
    bounds: GridBounds,
    shape: (usize, usize),
}

impl GridSpecification {
    /// Validate bounds and resolution and derive the grid shape.
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        resolution: f64,
    ) -> GridResult<Self> {
        let bounds = GridBounds {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            resolution,
        };
        validate(&bounds)?;

        let shape = (
            axis_len(lat_min, lat_max, resolution),
            axis_len(lon_min, lon_max, resolution),
        );

        Ok(Self { bounds, shape })
    }

    pub fn lat_min(&self) -> f64 {
        self.bounds.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.bounds.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.bounds.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.bounds.lon_max
    }

    pub fn resolution(&self) -> f64 {
        self.bounds.resolution
    }

    /// Grid shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    /// Total number of grid nodes.
    pub fn len(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    /// A validated grid always has at least 2x2 nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.bounds.lon_min,
            self.bounds.lat_min,
            self.bounds.lon_max,
            self.bounds.lat_max,
        )
    }

    /// Latitude of every row, ascending.
    pub fn lat_axis(&self) -> Vec<f64> {
        let b = &self.bounds;
        regular_axis(b.lat_min, b.lat_max, self.shape.0, b.resolution)
    }

    /// Longitude of every column, ascending.
    pub fn lon_axis(&self) -> Vec<f64> {
        let b = &self.bounds;
        regular_axis(b.lon_min, b.lon_max, self.shape.1, b.resolution)
    }

    /// Row-major `(lat_mesh, lon_mesh)` node arrays of length `rows * cols`.
    pub fn meshgrid(&self) -> (Vec<f64>, Vec<f64>) {
        let lats = self.lat_axis();
        let lons = self.lon_axis();
        let mut lat_mesh = Vec::with_capacity(self.len());
        let mut lon_mesh = Vec::with_capacity(self.len());
        for &lat in &lats {
            for &lon in &lons {
                lat_mesh.push(lat);
                lon_mesh.push(lon);
            }
        }
        (lat_mesh, lon_mesh)
    }

    /// Coordinates `(lat, lon)` of a single node.
    pub fn node(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        if row >= self.shape.0 || col >= self.shape.1 {
            return None;
        }
        let b = &self.bounds;
        Some((
            axis_value(b.lat_min, b.lat_max, self.shape.0, b.resolution, row),
            axis_value(b.lon_min, b.lon_max, self.shape.1, b.resolution, col),
        ))
    }
}

impl TryFrom<GridBounds> for GridSpecification {
    type Error = GridError;

    fn try_from(b: GridBounds) -> Result<Self, Self::Error> {
        Self::new(b.lat_min, b.lat_max, b.lon_min, b.lon_max, b.resolution)
    }
}

impl From<GridSpecification> for GridBounds {
    fn from(spec: GridSpecification) -> Self {
        spec.bounds
    }
}

/// Generate the latitude and longitude axes of a regular grid.
///
/// Both axes start exactly at the minimum and end exactly at the maximum.
/// Interior nodes sit at `min + i * resolution`; the final step is whatever
/// remains of the span and is kept as is.
pub fn generate_regular_grid(
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    resolution: f64,
) -> GridResult<(Vec<f64>, Vec<f64>)> {
    let spec = GridSpecification::new(lat_min, lat_max, lon_min, lon_max, resolution)?;
    Ok((spec.lat_axis(), spec.lon_axis()))
}

fn validate(b: &GridBounds) -> GridResult<()> {
    let all = [b.lat_min, b.lat_max, b.lon_min, b.lon_max, b.resolution];
    if all.iter().any(|v| !v.is_finite()) {
        return Err(GridError::invalid_spec(format!(
            "non-finite bounds or resolution: {:?}",
            b
        )));
    }
    if b.resolution <= 0.0 {
        return Err(GridError::invalid_spec(format!(
            "resolution must be > 0, got {}",
            b.resolution
        )));
    }
    if b.lat_min >= b.lat_max {
        return Err(GridError::invalid_spec(format!(
            "lat_min ({}) must be < lat_max ({})",
            b.lat_min, b.lat_max
        )));
    }
    if b.lon_min >= b.lon_max {
        return Err(GridError::invalid_spec(format!(
            "lon_min ({}) must be < lon_max ({})",
            b.lon_min, b.lon_max
        )));
    }
    let widest = (b.lat_max - b.lat_min).max(b.lon_max - b.lon_min);
    if widest / b.resolution > MAX_AXIS_LEN {
        return Err(GridError::invalid_spec(format!(
            "resolution {} is too fine for a span of {} degrees",
            b.resolution, widest
        )));
    }
    Ok(())
}

/// Number of nodes on one axis: `round(span / resolution) + 1`, never below 2.
fn axis_len(min: f64, max: f64, resolution: f64) -> usize {
    let steps = ((max - min) / resolution).round() as usize;
    steps.max(1) + 1
}

#[inline]
fn axis_value(min: f64, max: f64, len: usize, resolution: f64, i: usize) -> f64 {
    if i + 1 == len {
        max
    } else {
        min + i as f64 * resolution
    }
}

fn regular_axis(min: f64, max: f64, len: usize, resolution: f64) -> Vec<f64> {
    (0..len)
        .map(|i| axis_value(min, max, len, resolution, i))
        .collect()
}
