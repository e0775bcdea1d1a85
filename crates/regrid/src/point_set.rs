//! Flattened, validity-masked source points.
//!
//! A [`PointSet`] is the bridge between a gridded source field and the
//! spatial index: every source cell becomes one `(lat, lon, value)` triple
//! in row-major order, and a mask records which triples may take part in
//! interpolation.

use grid_common::BoundingBox;
use tracing::debug;

use crate::config::DEFAULT_MIN_VALID_POINTS;
use crate::error::{RegridError, Result};
use crate::types::{Field, FieldValue};

/// How a pair of coordinate arrays relates to a `rows x cols` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateLayout {
    /// `lat` has one entry per row and `lon` one per column.
    Axes,
    /// `lat` and `lon` hold one entry per cell, row-major.
    Mesh,
}

impl CoordinateLayout {
    /// Work out the layout of `lat`/`lon` for a `rows x cols` array.
    ///
    /// A full mesh is recognized first; when both readings fit (a single
    /// row or column) they describe the same nodes.
    pub fn detect(lat_len: usize, lon_len: usize, rows: usize, cols: usize) -> Result<Self> {
        let cells = rows * cols;
        if lat_len == cells && lon_len == cells {
            Ok(Self::Mesh)
        } else if lat_len == rows && lon_len == cols {
            Ok(Self::Axes)
        } else {
            Err(RegridError::shape_mismatch(
                "coordinates",
                format!(
                    "1D axes of length ({}, {}) or 2D meshes of length {}",
                    rows, cols, cells
                ),
                format!("lat {} / lon {}", lat_len, lon_len),
            ))
        }
    }
}

/// Expand `lat`/`lon` into one `[lat, lon]` pair per cell, row-major.
pub(crate) fn flatten_coordinates(
    lat: &[f64],
    lon: &[f64],
    rows: usize,
    cols: usize,
) -> Result<Vec<[f64; 2]>> {
    let coords = match CoordinateLayout::detect(lat.len(), lon.len(), rows, cols)? {
        CoordinateLayout::Mesh => lat.iter().zip(lon).map(|(&la, &lo)| [la, lo]).collect(),
        CoordinateLayout::Axes => {
            let mut coords = Vec::with_capacity(rows * cols);
            for &la in lat {
                for &lo in lon {
                    coords.push([la, lo]);
                }
            }
            coords
        }
    };
    Ok(coords)
}

/// Source points of one field, flattened row-major.
///
/// `coordinates`, `values` and `valid_mask` always have the same length.
/// A point is valid when its value is neither NaN nor the fill value and
/// both of its coordinates are finite.
#[derive(Debug, Clone)]
pub struct PointSet<T> {
    coords: Vec<[f64; 2]>,
    values: Vec<T>,
    valid_mask: Vec<bool>,
    valid_count: usize,
    fill_value: T,
    shape: (usize, usize),
}

impl<T: FieldValue> PointSet<T> {
    /// Flatten a field without checking how many points are valid.
    ///
    /// `lat`/`lon` may be 1D axes or 2D meshes matching the field.
    pub fn from_field(field: &Field<T>, lat: &[f64], lon: &[f64]) -> Result<Self> {
        let (rows, cols) = field.shape();
        let coords = flatten_coordinates(lat, lon, rows, cols)?;

        let values = field.data().to_vec();
        let valid_mask: Vec<bool> = coords
            .iter()
            .zip(&values)
            .map(|(c, &v)| field.is_valid_value(v) && c[0].is_finite() && c[1].is_finite())
            .collect();
        let valid_count = valid_mask.iter().filter(|&&v| v).count();

        debug!(points = values.len(), valid = valid_count, rows, cols, "Built point set");

        Ok(Self {
            coords,
            values,
            valid_mask,
            valid_count,
            fill_value: field.fill_value(),
            shape: (rows, cols),
        })
    }

    /// Flatten a field, failing with `InsufficientData` when fewer than
    /// `min_valid_points` points are valid.
    pub fn build(
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
        min_valid_points: usize,
    ) -> Result<Self> {
        let points = Self::from_field(field, lat, lon)?;
        points.ensure_sufficient(min_valid_points)?;
        Ok(points)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Shape of the source field the points came from.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    /// `(lat, lon)` of point `i`.
    pub fn coordinate(&self, i: usize) -> (f64, f64) {
        let c = self.coords[i];
        (c[0], c[1])
    }

    pub fn value(&self, i: usize) -> T {
        self.values[i]
    }

    pub fn is_valid(&self, i: usize) -> bool {
        self.valid_mask[i]
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn valid_mask(&self) -> &[bool] {
        &self.valid_mask
    }

    /// All coordinates as `[lat, lon]`, including invalid points.
    pub fn coordinates(&self) -> &[[f64; 2]] {
        &self.coords
    }

    /// Indices of valid points in ascending (insertion) order.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &valid)| valid.then_some(i))
    }

    /// Bounding box of the valid points, `None` when there are none.
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.valid_indices().map(|i| self.coordinate(i)))
    }

    pub fn is_sufficient(&self, min_valid_points: usize) -> bool {
        self.valid_count >= min_valid_points
    }

    pub fn ensure_sufficient(&self, min_valid_points: usize) -> Result<()> {
        if self.is_sufficient(min_valid_points) {
            Ok(())
        } else {
            Err(RegridError::InsufficientData {
                valid: self.valid_count,
                required: min_valid_points,
            })
        }
    }
}

/// Build a point set with the default minimum of valid points.
pub fn build_point_set<T: FieldValue>(
    field: &Field<T>,
    lat: &[f64],
    lon: &[f64],
) -> Result<PointSet<T>> {
    PointSet::build(field, lat, lon, DEFAULT_MIN_VALID_POINTS)
}
