//! Core types: field values, 2D fields and regridding results.

use std::fmt::Debug;
use std::str::FromStr;

use num_traits::{Float, NumCast};
use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};

/// HSAF snow-cover category for snow.
pub const HSAF_SNOW: u8 = 0;

/// HSAF snow-cover category for "no data".
pub const HSAF_NO_DATA: u8 = 233;

/// A value that can live in a regriddable field.
///
/// Continuous types (floats) may be blended by linear interpolation and use
/// NaN as their missing marker. Categorical types (integer codes) may only
/// be copied from a single source point and rely on the field's fill value
/// to mark missing cells.
pub trait FieldValue: NumCast + Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Whether two values of this type can be meaningfully blended.
    const CONTINUOUS: bool;

    /// True for NaN. Always false for integer codes.
    fn is_nan(self) -> bool;
}

macro_rules! continuous_value {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            const CONTINUOUS: bool = true;

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }
        }
    )*};
}

macro_rules! categorical_value {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            const CONTINUOUS: bool = false;

            #[inline]
            fn is_nan(self) -> bool {
                false
            }
        }
    )*};
}

continuous_value!(f32, f64);
categorical_value!(u8, u16, i16, i32);

/// A 2D row-major field with a fill value marking missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    fill_value: T,
}

impl<T: FieldValue> Field<T> {
    /// Wrap row-major data of shape `rows x cols`.
    pub fn new(data: Vec<T>, rows: usize, cols: usize, fill_value: T) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(RegridError::shape_mismatch(
                "field data",
                format!("{} values ({}x{})", rows * cols, rows, cols),
                format!("{} values", data.len()),
            ));
        }
        Ok(Self {
            data,
            rows,
            cols,
            fill_value,
        })
    }

    /// A categorical field whose missing cells carry `missing_code`.
    pub fn categorical(data: Vec<T>, rows: usize, cols: usize, missing_code: T) -> Result<Self> {
        Self::new(data, rows, cols, missing_code)
    }

    /// Slice layer `layer` out of a `(layers, rows, cols)` stack.
    ///
    /// Used for products that carry a leading category or time axis.
    pub fn from_stack(
        stack: &[T],
        layers: usize,
        rows: usize,
        cols: usize,
        layer: usize,
        fill_value: T,
    ) -> Result<Self> {
        if stack.len() != layers * rows * cols {
            return Err(RegridError::shape_mismatch(
                "layer stack",
                format!("{} values ({}x{}x{})", layers * rows * cols, layers, rows, cols),
                format!("{} values", stack.len()),
            ));
        }
        if layer >= layers {
            return Err(RegridError::shape_mismatch(
                "layer index",
                format!("< {}", layers),
                layer,
            ));
        }
        let plane = rows * cols;
        let start = layer * plane;
        Self::new(stack[start..start + plane].to_vec(), rows, cols, fill_value)
    }

    /// A field where every cell is the fill value.
    pub fn filled(rows: usize, cols: usize, fill_value: T) -> Self {
        Self {
            data: vec![fill_value; rows * cols],
            rows,
            cols,
            fill_value,
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// A value is valid unless it is NaN or equal to the fill value.
    #[inline]
    pub fn is_valid_value(&self, value: T) -> bool {
        !value.is_nan() && value != self.fill_value
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| self.is_valid_value(v)).count()
    }
}

impl<T: FieldValue + Float> Field<T> {
    /// A continuous field using NaN as the missing marker.
    pub fn continuous(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, T::nan())
    }
}

/// Interpolation method for regridding and gap filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Value of the closest valid source point, no blending.
    #[default]
    Nearest,
    /// Barycentric interpolation on a Delaunay triangulation; missing
    /// outside the convex hull of the valid points. Continuous fields only.
    Linear,
}

impl FromStr for InterpolationMethod {
    type Err = RegridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            other => Err(RegridError::invalid_config(format!(
                "unknown interpolation method '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

/// How a regridded field came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegridStatus {
    /// Values were interpolated from the source.
    Regridded,
    /// The source had too few valid points; every cell is the fill value.
    InsufficientData,
}

/// Output of a regrid: a 2D field on the target coordinates.
#[derive(Debug, Clone)]
pub struct RegriddedField<T> {
    field: Field<T>,
    /// Target latitudes: the row axis for regular grids, or a full
    /// row-major mesh for curvilinear targets.
    pub lat: Vec<f64>,
    /// Target longitudes, same convention as `lat`.
    pub lon: Vec<f64>,
    pub method: InterpolationMethod,
    pub status: RegridStatus,
}

impl<T: FieldValue> RegriddedField<T> {
    pub(crate) fn new(
        field: Field<T>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        method: InterpolationMethod,
        status: RegridStatus,
    ) -> Self {
        Self {
            field,
            lat,
            lon,
            method,
            status,
        }
    }

    pub fn data(&self) -> &[T] {
        self.field.data()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.field.shape()
    }

    pub fn fill_value(&self) -> T {
        self.field.fill_value()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.field.get(row, col)
    }

    /// Number of cells holding a value.
    pub fn valid_count(&self) -> usize {
        self.field.valid_count()
    }

    /// Fraction of cells holding a value (0.0 - 1.0).
    pub fn coverage(&self) -> f64 {
        if self.field.is_empty() {
            0.0
        } else {
            self.valid_count() as f64 / self.field.len() as f64
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        self.status == RegridStatus::InsufficientData
    }

    pub fn as_field(&self) -> &Field<T> {
        &self.field
    }

    pub fn into_field(self) -> Field<T> {
        self.field
    }
}

/// Statistics for the single-entry source cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Times a cached entry was discarded for a new key or by invalidation.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
