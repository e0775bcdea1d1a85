//! Regridding of point sets onto target grids.
//!
//! A [`PreparedSource`] bundles everything derived from one source field:
//! the valid values, the nearest-neighbor index and, on first linear use,
//! a Delaunay triangulation. The [`Regridder`] evaluates prepared sources
//! at the nodes of a [`GridSpecification`] or at arbitrary coordinates.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use grid_common::GridSpecification;
use num_traits::NumCast;
use tracing::{debug, warn};

use crate::cache::SourceCache;
use crate::config::RegridConfig;
use crate::error::{RegridError, Result};
use crate::index::{NearestNeighborIndex, Neighbor};
use crate::point_set::{flatten_coordinates, PointSet};
use crate::triangulation::Triangulation;
use crate::types::{Field, FieldValue, InterpolationMethod, RegridStatus, RegriddedField};

struct LinearInterpolant {
    triangulation: Triangulation,
    values: Vec<f64>,
}

/// A source field ready to be queried.
///
/// Holds only the valid points of the [`PointSet`] it was built from.
/// Immutable after construction apart from the lazily built triangulation.
pub struct PreparedSource<T> {
    index: NearestNeighborIndex,
    /// Value of every index slot.
    values: Vec<T>,
    fill_value: T,
    source_shape: (usize, usize),
    max_distance: Option<f64>,
    linear: OnceLock<LinearInterpolant>,
}

impl<T: FieldValue> PreparedSource<T> {
    /// Index the valid points of `points` as configured.
    ///
    /// No minimum is enforced here; see [`Regridder::prepare`].
    pub fn new(points: &PointSet<T>, config: &RegridConfig) -> Self {
        let index =
            NearestNeighborIndex::build(points, config.index, config.bucket_target_occupancy);
        let values = index.members().iter().map(|&i| points.value(i)).collect();

        Self {
            index,
            values,
            fill_value: points.fill_value(),
            source_shape: points.shape(),
            max_distance: config.max_distance,
            linear: OnceLock::new(),
        }
    }

    /// Number of valid source points.
    pub fn valid_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    /// Shape of the source field.
    pub fn source_shape(&self) -> (usize, usize) {
        self.source_shape
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    pub fn index(&self) -> &NearestNeighborIndex {
        &self.index
    }

    /// Delaunay triangulation of the valid points, built on first use.
    pub fn triangulation(&self) -> &Triangulation {
        &self.linear().triangulation
    }

    fn linear(&self) -> &LinearInterpolant {
        self.linear.get_or_init(|| LinearInterpolant {
            triangulation: Triangulation::build(self.index.points()),
            values: self
                .values
                .iter()
                .map(|v| v.to_f64().unwrap_or(f64::NAN))
                .collect(),
        })
    }

    /// Closest valid point, subject to the distance cutoff.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<Neighbor> {
        self.index
            .nearest(lat, lon)
            .filter(|n| self.max_distance.map_or(true, |d| n.distance <= d))
    }

    /// Value of the closest valid point, or `None` when there is none
    /// within the cutoff.
    pub fn sample(&self, lat: f64, lon: f64) -> Option<T> {
        self.nearest(lat, lon).map(|n| self.values[n.slot])
    }

    /// [`sample`](Self::sample) for many `(lat, lon)` locations.
    pub fn sample_many(&self, locations: &[(f64, f64)]) -> Vec<Option<T>> {
        locations
            .iter()
            .map(|&(lat, lon)| self.sample(lat, lon))
            .collect()
    }

    /// Every valid point within `radius` degrees with its value, closest
    /// first; equidistant points keep source order.
    pub fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Vec<(Neighbor, T)> {
        self.index
            .within_radius(lat, lon, radius)
            .into_iter()
            .map(|n| (n, self.values[n.slot]))
            .collect()
    }

    /// Evaluate at `[lat, lon]` nodes; uncovered nodes get the fill value.
    pub(crate) fn evaluate(&self, nodes: &[[f64; 2]], method: InterpolationMethod) -> Vec<T> {
        match method {
            InterpolationMethod::Nearest => nodes
                .iter()
                .map(|q| self.sample(q[0], q[1]).unwrap_or(self.fill_value))
                .collect(),
            InterpolationMethod::Linear => {
                let linear = self.linear();
                let mut hint = 0;
                nodes
                    .iter()
                    .map(|q| {
                        if self.max_distance.is_some() && self.nearest(q[0], q[1]).is_none() {
                            return self.fill_value;
                        }
                        linear
                            .triangulation
                            .interpolate(&linear.values, q[0], q[1], &mut hint)
                            .and_then(<T as NumCast>::from)
                            .unwrap_or(self.fill_value)
                    })
                    .collect()
            }
        }
    }
}

impl<T> std::fmt::Debug for PreparedSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedSource")
            .field("index", &self.index)
            .field("source_shape", &self.source_shape)
            .field("max_distance", &self.max_distance)
            .field("triangulated", &self.linear.get().is_some())
            .finish()
    }
}

/// Rejects blending of category codes.
pub(crate) fn check_method<T: FieldValue>(method: InterpolationMethod) -> Result<()> {
    if method == InterpolationMethod::Linear && !T::CONTINUOUS {
        return Err(RegridError::UnsupportedMethod {
            method,
            reason: "categorical fields can only be regridded with nearest".to_string(),
        });
    }
    Ok(())
}

/// Regrids sources according to a fixed [`RegridConfig`].
#[derive(Debug, Clone, Default)]
pub struct Regridder {
    config: RegridConfig,
}

impl Regridder {
    pub fn new(config: RegridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RegridConfig {
        &self.config
    }

    /// Method used by callers that do not pick one.
    pub fn default_method(&self) -> InterpolationMethod {
        self.config.method
    }

    /// Prepare a point set for querying.
    ///
    /// Fails with `InsufficientData` below the configured minimum.
    pub fn prepare<T: FieldValue>(&self, points: &PointSet<T>) -> Result<PreparedSource<T>> {
        points.ensure_sufficient(self.config.min_valid_points)?;
        Ok(PreparedSource::new(points, &self.config))
    }

    /// Build the point set of `field` and prepare it.
    pub fn prepare_field<T: FieldValue>(
        &self,
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
    ) -> Result<PreparedSource<T>> {
        let points = PointSet::build(field, lat, lon, self.config.min_valid_points)?;
        Ok(PreparedSource::new(&points, &self.config))
    }

    /// Prepare `field` through a single-entry cache keyed by timestamp.
    ///
    /// The cached source is reused while `timestamp` stays the same.
    pub fn prepare_cached<'c, T: FieldValue>(
        &self,
        cache: &'c mut SourceCache<T>,
        timestamp: DateTime<Utc>,
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
    ) -> Result<&'c PreparedSource<T>> {
        cache.get_or_try_insert_with(timestamp, || self.prepare_field(field, lat, lon))
    }

    /// Regrid a point set onto the nodes of `grid`.
    ///
    /// A point set with too few valid points yields an all-missing field
    /// with status [`RegridStatus::InsufficientData`].
    pub fn regrid<T: FieldValue>(
        &self,
        points: &PointSet<T>,
        grid: &GridSpecification,
        method: InterpolationMethod,
    ) -> Result<RegriddedField<T>> {
        check_method::<T>(method)?;
        if !points.is_sufficient(self.config.min_valid_points) {
            let (rows, cols) = grid.shape();
            return Ok(self.skipped(
                points.valid_count(),
                points.fill_value(),
                (rows, cols),
                grid.lat_axis(),
                grid.lon_axis(),
                method,
            ));
        }
        let source = PreparedSource::new(points, &self.config);
        self.regrid_prepared(&source, grid, method)
    }

    /// Regrid a field given its coordinates.
    pub fn regrid_field<T: FieldValue>(
        &self,
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
        grid: &GridSpecification,
        method: InterpolationMethod,
    ) -> Result<RegriddedField<T>> {
        check_method::<T>(method)?;
        let points = PointSet::from_field(field, lat, lon)?;
        self.regrid(&points, grid, method)
    }

    /// Regrid an already prepared source onto the nodes of `grid`.
    pub fn regrid_prepared<T: FieldValue>(
        &self,
        source: &PreparedSource<T>,
        grid: &GridSpecification,
        method: InterpolationMethod,
    ) -> Result<RegriddedField<T>> {
        let lat = grid.lat_axis();
        let lon = grid.lon_axis();
        self.regrid_onto(source, &lat, &lon, grid.rows(), grid.cols(), method)
    }

    /// Regrid onto arbitrary target coordinates.
    ///
    /// `target_lat`/`target_lon` are 1D axes or 2D meshes for a
    /// `rows x cols` target, with the same rules as source coordinates.
    pub fn regrid_onto<T: FieldValue>(
        &self,
        source: &PreparedSource<T>,
        target_lat: &[f64],
        target_lon: &[f64],
        rows: usize,
        cols: usize,
        method: InterpolationMethod,
    ) -> Result<RegriddedField<T>> {
        check_method::<T>(method)?;
        let nodes = flatten_coordinates(target_lat, target_lon, rows, cols)?;

        if source.valid_count() < self.config.min_valid_points {
            return Ok(self.skipped(
                source.valid_count(),
                source.fill_value(),
                (rows, cols),
                target_lat.to_vec(),
                target_lon.to_vec(),
                method,
            ));
        }

        let data = source.evaluate(&nodes, method);
        let field = Field::new(data, rows, cols, source.fill_value())?;
        debug!(
            method = %method,
            rows,
            cols,
            covered = field.valid_count(),
            "Regridded source"
        );

        Ok(RegriddedField::new(
            field,
            target_lat.to_vec(),
            target_lon.to_vec(),
            method,
            RegridStatus::Regridded,
        ))
    }

    fn skipped<T: FieldValue>(
        &self,
        valid: usize,
        fill_value: T,
        (rows, cols): (usize, usize),
        lat: Vec<f64>,
        lon: Vec<f64>,
        method: InterpolationMethod,
    ) -> RegriddedField<T> {
        warn!(
            valid,
            required = self.config.min_valid_points,
            "Not enough valid points for interpolation. Skipping."
        );
        RegriddedField::new(
            Field::filled(rows, cols, fill_value),
            lat,
            lon,
            method,
            RegridStatus::InsufficientData,
        )
    }
}

/// Regrid `points` onto `grid` with the default configuration.
pub fn regrid<T: FieldValue>(
    points: &PointSet<T>,
    grid: &GridSpecification,
    method: InterpolationMethod,
) -> Result<RegriddedField<T>> {
    Regridder::default().regrid(points, grid, method)
}
