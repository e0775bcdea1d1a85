//! Filling missing cells of a field from its own valid cells.

use tracing::{debug, warn};

use crate::error::Result;
use crate::point_set::PointSet;
use crate::regridder::{check_method, PreparedSource, Regridder};
use crate::types::{Field, FieldValue, InterpolationMethod};

impl Regridder {
    /// Fill the invalid cells of `field` by interpolating from its valid
    /// cells at the cells' own coordinates.
    ///
    /// Valid cells are returned unchanged. Returns `Ok(None)` when the
    /// field has fewer valid cells than the configured minimum.
    pub fn fill_gaps<T: FieldValue>(
        &self,
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
        method: InterpolationMethod,
    ) -> Result<Option<Field<T>>> {
        check_method::<T>(method)?;
        let points = PointSet::from_field(field, lat, lon)?;

        let required = self.config().min_valid_points;
        if !points.is_sufficient(required) {
            warn!(
                valid = points.valid_count(),
                required,
                "Not enough valid points for interpolation. Skipping."
            );
            return Ok(None);
        }

        let holes: Vec<usize> = field
            .data()
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (!field.is_valid_value(v)).then_some(i))
            .collect();

        let mut data = field.data().to_vec();
        if !holes.is_empty() {
            let source = PreparedSource::new(&points, self.config());
            let nodes: Vec<[f64; 2]> = holes.iter().map(|&i| points.coordinates()[i]).collect();
            let filled = source.evaluate(&nodes, method);
            for (&i, v) in holes.iter().zip(filled) {
                data[i] = v;
            }
        }

        let out = Field::new(data, field.rows(), field.cols(), field.fill_value())?;
        debug!(
            method = %method,
            holes = holes.len(),
            remaining = out.len() - out.valid_count(),
            "Filled gaps"
        );
        Ok(Some(out))
    }

    /// [`fill_gaps`](Self::fill_gaps) with the configured default method.
    pub fn fill_gaps_with_default<T: FieldValue>(
        &self,
        field: &Field<T>,
        lat: &[f64],
        lon: &[f64],
    ) -> Result<Option<Field<T>>> {
        self.fill_gaps(field, lat, lon, self.default_method())
    }
}

/// Fill the gaps of `field` with the default configuration.
pub fn fill_gaps<T: FieldValue>(
    field: &Field<T>,
    lat: &[f64],
    lon: &[f64],
    method: InterpolationMethod,
) -> Result<Option<Field<T>>> {
    Regridder::default().fill_gaps(field, lat, lon, method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegridConfig;
    use crate::error::RegridError;
    use crate::types::HSAF_NO_DATA;

    fn axis(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_nearest_fills_every_hole() {
        let mut data: Vec<f32> = (0..36).map(|v| v as f32).collect();
        for i in [0, 7, 14, 20, 35] {
            data[i] = f32::NAN;
        }
        let field = Field::continuous(data.clone(), 6, 6).unwrap();

        let out = fill_gaps(&field, &axis(6), &axis(6), InterpolationMethod::Nearest)
            .unwrap()
            .unwrap();

        assert_eq!(out.valid_count(), 36);
        for (i, (&before, &after)) in data.iter().zip(out.data()).enumerate() {
            if !before.is_nan() {
                assert_eq!(before, after, "valid cell {} changed", i);
            }
        }
    }

    #[test]
    fn test_linear_fills_inside_hull() {
        // Plane 2 * row + col with an interior hole and a missing corner.
        let mut data: Vec<f64> = (0..25).map(|i| (2 * (i / 5) + i % 5) as f64).collect();
        data[12] = f64::NAN;
        data[24] = f64::NAN;
        let field = Field::continuous(data, 5, 5).unwrap();

        let out = fill_gaps(&field, &axis(5), &axis(5), InterpolationMethod::Linear)
            .unwrap()
            .unwrap();

        assert!((out.get(2, 2).unwrap() - 6.0).abs() < 1e-12);
        // The corner lies outside the hull of the remaining cells.
        assert!(out.get(4, 4).unwrap().is_nan());
    }

    #[test]
    fn test_below_threshold_is_none() {
        let mut data = vec![f32::NAN; 25];
        data[1] = 1.0;
        data[2] = 2.0;
        let field = Field::continuous(data, 5, 5).unwrap();

        let out = fill_gaps(&field, &axis(5), &axis(5), InterpolationMethod::Nearest).unwrap();
        assert!(out.is_none());

        let regridder =
            Regridder::new(RegridConfig::default().with_min_valid_points(2)).unwrap();
        let out = regridder
            .fill_gaps(&field, &axis(5), &axis(5), InterpolationMethod::Nearest)
            .unwrap()
            .unwrap();
        assert_eq!(out.valid_count(), 25);
    }

    #[test]
    fn test_category_codes_are_copied() {
        let data = vec![
            0u8, 0, 233, 3, //
            0, 233, 3, 3, //
            233, 0, 3, 3, //
            0, 0, 3, 233,
        ];
        let field = Field::categorical(data, 4, 4, 233).unwrap();
        let out = fill_gaps(&field, &axis(4), &axis(4), InterpolationMethod::Nearest)
            .unwrap()
            .unwrap();
        assert!(out.data().iter().all(|&v| v == 0 || v == 3));
    }

    #[test]
    fn test_linear_fill_leaves_no_holes_inside_hull() {
        // Plane on a 12x15 lattice; the border stays valid so every
        // interior hole lies inside the hull of the valid cells.
        let (rows, cols) = (12, 15);
        let plane = |r: usize, c: usize| 1.5 * r as f64 - 0.75 * c as f64 + 4.0;
        let mut data: Vec<f64> = (0..rows * cols).map(|i| plane(i / cols, i % cols)).collect();

        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut holes = 0;
        for r in 1..rows - 1 {
            for c in 1..cols - 1 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                if state % 10 < 3 {
                    data[r * cols + c] = f64::NAN;
                    holes += 1;
                }
            }
        }
        // A solid block as well as scattered cells.
        for r in 4..8 {
            for c in 5..10 {
                data[r * cols + c] = f64::NAN;
            }
        }
        assert!(holes > 0);
        let field = Field::continuous(data, rows, cols).unwrap();

        let out = fill_gaps(&field, &axis(rows), &axis(cols), InterpolationMethod::Linear)
            .unwrap()
            .unwrap();

        assert_eq!(out.valid_count(), rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let v = out.get(r, c).unwrap();
                assert!((v - plane(r, c)).abs() < 1e-9, "({}, {}): {}", r, c, v);
            }
        }
    }

    #[test]
    fn test_default_method_comes_from_config() {
        // Missing corner: nearest fills it, linear leaves it outside the hull.
        let mut data: Vec<f64> = (0..25).map(|v| v as f64).collect();
        data[24] = f64::NAN;
        let field = Field::continuous(data, 5, 5).unwrap();

        let nearest = Regridder::default()
            .fill_gaps_with_default(&field, &axis(5), &axis(5))
            .unwrap()
            .unwrap();
        assert_eq!(nearest.valid_count(), 25);

        let linear = Regridder::new(
            RegridConfig::default().with_method(InterpolationMethod::Linear),
        )
        .unwrap();
        assert_eq!(linear.default_method(), InterpolationMethod::Linear);
        let out = linear
            .fill_gaps_with_default(&field, &axis(5), &axis(5))
            .unwrap()
            .unwrap();
        assert!(out.get(4, 4).unwrap().is_nan());

        let codes = Field::categorical(vec![1u8; 16], 4, 4, HSAF_NO_DATA).unwrap();
        let err = linear
            .fill_gaps_with_default(&codes, &axis(4), &axis(4))
            .unwrap_err();
        assert!(matches!(err, RegridError::UnsupportedMethod { .. }));
    }
}
