//! Integration tests for small hand-checkable regridding scenes.
//!
//! Every expected value here can be worked out on paper from the source
//! arrays.

use regrid::{
    build_point_set, fill_gaps, regrid, Field, GridSpecification, InterpolationMethod, PointSet,
    RegridConfig, RegridError, RegridStatus, Regridder,
};
use test_utils::{assert_approx_eq, category_bands, exact, hsaf, meshgrid, regular_axis};

/// Regridder accepting the nine points of the 3x3 scene.
fn small_scene_regridder() -> Regridder {
    Regridder::new(RegridConfig::default().with_min_valid_points(9)).unwrap()
}

// =============================================================================
// Exact 3x3 scene
// =============================================================================

#[test]
fn test_exact_grid_nearest_reproduces_input() {
    let field = Field::continuous(exact::VALUES.to_vec(), 3, 3).unwrap();
    let (lat, lon) = meshgrid(&exact::LAT, &exact::LON);
    let grid = GridSpecification::new(10.0, 12.0, 100.0, 102.0, 1.0).unwrap();

    let out = small_scene_regridder()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)
        .unwrap();

    assert_eq!(out.status, RegridStatus::Regridded);
    assert_eq!(out.shape(), (3, 3));
    assert_eq!(out.data(), &exact::VALUES);
    assert_eq!(out.lat, exact::LAT.to_vec());
    assert_eq!(out.lon, exact::LON.to_vec());
}

#[test]
fn test_exact_grid_linear_reproduces_input() {
    let field = Field::continuous(exact::VALUES.to_vec(), 3, 3).unwrap();
    let grid = GridSpecification::new(10.0, 12.0, 100.0, 102.0, 1.0).unwrap();

    let out = small_scene_regridder()
        .regrid_field(&field, &exact::LAT, &exact::LON, &grid, InterpolationMethod::Linear)
        .unwrap();

    for (got, want) in out.data().iter().zip(exact::VALUES) {
        assert_approx_eq!(*got, want, 1e-9);
    }
}

#[test]
fn test_exact_grid_refined_linear() {
    // values = 3 * (lat - 10) + (lon - 100) + 1, a plane.
    let field = Field::continuous(exact::VALUES.to_vec(), 3, 3).unwrap();
    let grid = GridSpecification::new(10.0, 12.0, 100.0, 102.0, 0.5).unwrap();

    let out = small_scene_regridder()
        .regrid_field(&field, &exact::LAT, &exact::LON, &grid, InterpolationMethod::Linear)
        .unwrap();

    assert_eq!(out.shape(), (5, 5));
    for (r, &lat) in out.lat.iter().enumerate() {
        for (c, &lon) in out.lon.iter().enumerate() {
            let expected = 3.0 * (lat - 10.0) + (lon - 100.0) + 1.0;
            assert_approx_eq!(out.get(r, c).unwrap(), expected, 1e-9);
        }
    }
}

// =============================================================================
// Insufficient data
// =============================================================================

fn sparse_5x5() -> (Field<f32>, Vec<f64>) {
    let mut data = vec![f32::NAN; 25];
    data[2] = 270.0;
    data[13] = 265.0;
    data[21] = 280.0;
    (Field::continuous(data, 5, 5).unwrap(), regular_axis(45.0, 0.1, 5))
}

#[test]
fn test_insufficient_data_build_point_set() {
    let (field, axis) = sparse_5x5();
    let err = build_point_set(&field, &axis, &axis).unwrap_err();
    assert!(matches!(
        err,
        RegridError::InsufficientData {
            valid: 3,
            required: 10
        }
    ));
}

#[test]
fn test_insufficient_data_regrid_is_sentinel() {
    let (field, axis) = sparse_5x5();
    let points = PointSet::from_field(&field, &axis, &axis).unwrap();
    let grid = GridSpecification::new(45.0, 45.4, 45.0, 45.4, 0.1).unwrap();

    for method in [InterpolationMethod::Nearest, InterpolationMethod::Linear] {
        let out = regrid(&points, &grid, method).unwrap();
        assert!(out.is_insufficient_data());
        assert_eq!(out.shape(), grid.shape());
        assert_eq!(out.valid_count(), 0);
        assert!(out.data().iter().all(|v| v.is_nan()));
    }
}

#[test]
fn test_insufficient_data_gap_fill_is_none() {
    let (field, axis) = sparse_5x5();
    let out = fill_gaps(&field, &axis, &axis, InterpolationMethod::Nearest).unwrap();
    assert!(out.is_none());
}

#[test]
fn test_all_missing_source_is_sentinel() {
    let field = Field::categorical(vec![hsaf::NO_DATA; 12], 3, 4, hsaf::NO_DATA).unwrap();
    let lat = regular_axis(46.0, 0.5, 3);
    let lon = regular_axis(7.0, 0.5, 4);
    let grid = GridSpecification::new(46.0, 47.0, 7.0, 8.5, 0.25).unwrap();

    let out = Regridder::default()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)
        .unwrap();
    assert!(out.is_insufficient_data());
    assert!(out.data().iter().all(|&v| v == hsaf::NO_DATA));
}

// =============================================================================
// HSAF categories
// =============================================================================

/// 5x4 source: columns 0-1 carry NO_DATA, columns 2-3 carry SNOW.
fn hsaf_scene(fill: u8) -> (Field<u8>, Vec<f64>, Vec<f64>) {
    let data = category_bands(5, 4, &[hsaf::NO_DATA, hsaf::SNOW], 2);
    (
        Field::categorical(data, 5, 4, fill).unwrap(),
        regular_axis(0.0, 1.0, 5),
        regular_axis(0.0, 1.0, 4),
    )
}

#[test]
fn test_hsaf_tie_picks_first_code_never_blend() {
    // With an unrelated fill code, 233 is an ordinary category.
    let (field, lat, lon) = hsaf_scene(255);
    // Column 0 sits at lon 1.5, exactly between source columns 1 and 2.
    let grid = GridSpecification::new(0.0, 4.0, 1.5, 2.5, 1.0).unwrap();

    let out = Regridder::default()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)
        .unwrap();

    for r in 0..5 {
        // Source column 1 comes first in row-major order.
        assert_eq!(out.get(r, 0), Some(hsaf::NO_DATA));
        assert_eq!(out.get(r, 1), Some(hsaf::SNOW));
    }
    assert!(out.data().iter().all(|&v| v == hsaf::NO_DATA || v == hsaf::SNOW));
}

#[test]
fn test_hsaf_no_data_code_is_never_copied() {
    let (field, lat, lon) = hsaf_scene(hsaf::NO_DATA);
    let grid = GridSpecification::new(0.0, 4.0, 1.5, 2.5, 1.0).unwrap();

    let out = Regridder::default()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)
        .unwrap();

    assert_eq!(out.status, RegridStatus::Regridded);
    assert!(out.data().iter().all(|&v| v == hsaf::SNOW));
}

#[test]
fn test_hsaf_linear_is_rejected() {
    let (field, lat, lon) = hsaf_scene(hsaf::NO_DATA);
    let grid = GridSpecification::new(0.0, 4.0, 0.0, 3.0, 0.5).unwrap();

    let err = Regridder::default()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Linear)
        .unwrap_err();
    assert!(matches!(err, RegridError::UnsupportedMethod { .. }));

    let err = fill_gaps(&field, &lat, &lon, InterpolationMethod::Linear).unwrap_err();
    assert!(matches!(err, RegridError::UnsupportedMethod { .. }));
}

// =============================================================================
// Shape errors
// =============================================================================

#[test]
fn test_mismatched_coordinates_fail_fast() {
    let field = Field::continuous(vec![1.0f32; 12], 3, 4).unwrap();
    let grid = GridSpecification::new(0.0, 2.0, 0.0, 3.0, 1.0).unwrap();
    let lat = regular_axis(0.0, 1.0, 4);
    let lon = regular_axis(0.0, 1.0, 3);

    let err = Regridder::default()
        .regrid_field(&field, &lat, &lon, &grid, InterpolationMethod::Nearest)
        .unwrap_err();
    assert!(matches!(err, RegridError::ShapeMismatch { .. }));

    let err = fill_gaps(&field, &lat, &lon, InterpolationMethod::Nearest).unwrap_err();
    assert!(matches!(err, RegridError::ShapeMismatch { .. }));
}
