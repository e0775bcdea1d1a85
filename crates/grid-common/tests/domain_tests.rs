//! Integration tests for loading domain catalogs from disk.

use grid_common::{DomainCatalog, GridError, GridSpecification};
use test_utils::{assert_coords_approx_eq, config_file, fixtures::domains, temp_yaml_file};

fn grid_from(bounds: (f64, f64, f64, f64, f64)) -> GridSpecification {
    let (lat_min, lat_max, lon_min, lon_max, resolution) = bounds;
    GridSpecification::new(lat_min, lat_max, lon_min, lon_max, resolution).unwrap()
}

#[test]
fn test_load_workspace_domains() {
    let catalog = DomainCatalog::from_yaml_file(config_file("domains.yaml")).unwrap();

    let expats = catalog.grid("expats").unwrap();
    let builtin = DomainCatalog::builtin().grid("expats").unwrap();
    assert_eq!(expats, builtin);
    assert_eq!(expats.shape(), domains::EXPATS_SHAPE);

    let coarse = catalog.grid("expats_coarse").unwrap();
    assert_eq!(coarse.shape(), (96, 111));
}

#[test]
fn test_load_from_tempfile() {
    let file = temp_yaml_file(
        "domains:\n  Tiny:\n    grid:\n      lat_min: 10.0\n      lat_max: 12.0\n      lon_min: 100.0\n      lon_max: 102.0\n      resolution: 1.0\n",
    );

    let catalog = DomainCatalog::from_yaml_file(file.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["tiny"]);

    let grid = catalog.grid("TINY").unwrap();
    assert_eq!(grid.lat_axis(), vec![10.0, 11.0, 12.0]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DomainCatalog::from_yaml_file(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(GridError::Io(_))));
}

#[test]
fn test_malformed_yaml_is_yaml_error() {
    let result = DomainCatalog::from_yaml_str("domains: [not, a, map");
    assert!(matches!(result, Err(GridError::Yaml(_))));
}

#[test]
fn test_fixture_domains() {
    assert_eq!(grid_from(domains::EXPATS).shape(), domains::EXPATS_SHAPE);

    let small = grid_from(domains::SMALL);
    assert_eq!(small.shape(), (5, 7));
    let (lat, lon) = small.node(4, 6).unwrap();
    assert_coords_approx_eq!((lat, lon), (46.0, 8.5), 1e-12);

    // Span below one resolution step still yields both corners.
    let single = grid_from(domains::SINGLE_CELL);
    assert_eq!(single.shape(), (2, 2));
    let (lat, lon) = single.node(1, 1).unwrap();
    assert_coords_approx_eq!((lat, lon), (10.3, 20.3), 1e-12);
}
