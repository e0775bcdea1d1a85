//! Common test fixtures for regridding tests.
//!
//! This module provides pre-defined domains and small hand-checkable
//! scenes.

/// Domain bounds as `(lat_min, lat_max, lon_min, lon_max, resolution)`.
pub mod domains {
    /// EXPATS domain over central Europe at 0.04 degrees.
    pub const EXPATS: (f64, f64, f64, f64, f64) = (42.0, 51.5, 5.0, 16.0, 0.04);

    /// Rows and columns of the EXPATS grid.
    pub const EXPATS_SHAPE: (usize, usize) = (239, 276);

    /// A few cells, quick to regrid in unit tests.
    pub const SMALL: (f64, f64, f64, f64, f64) = (45.0, 46.0, 7.0, 8.5, 0.25);

    /// Resolution coarser than the span: two nodes per axis.
    pub const SINGLE_CELL: (f64, f64, f64, f64, f64) = (10.0, 10.3, 20.0, 20.3, 1.0);
}

/// The 3x3 scene used to check exact reproduction.
pub mod exact {
    pub const LAT: [f64; 3] = [10.0, 11.0, 12.0];
    pub const LON: [f64; 3] = [100.0, 101.0, 102.0];
    pub const VALUES: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
}

/// HSAF snow-cover codes.
pub mod hsaf {
    pub const SNOW: u8 = 0;
    pub const CLOUD: u8 = 42;
    pub const WATER: u8 = 85;
    pub const NO_DATA: u8 = 233;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expats_shape_matches_bounds() {
        let (lat_min, lat_max, lon_min, lon_max, res) = domains::EXPATS;
        let rows = ((lat_max - lat_min) / res).round() as usize + 1;
        let cols = ((lon_max - lon_min) / res).round() as usize + 1;
        assert_eq!((rows, cols), domains::EXPATS_SHAPE);
    }

    #[test]
    fn test_exact_scene_consistent() {
        assert_eq!(exact::VALUES.len(), exact::LAT.len() * exact::LON.len());
    }
}
