//! Test data generators for synthetic satellite scenes.
//!
//! These generators create predictable, verifiable fields and coordinate
//! arrays that can be used across the test suite. All arrays are row-major
//! with rows following latitude.

/// Evenly spaced axis of `n` values starting at `start`.
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Broadcasts 1D axes into row-major `(lat_mesh, lon_mesh)`.
pub fn meshgrid(lat: &[f64], lon: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut lat_mesh = Vec::with_capacity(lat.len() * lon.len());
    let mut lon_mesh = Vec::with_capacity(lat.len() * lon.len());
    for &la in lat {
        for &lo in lon {
            lat_mesh.push(la);
            lon_mesh.push(lo);
        }
    }
    (lat_mesh, lon_mesh)
}

/// Creates a sheared, slightly rotated 2D mesh resembling the native grid
/// of a geostationary instrument over Europe.
///
/// Node `(row, col)` sits at
/// `lat0 + row * dlat + col * dlon * skew`,
/// `lon0 + col * dlon - row * dlat * skew`.
///
/// # Returns
///
/// Row-major `(lat_mesh, lon_mesh)`, each of length `rows * cols`.
pub fn curvilinear_mesh(
    rows: usize,
    cols: usize,
    origin: (f64, f64),
    step: (f64, f64),
    skew: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (lat0, lon0) = origin;
    let (dlat, dlon) = step;
    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let (r, c) = (r as f64, c as f64);
            lat.push(lat0 + r * dlat + c * dlon * skew);
            lon.push(lon0 + c * dlon - r * dlat * skew);
        }
    }
    (lat, lon)
}

/// Evaluates `a * lat + b * lon + c` at every mesh node.
///
/// Linear interpolation must reproduce such a field exactly inside the
/// convex hull of the nodes.
pub fn planar_field(lat: &[f64], lon: &[f64], a: f64, b: f64, c: f64) -> Vec<f64> {
    lat.iter().zip(lon).map(|(&la, &lo)| a * la + b * lo + c).collect()
}

/// Creates brightness temperatures in Kelvin from 1D axes.
///
/// Values range from about 210K (cold cloud tops) to 300K (warm surface),
/// with a smooth wave pattern so that neighbouring cells differ.
pub fn brightness_temperature(lat: &[f64], lon: &[f64]) -> Vec<f32> {
    let mut data = Vec::with_capacity(lat.len() * lon.len());
    for &la in lat {
        for &lo in lon {
            let wave = (la * 0.9).sin() * (lo * 0.7).cos();
            data.push((255.0 + 45.0 * wave) as f32);
        }
    }
    data
}

/// Creates a binary cloud mask (1 = cloudy, 0 = clear) with a deterministic
/// pseudo-random pattern.
///
/// # Arguments
///
/// * `rows` - Number of rows
/// * `cols` - Number of columns
/// * `seed` - Seed; the same seed always yields the same mask
pub fn cloud_mask(rows: usize, cols: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShift::new(seed);
    (0..rows * cols)
        .map(|_| u8::from(rng.next_f64() < 0.4))
        .collect()
}

/// Creates a snow-cover category field with vertical bands of `codes`.
///
/// Every `band_width` columns the next code is used, cycling through
/// `codes`.
pub fn category_bands(rows: usize, cols: usize, codes: &[u8], band_width: usize) -> Vec<u8> {
    let band_width = band_width.max(1);
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows {
        for c in 0..cols {
            data.push(codes[(c / band_width) % codes.len()]);
        }
    }
    data
}

/// Sets the cells within `radius` (Chebyshev, in cells) of `(row, col)` to
/// `missing`.
pub fn punch_hole<T: Copy>(
    data: &mut [T],
    cols: usize,
    center: (usize, usize),
    radius: usize,
    missing: T,
) {
    let rows = data.len() / cols.max(1);
    let (r0, c0) = center;
    for r in r0.saturating_sub(radius)..=(r0 + radius).min(rows.saturating_sub(1)) {
        for c in c0.saturating_sub(radius)..=(c0 + radius).min(cols.saturating_sub(1)) {
            data[r * cols + c] = missing;
        }
    }
}

/// Replaces a deterministic fraction of cells with `missing`.
pub fn scatter_missing<T: Copy>(data: &mut [T], fraction: f64, seed: u64, missing: T) {
    let mut rng = XorShift::new(seed);
    for v in data.iter_mut() {
        if rng.next_f64() < fraction {
            *v = missing;
        }
    }
}

/// Creates `n` pseudo-random `[lat, lon]` points inside the given box.
pub fn scattered_points(
    n: usize,
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    seed: u64,
) -> Vec<[f64; 2]> {
    let mut rng = XorShift::new(seed);
    (0..n)
        .map(|_| {
            let a = rng.next_f64();
            let b = rng.next_f64();
            [
                lat_range.0 + a * (lat_range.1 - lat_range.0),
                lon_range.0 + b * (lon_range.1 - lon_range.0),
            ]
        })
        .collect()
}

/// Small xorshift generator so fixtures need no RNG dependency.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
    }

    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}
