//! Test data generators for synthetic reflectance cubes and spectra.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use ndarray::Array3;

/// First band centre of the NIS sensor, in nanometers.
pub const FIRST_WAVELENGTH_NM: f64 = 381.0;

/// Approximate spacing between adjacent NIS bands, in nanometers.
pub const WAVELENGTH_STEP_NM: f64 = 5.0;

/// Creates a raw cube with predictable counts.
///
/// Each sample is `row * 100 + col * 10 + band + 1`, so values are unique
/// when `cols` and `bands` are below 10 and `rows` below 300.
///
/// # Example
///
/// ```
/// use test_utils::create_test_cube;
///
/// let cube = create_test_cube(2, 3, 4);
/// assert_eq!(cube.dim(), (2, 3, 4));
/// assert_eq!(cube[[0, 0, 0]], 1);
/// assert_eq!(cube[[1, 2, 3]], 124);
/// ```
pub fn create_test_cube(rows: usize, cols: usize, bands: usize) -> Array3<i16> {
    Array3::from_shape_fn((rows, cols, bands), |(row, col, band)| {
        (row * 100 + col * 10 + band + 1) as i16
    })
}

/// Evenly spaced band centres starting at 381 nm, like the NIS sensor.
pub fn neon_wavelengths(bands: usize) -> Vec<f64> {
    (0..bands)
        .map(|i| FIRST_WAVELENGTH_NM + i as f64 * WAVELENGTH_STEP_NM)
        .collect()
}

/// Raw counts (scale factor 10000) of a green-vegetation spectrum.
///
/// Low red, high near-infrared, moderate shortwave-infrared. Brightness
/// grows slightly with column so pixels are distinguishable.
pub fn vegetation_counts(wavelength_nm: f64, col: usize) -> i16 {
    let base: i16 = if (620.0..=700.0).contains(&wavelength_nm) {
        400
    } else if (750.0..=1300.0).contains(&wavelength_nm) {
        4500
    } else if wavelength_nm > 1300.0 {
        2000
    } else {
        800
    };
    base + (col as i16) * 10
}

/// Creates a cube whose every pixel carries a vegetation spectrum.
pub fn create_vegetation_cube(rows: usize, cols: usize, wavelengths: &[f64]) -> Array3<i16> {
    Array3::from_shape_fn((rows, cols, wavelengths.len()), |(_, col, band)| {
        vegetation_counts(wavelengths[band], col)
    })
}
