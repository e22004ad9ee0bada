//! Common test fixtures for reflectance tests.
//!
//! `SyntheticProduct` describes a small flight line laid out like a real
//! AOP reflectance file. It can be materialized either in memory
//! ([`crate::MemoryContainer::from_product`]) or as an HDF5 file
//! ([`crate::write_product_h5`]).

use ndarray::Array3;

use crate::generators::{create_test_cube, neon_wavelengths};

/// Site code used as the top-level group name.
pub const SITE: &str = "SJER";

/// No-data sentinel of post-2016 products.
pub const NO_DATA_VALUE: f64 = -9999.0;

/// Raw-count divisor of post-2016 products.
pub const SCALE_FACTOR: f64 = 10000.0;

pub const BAND_WINDOW_1: (f64, f64) = (1340.0, 1445.0);
pub const BAND_WINDOW_2: (f64, f64) = (1790.0, 1955.0);

pub const PROJ4: &str = "+proj=UTM +zone=11 +ellps=WGS84 +datum=WGS84 +units=m +no_defs";
pub const EPSG: i32 = 32611;

/// Upper-left corner of the synthetic flight line (UTM 11N meters).
pub const ORIGIN: (f64, f64) = (256000.0, 4112000.0);

/// Build an ENVI map info string for the given origin and pixel size.
pub fn map_info_string(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> String {
    format!(
        "UTM,1.000,1.000,{:.3},{:.3},{},{},11,North,WGS-84,units=Meters,0",
        origin_x, origin_y, pixel_width, pixel_height
    )
}

/// A synthetic reflectance product.
#[derive(Debug, Clone)]
pub struct SyntheticProduct {
    pub site: String,
    /// Raw counts `(rows, cols, bands)`.
    pub raw: Array3<i16>,
    pub wavelengths: Vec<f64>,
    pub no_data_value: f64,
    pub scale_factor: f64,
    pub band_window_1: (f64, f64),
    pub band_window_2: (f64, f64),
    /// Store band windows on the `Reflectance` group instead of the dataset.
    pub band_windows_on_group: bool,
    pub proj4: String,
    /// Stored as text, as the real products do.
    pub epsg: String,
    pub map_info: String,
}

impl SyntheticProduct {
    /// A product with [`create_test_cube`] counts and unit pixels at [`ORIGIN`].
    pub fn new(rows: usize, cols: usize, bands: usize) -> Self {
        Self {
            site: SITE.to_string(),
            raw: create_test_cube(rows, cols, bands),
            wavelengths: neon_wavelengths(bands),
            no_data_value: NO_DATA_VALUE,
            scale_factor: SCALE_FACTOR,
            band_window_1: BAND_WINDOW_1,
            band_window_2: BAND_WINDOW_2,
            band_windows_on_group: false,
            proj4: PROJ4.to_string(),
            epsg: EPSG.to_string(),
            map_info: map_info_string(ORIGIN.0, ORIGIN.1, 1.0, 1.0),
        }
    }

    pub fn with_site(mut self, site: &str) -> Self {
        self.site = site.to_string();
        self
    }

    /// Replace the raw cube; wavelengths are regenerated when the band count changes.
    pub fn with_raw(mut self, raw: Array3<i16>) -> Self {
        let bands = raw.dim().2;
        if bands != self.wavelengths.len() {
            self.wavelengths = neon_wavelengths(bands);
        }
        self.raw = raw;
        self
    }

    pub fn with_wavelengths(mut self, wavelengths: Vec<f64>) -> Self {
        self.wavelengths = wavelengths;
        self
    }

    pub fn with_no_data_value(mut self, value: f64) -> Self {
        self.no_data_value = value;
        self
    }

    pub fn with_scale_factor(mut self, value: f64) -> Self {
        self.scale_factor = value;
        self
    }

    pub fn with_pixel_size(mut self, pixel_width: f64, pixel_height: f64) -> Self {
        self.map_info = map_info_string(ORIGIN.0, ORIGIN.1, pixel_width, pixel_height);
        self
    }

    pub fn with_map_info(mut self, map_info: &str) -> Self {
        self.map_info = map_info.to_string();
        self
    }

    pub fn with_band_windows_on_group(mut self) -> Self {
        self.band_windows_on_group = true;
        self
    }

    /// Write the truncated no-data sentinel into one raw sample.
    pub fn with_no_data_at(mut self, row: usize, col: usize, band: usize) -> Self {
        self.raw[[row, col, band]] = self.no_data_value.trunc() as i16;
        self
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.raw.dim()
    }
}
