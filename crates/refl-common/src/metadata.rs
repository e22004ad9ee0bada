//! Typed metadata record of a reflectance flight line.

use serde::{Deserialize, Serialize};

use crate::crs::CoordinateSystem;
use crate::error::ReflResult;
use crate::extent::{Extent, Resolution};
use crate::map_info::MapInfo;

/// An inclusive wavelength range in nanometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandWindow {
    pub start_nm: f64,
    pub end_nm: f64,
}

impl BandWindow {
    pub const fn new(start_nm: f64, end_nm: f64) -> Self {
        Self { start_nm, end_nm }
    }

    /// Inclusive containment test. NaN is never contained.
    pub fn contains(&self, wavelength_nm: f64) -> bool {
        wavelength_nm >= self.start_nm && wavelength_nm <= self.end_nm
    }

    /// Whether the bounds are finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.start_nm.is_finite() && self.end_nm.is_finite() && self.start_nm <= self.end_nm
    }
}

impl From<(f64, f64)> for BandWindow {
    fn from((start_nm, end_nm): (f64, f64)) -> Self {
        Self::new(start_nm, end_nm)
    }
}

/// Calibration and georeferencing metadata of one reflectance dataset.
///
/// Produced once when the container is opened and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Name of the top-level group the data lives under (the site code).
    pub site: String,
    /// `(rows, cols, band_count)` of the raw reflectance array.
    pub shape: (usize, usize, usize),
    /// Centre wavelength of each band in nanometers.
    pub wavelength: Vec<f64>,
    pub no_data_value: f64,
    pub scale_factor: f64,
    pub bad_band_window1: BandWindow,
    pub bad_band_window2: BandWindow,
    /// Proj4 projection definition.
    pub projection: String,
    pub epsg: i32,
    pub res: Resolution,
    pub extent: Extent,
    pub map_info: MapInfo,
}

impl Metadata {
    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    pub fn band_count(&self) -> usize {
        self.shape.2
    }

    /// The no-data sentinel as compared against raw samples: truncated to an integer.
    pub fn no_data_sentinel(&self) -> f64 {
        self.no_data_value.trunc()
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::new(self.projection.clone(), self.epsg)
    }

    /// Both vendor-flagged bad band windows.
    pub fn bad_band_windows(&self) -> [BandWindow; 2] {
        [self.bad_band_window1, self.bad_band_window2]
    }

    /// Wavelength of a 1-indexed band, if it exists.
    pub fn band_wavelength(&self, band_number: usize) -> Option<f64> {
        band_number
            .checked_sub(1)
            .and_then(|index| self.wavelength.get(index))
            .copied()
    }

    /// 1-indexed band whose centre wavelength is closest to `wavelength_nm`.
    pub fn nearest_band(&self, wavelength_nm: f64) -> Option<usize> {
        self.wavelength
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.is_nan())
            .min_by(|(_, a), (_, b)| {
                (*a - wavelength_nm)
                    .abs()
                    .total_cmp(&(*b - wavelength_nm).abs())
            })
            .map(|(index, _)| index + 1)
    }

    /// Serialize the record as pretty-printed JSON.
    pub fn to_json(&self) -> ReflResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Metadata {
        let map_info = MapInfo::parse("UTM,1.000,1.000,100.0,200.0,1.0,1.0,11,North,WGS-84").unwrap();
        Metadata {
            site: "SJER".to_string(),
            shape: (2, 3, 4),
            wavelength: vec![400.0, 500.0, 600.0, 700.0],
            no_data_value: -9999.0,
            scale_factor: 10000.0,
            bad_band_window1: BandWindow::new(1340.0, 1445.0),
            bad_band_window2: BandWindow::new(1790.0, 1955.0),
            projection: "+proj=UTM +zone=11".to_string(),
            epsg: 32611,
            res: map_info.resolution(),
            extent: Extent::from_origin(100.0, 200.0, map_info.resolution(), 2, 3),
            map_info,
        }
    }

    #[test]
    fn test_band_window_contains_inclusive() {
        let window = BandWindow::new(1340.0, 1445.0);
        assert!(window.contains(1340.0));
        assert!(window.contains(1445.0));
        assert!(!window.contains(1339.99));
        assert!(!window.contains(f64::NAN));
        assert!(window.is_valid());
        assert!(!BandWindow::new(10.0, 5.0).is_valid());
    }

    #[test]
    fn test_band_lookup() {
        let meta = sample_metadata();
        assert_eq!(meta.band_count(), 4);
        assert_eq!(meta.band_wavelength(1), Some(400.0));
        assert_eq!(meta.band_wavelength(4), Some(700.0));
        assert_eq!(meta.band_wavelength(0), None);
        assert_eq!(meta.band_wavelength(5), None);
        assert_eq!(meta.nearest_band(640.0), Some(3));
    }

    #[test]
    fn test_no_data_sentinel_truncates() {
        let mut meta = sample_metadata();
        meta.no_data_value = -9999.7;
        assert_eq!(meta.no_data_sentinel(), -9999.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let meta = sample_metadata();
        let json = meta.to_json().unwrap();
        let parsed: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }
}
