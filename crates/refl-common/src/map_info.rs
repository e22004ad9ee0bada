//! ENVI-style map info string parsing.
//!
//! The reflectance product georeferences the raster with a single
//! comma-separated string such as:
//!
//! ```text
//! UTM,1.000,1.000,256000.00,4112000.0,1.000000e+000,1.000000e+000,11,North,WGS-84,units=Meters,0
//! ```
//!
//! Field positions are fixed: 0 projection name, 1-2 reference pixel,
//! 3-4 upper-left origin (x, y), 5-6 pixel width/height, then optional
//! UTM zone, hemisphere and datum.

use serde::{Deserialize, Serialize};

use crate::extent::Resolution;

/// Minimum number of comma-separated fields a usable map info string carries.
pub const MIN_MAP_INFO_FIELDS: usize = 7;

const ORIGIN_X_FIELD: usize = 3;
const ORIGIN_Y_FIELD: usize = 4;
const PIXEL_WIDTH_FIELD: usize = 5;
const PIXEL_HEIGHT_FIELD: usize = 6;

/// Parsed map info record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// The string as stored in the container.
    pub raw: String,
    pub projection_name: String,
    /// Reference pixel (1-based image coordinates), when numeric.
    pub reference_pixel: Option<(f64, f64)>,
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub utm_zone: Option<u8>,
    pub hemisphere: Option<String>,
    pub datum: Option<String>,
}

impl MapInfo {
    /// Parse a map info string.
    ///
    /// A `b'...'` wrapper (the textual form of a byte string) is tolerated.
    pub fn parse(s: &str) -> Result<Self, MapInfoParseError> {
        let body = strip_bytes_repr(s.trim());
        let fields: Vec<&str> = body.split(',').map(str::trim).collect();
        if fields.len() < MIN_MAP_INFO_FIELDS {
            return Err(MapInfoParseError::TooFewFields {
                found: fields.len(),
                expected: MIN_MAP_INFO_FIELDS,
            });
        }

        let number = |index: usize| -> Result<f64, MapInfoParseError> {
            fields[index]
                .parse::<f64>()
                .map_err(|_| MapInfoParseError::InvalidNumber {
                    index,
                    value: fields[index].to_string(),
                })
        };

        let reference_pixel = match (fields[1].parse::<f64>(), fields[2].parse::<f64>()) {
            (Ok(x), Ok(y)) => Some((x, y)),
            _ => None,
        };

        let optional_text = |index: usize| {
            fields
                .get(index)
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string())
        };

        Ok(Self {
            raw: s.to_string(),
            projection_name: fields[0].to_string(),
            reference_pixel,
            origin_x: number(ORIGIN_X_FIELD)?,
            origin_y: number(ORIGIN_Y_FIELD)?,
            pixel_width: number(PIXEL_WIDTH_FIELD)?,
            pixel_height: number(PIXEL_HEIGHT_FIELD)?,
            utm_zone: fields.get(7).and_then(|zone| zone.parse().ok()),
            hemisphere: optional_text(8),
            datum: optional_text(9),
        })
    }

    /// Pixel size carried by the map info.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.pixel_width, self.pixel_height)
    }
}

fn strip_bytes_repr(s: &str) -> &str {
    s.strip_prefix("b'")
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(s)
}

#[derive(Debug, thiserror::Error)]
pub enum MapInfoParseError {
    #[error("map info has {found} comma-separated fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },

    #[error("map info field {index} is not a number: '{value}'")]
    InvalidNumber { index: usize, value: String },
}
