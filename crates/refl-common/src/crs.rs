//! Coordinate reference system as recorded in the reflectance product.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Projection definition and EPSG code of a flight line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    /// Proj4 definition string, e.g. `+proj=UTM +zone=11 +ellps=WGS84 ...`.
    pub proj4: String,
    pub epsg: i32,
}

impl CoordinateSystem {
    pub fn new(proj4: impl Into<String>, epsg: i32) -> Self {
        Self {
            proj4: proj4.into(),
            epsg,
        }
    }

    /// UTM zone declared in the Proj4 string, if any.
    ///
    /// Accepts both `+zone=11` and `+zone=11N` spellings.
    pub fn utm_zone(&self) -> Option<u8> {
        utm_zone_from_proj4(&self.proj4)
    }

    /// Whether the EPSG code falls in the WGS84 / UTM ranges (326xx north, 327xx south).
    pub fn is_wgs84_utm(&self) -> bool {
        (32601..=32660).contains(&self.epsg) || (32701..=32760).contains(&self.epsg)
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Extract the `+zone=` parameter from a Proj4 definition.
pub fn utm_zone_from_proj4(proj4: &str) -> Option<u8> {
    proj4
        .split_whitespace()
        .find_map(|token| token.strip_prefix("+zone="))
        .map(|zone| zone.trim_end_matches(|c: char| c.is_ascii_alphabetic()))
        .and_then(|zone| zone.parse().ok())
}
