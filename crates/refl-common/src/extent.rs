//! Extent and pixel resolution types.

use serde::{Deserialize, Serialize};

/// Ground sample distance of one pixel, in CRS units (meters for UTM).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl Resolution {
    pub fn new(pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
        }
    }
}

/// Projected bounding box of a flight line, ordered `(xmin, xmax, ymin, ymax)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Derive the extent from the raster's upper-left origin.
    ///
    /// `xmax = xmin + cols * pixel_width` and `ymin = ymax - rows * pixel_height`.
    pub fn from_origin(
        origin_x: f64,
        origin_y: f64,
        res: Resolution,
        rows: usize,
        cols: usize,
    ) -> Self {
        let xmax = origin_x + cols as f64 * res.pixel_width;
        let ymin = origin_y - rows as f64 * res.pixel_height;
        Self::new(origin_x, xmax, ymin, origin_y)
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Extent as the `(xmin, xmax, ymin, ymax)` tuple used by plotting tools.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.xmin, self.xmax, self.ymin, self.ymax)
    }

    /// Check if a point is contained within this extent.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_origin() {
        let extent = Extent::from_origin(
            257000.0,
            4112000.0,
            Resolution::new(1.0, 1.0),
            1000,
            600,
        );
        assert_eq!(extent.xmin, 257000.0);
        assert_eq!(extent.xmax, 257600.0);
        assert_eq!(extent.ymin, 4111000.0);
        assert_eq!(extent.ymax, 4112000.0);
        assert_eq!(extent.width(), 600.0);
        assert_eq!(extent.height(), 1000.0);
    }

    #[test]
    fn test_from_origin_non_unit_pixels() {
        let extent = Extent::from_origin(0.0, 100.0, Resolution::new(2.5, 0.5), 4, 3);
        assert_eq!(extent.as_tuple(), (0.0, 7.5, 98.0, 100.0));
        assert!(extent.contains_point(1.0, 99.0));
        assert!(!extent.contains_point(8.0, 99.0));
    }
}
