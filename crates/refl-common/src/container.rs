//! Access traits for hierarchical containers holding reflectance data.
//!
//! Paths are `/`-separated and relative to the container root, e.g.
//! `SJER/Reflectance/Metadata/Spectral_Data/Wavelength`. Implementations
//! report absence as `Ok(None)` so the extractor can name the missing field;
//! `Err` is reserved for backend failures.

use ndarray::Array2;

use crate::error::ReflResult;
use crate::value::AttrValue;

/// Lazy, read-only view of a `(rows, cols, bands)` raw reflectance cube.
///
/// Reading one band must not materialize the whole cube.
pub trait BandSource {
    /// `(rows, cols, band_count)`.
    fn shape(&self) -> (usize, usize, usize);

    /// Read the band at zero-based `index` as floating point.
    ///
    /// Callers validate `index` against `shape()` first.
    fn read_band(&self, index: usize) -> ReflResult<Array2<f64>>;
}

impl<T: BandSource + ?Sized> BandSource for &T {
    fn shape(&self) -> (usize, usize, usize) {
        (**self).shape()
    }

    fn read_band(&self, index: usize) -> ReflResult<Array2<f64>> {
        (**self).read_band(index)
    }
}

/// A readable hierarchical container (an HDF5 file, or an in-memory stand-in).
pub trait Container {
    type Bands: BandSource;

    /// Names of the groups directly under the root, in container order.
    fn top_level_groups(&self) -> ReflResult<Vec<String>>;

    /// Open the 3-D raw array at `path`.
    ///
    /// Returns `Ok(None)` when nothing exists there. A dataset that is not
    /// 3-D is a schema error.
    fn open_bands(&self, path: &str) -> ReflResult<Option<Self::Bands>>;

    /// Attribute `name` attached to the group or dataset at `path`.
    fn attribute(&self, path: &str, name: &str) -> ReflResult<Option<AttrValue>>;

    /// Contents of the scalar or 1-D dataset at `path`.
    fn read_value(&self, path: &str) -> ReflResult<Option<AttrValue>>;
}
