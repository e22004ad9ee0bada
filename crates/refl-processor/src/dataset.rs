//! Scoped access to one opened reflectance product.

use ndarray::{Array2, Array3};
use refl_common::{Container, Metadata, ReflError, ReflResult};

use crate::band::extract_band;
use crate::config::ProcessorConfig;
use crate::indices::normalized_difference;
use crate::metadata::extract;
use crate::spectrum::{clean_spectrum_with, valid_band_numbers};
use crate::stack::{stack_composite, stack_with, Composite, StackDiagnostic};

#[cfg(feature = "hdf5")]
use h5_reader::H5Container;

/// An opened product: its container, metadata and raw band handle.
///
/// Dropping the dataset releases the raw handle and then the container,
/// which closes the underlying file. This holds on every exit path,
/// including a failed extraction in [`ReflectanceDataset::with_config`].
pub struct ReflectanceDataset<C: Container> {
    // Field order is drop order: the band handle goes before its container.
    raw: C::Bands,
    metadata: Metadata,
    config: ProcessorConfig,
    container: C,
}

impl<C: Container> ReflectanceDataset<C> {
    /// Extract metadata from `container` with the default configuration.
    pub fn new(container: C) -> ReflResult<Self> {
        Self::with_config(container, ProcessorConfig::default())
    }

    pub fn with_config(container: C, config: ProcessorConfig) -> ReflResult<Self> {
        config.validate()?;
        let (raw, metadata) = extract(&container)?;
        Ok(Self {
            raw,
            metadata,
            config,
            container,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Lazy handle to the raw `(rows, cols, bands)` array.
    pub fn raw(&self) -> &C::Bands {
        &self.raw
    }

    /// Reflectance of one 1-indexed band.
    pub fn band(&self, band_number: usize) -> ReflResult<Array2<f64>> {
        extract_band(&self.raw, &self.metadata, band_number)
    }

    /// Stack bands using the dataset's configuration.
    pub fn stack(&self, bands: &[usize]) -> ReflResult<Array3<f64>> {
        stack_with(&self.raw, &self.metadata, bands, &self.config, |_| {})
    }

    /// Stack bands, reporting each band copied despite a shape mismatch.
    pub fn stack_with_diagnostics<F>(&self, bands: &[usize], on_mismatch: F) -> ReflResult<Array3<f64>>
    where
        F: FnMut(&StackDiagnostic),
    {
        stack_with(&self.raw, &self.metadata, bands, &self.config, on_mismatch)
    }

    pub fn composite(&self, bands: &[usize]) -> ReflResult<Composite> {
        stack_composite(&self.raw, &self.metadata, bands, &self.config, |_| {})
    }

    /// The product's wavelengths with absorption and noise samples masked.
    pub fn clean_wavelengths(&self) -> Vec<f64> {
        clean_spectrum_with(&self.metadata.wavelength, &self.config.spectrum)
    }

    /// 1-indexed bands that survive spectrum cleaning.
    pub fn valid_bands(&self) -> Vec<usize> {
        valid_band_numbers(&self.metadata.wavelength, &self.config.spectrum)
    }

    /// 1-indexed band closest to a wavelength.
    pub fn band_near(&self, wavelength_nm: f64) -> ReflResult<usize> {
        self.metadata.nearest_band(wavelength_nm).ok_or_else(|| {
            ReflError::schema(format!("no band near {} nm in an empty spectrum", wavelength_nm))
        })
    }

    /// Normalized difference of the bands nearest two wavelengths.
    pub fn normalized_difference_at(&self, first_nm: f64, second_nm: f64) -> ReflResult<Array2<f64>> {
        let first = self.band(self.band_near(first_nm)?)?;
        let second = self.band(self.band_near(second_nm)?)?;
        normalized_difference(&first, &second)
    }
}

impl<C: Container> std::fmt::Debug for ReflectanceDataset<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectanceDataset")
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "hdf5")]
impl ReflectanceDataset<H5Container> {
    /// Open an HDF5 product and extract its metadata.
    pub fn open_hdf5(path: impl AsRef<std::path::Path>) -> ReflResult<Self> {
        Self::open_hdf5_with_config(path, ProcessorConfig::default())
    }

    pub fn open_hdf5_with_config(
        path: impl AsRef<std::path::Path>,
        config: ProcessorConfig,
    ) -> ReflResult<Self> {
        let container = H5Container::open(path)?;
        Self::with_config(container, config)
    }

    /// Run `f` against an opened product; the file is closed when `f` returns.
    pub fn with_hdf5<T, F>(path: impl AsRef<std::path::Path>, f: F) -> ReflResult<T>
    where
        F: FnOnce(&Self) -> ReflResult<T>,
    {
        let dataset = Self::open_hdf5(path)?;
        f(&dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeMismatchPolicy;
    use test_utils::{create_vegetation_cube, neon_wavelengths, MemoryContainer, SyntheticProduct};

    fn dataset(product: &SyntheticProduct) -> ReflectanceDataset<MemoryContainer> {
        ReflectanceDataset::new(MemoryContainer::from_product(product)).unwrap()
    }

    #[test]
    fn test_band_and_stack() {
        let ds = dataset(&SyntheticProduct::new(2, 2, 3));
        assert_eq!(ds.metadata().site, "SJER");
        assert_eq!(ds.band(2).unwrap()[[0, 0]], 0.0002);
        assert_eq!(ds.stack(&[1, 3]).unwrap().dim(), (2, 2, 2));
        assert_eq!(ds.composite(&[2]).unwrap().labels, vec!["b2"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ProcessorConfig::default();
        config.spectrum.windows[0] = refl_common::BandWindow::new(10.0, 5.0);
        let result = ReflectanceDataset::with_config(
            MemoryContainer::from_product(&SyntheticProduct::new(1, 1, 1)),
            config,
        );
        assert!(matches!(result, Err(ReflError::Config(_))));
    }

    #[test]
    fn test_diagnostics_reported() {
        let product = SyntheticProduct::new(2, 2, 1).with_pixel_size(1.0, 2.0);
        let config = ProcessorConfig {
            shape_mismatch: ShapeMismatchPolicy::Warn,
            ..ProcessorConfig::default()
        };
        let ds = ReflectanceDataset::with_config(MemoryContainer::from_product(&product), config)
            .unwrap();

        let mut seen = 0;
        let stacked = ds.stack_with_diagnostics(&[1], |_| seen += 1).unwrap();
        assert_eq!(stacked.dim(), (4, 2, 1));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_vegetation_ndvi() {
        let wavelengths = neon_wavelengths(426);
        let product = SyntheticProduct::new(2, 2, 426)
            .with_raw(create_vegetation_cube(2, 2, &wavelengths));
        let ds = dataset(&product);

        let ndvi = ds.normalized_difference_at(860.0, 650.0).unwrap();
        assert_eq!(ndvi.dim(), (2, 2));
        // (4500 - 400) / (4500 + 400)
        assert!((ndvi[[0, 0]] - 4100.0 / 4900.0).abs() < 1e-12);
        assert!(ndvi.iter().all(|v| *v > 0.8));
    }

    #[test]
    fn test_clean_wavelengths_and_valid_bands() {
        let ds = dataset(&SyntheticProduct::new(1, 1, 426));
        let cleaned = ds.clean_wavelengths();
        assert_eq!(cleaned.len(), 426);
        assert!(cleaned[425].is_nan());

        let valid = ds.valid_bands();
        let kept = cleaned.iter().filter(|v| !v.is_nan()).count();
        assert_eq!(valid.len(), kept);
    }

    #[test]
    fn test_extraction_failure_releases_container() {
        let mut container = MemoryContainer::from_product(&SyntheticProduct::new(1, 1, 1));
        container.remove("SJER/Reflectance/Metadata");
        let tracker = container.handle_tracker();

        // The raw handle is opened during discovery, before the failure
        assert!(ReflectanceDataset::new(container).unwrap_err().is_schema());
        assert_eq!(tracker.live_handles(), 0);
    }

    #[test]
    fn test_drop_releases_container_and_bands() {
        let container = MemoryContainer::from_product(&SyntheticProduct::new(2, 2, 2));
        let tracker = container.handle_tracker();

        let ds = ReflectanceDataset::new(container).unwrap();
        ds.stack(&[1, 2]).unwrap();
        assert_eq!(tracker.live_handles(), 2);

        drop(ds);
        assert_eq!(tracker.live_handles(), 0);
    }
}
