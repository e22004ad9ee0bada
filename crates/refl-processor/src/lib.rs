//! Reflectance processing for NEON AOP hyperspectral products.
//!
//! Turns a hierarchical reflectance container into calibrated, georeferenced
//! arrays:
//!
//! - **Metadata extraction**: discover the site group and read calibration,
//!   spectral and georeferencing values into a typed [`Metadata`] record
//! - **Band extraction**: no-data masking and scale correction of one band
//! - **Stacking**: several bands on the extent-derived grid
//! - **Spectrum cleaning**: water-absorption and sensor-edge masking
//! - **Indices**: normalized difference (NDVI, NBR) and MSAVI
//!
//! # Architecture
//!
//! ```text
//! Container (HDF5 file or in-memory)
//!      │
//!      ▼
//! metadata::extract ──► (raw band handle, Metadata)
//!      │
//!      ├─► band::extract_band      ──► Array2<f64>
//!      │
//!      ├─► stack::stack_with       ──► Array3<f64> / Composite
//!      │
//!      └─► spectrum::clean_spectrum on Metadata.wavelength
//!
//! indices::* on extracted bands
//! ```
//!
//! # Example
//!
//! ```ignore
//! use refl_processor::ReflectanceDataset;
//!
//! let ndvi = ReflectanceDataset::with_hdf5("NEON_D17_SJER_DP1_reflectance.h5", |ds| {
//!     ds.normalized_difference_at(860.0, 650.0)
//! })?;
//! ```

pub mod band;
pub mod config;
pub mod dataset;
pub mod indices;
pub mod metadata;
pub mod spectrum;
pub mod stack;

// Re-export commonly used types at crate root
pub use band::{extract_band, validate_band_number};
pub use config::{
    ProcessorConfig, ShapeMismatchPolicy, SpectrumConfig, TRAILING_NOISE_SAMPLES,
    WATER_ABSORPTION_WINDOWS,
};
pub use dataset::ReflectanceDataset;
pub use indices::{modified_soil_adjusted_vegetation_index, nbr, ndvi, normalized_difference};
pub use metadata::{discover_site, extract};
pub use refl_common::{Metadata, ReflError, ReflResult};
pub use spectrum::{clean_spectrum, clean_spectrum_with, valid_band_numbers};
pub use stack::{band_label, stack, stack_composite, stack_with, Composite, StackDiagnostic};
