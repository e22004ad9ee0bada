//! HDF5 reader for AOP hyperspectral reflectance products.
//!
//! This crate implements the `refl_common::Container` traits on top of the
//! HDF5 C library (via `hdf5-metno`). It knows nothing about the reflectance
//! schema itself; path conventions live in `refl-processor`.
//!
//! # Implementation Notes
//!
//! - Raw band reads are hyperslab selections, so a single band never pulls
//!   the full `(rows, cols, bands)` cube into memory.
//! - String values come in several encodings depending on the product
//!   generation; see [`value`] for the normalization rules.
//! - HDF5's automatic stderr error printing is disabled on first open.

pub mod container;
pub mod error;
pub mod native;
pub mod value;

pub use container::{H5Bands, H5Container};
pub use error::{H5Error, H5Result};
pub use native::{silence_hdf5_errors, StagedFile};
