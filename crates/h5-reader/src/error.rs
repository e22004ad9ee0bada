//! Error types for HDF5 container access.

use refl_common::ReflError;
use thiserror::Error;

/// Result type for HDF5 reader operations.
pub type H5Result<T> = Result<T, H5Error>;

/// Error types for HDF5 reading.
#[derive(Error, Debug)]
pub enum H5Error {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the HDF5 library
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Object exists but does not have the expected layout
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<H5Error> for ReflError {
    fn from(err: H5Error) -> Self {
        match err {
            H5Error::InvalidFormat(msg) => ReflError::Schema(msg),
            other => ReflError::Container(other.to_string()),
        }
    }
}
