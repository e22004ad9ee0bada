//! Shared test utilities for the reflectance workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory container that mimics the reflectance file layout
//! - A writer producing the same layout as a real HDF5 file
//! - Synthetic cube and spectrum generators
//! - Float assertion and skip macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod h5;
pub mod memory;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use h5::{write_product_h5, StringEncoding};
pub use memory::{HandleTracker, MemoryBands, MemoryContainer};
pub use paths::*;

/// Install a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`. Safe to call from every test.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Macro to skip a test if the required file is not found.
///
/// Useful for tests against real flight-line products, which are not
/// committed to the repository.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_real_product() {
///     let path = require_test_file!("NEON_D17_SJER_DP1_20210402_reflectance.h5");
///     // Test code using path...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a float is NaN.
#[macro_export]
macro_rules! assert_nan {
    ($value:expr) => {{
        let value: f64 = $value as f64;
        if !value.is_nan() {
            panic!("assertion failed: expected NaN, got `{:?}`", value);
        }
    }};
}
