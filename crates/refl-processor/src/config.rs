//! Configuration for the reflectance processor.

use std::path::Path;

use anyhow::Context;
use refl_common::{BandWindow, Metadata, ReflError, ReflResult};
use serde::{Deserialize, Serialize};

/// Atmospheric water-vapour absorption ranges of the NIS sensor, in nanometers.
pub const WATER_ABSORPTION_WINDOWS: [BandWindow; 2] = [
    BandWindow::new(1340.0, 1445.0),
    BandWindow::new(1790.0, 1955.0),
];

/// Number of samples at the long-wavelength end dominated by sensor noise.
pub const TRAILING_NOISE_SAMPLES: usize = 10;

// ============================================================================
// Spectrum Configuration
// ============================================================================

/// Which parts of a spectrum are masked by the spectrum cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Inclusive wavelength ranges replaced with NaN.
    pub windows: Vec<BandWindow>,

    /// Number of trailing samples always replaced with NaN.
    pub trailing_noise_samples: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            windows: WATER_ABSORPTION_WINDOWS.to_vec(),
            trailing_noise_samples: TRAILING_NOISE_SAMPLES,
        }
    }
}

impl SpectrumConfig {
    /// Use the bad band windows recorded in the product itself.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            windows: metadata.bad_band_windows().to_vec(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ReflResult<()> {
        for window in &self.windows {
            if !window.is_valid() {
                return Err(ReflError::Config(format!(
                    "window [{}, {}] must be finite with start <= end",
                    window.start_nm, window.end_nm
                )));
            }
        }
        Ok(())
    }
}

/// Parse windows written as `"1340-1445,1790-1955"`.
pub fn parse_windows(s: &str) -> Option<Vec<BandWindow>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (start, end) = part.split_once('-')?;
            let start = start.trim().parse().ok()?;
            let end = end.trim().parse().ok()?;
            Some(BandWindow::new(start, end))
        })
        .collect()
}

// ============================================================================
// Stacking Configuration
// ============================================================================

/// What to do when a cleaned band does not match the extent-derived stack shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMismatchPolicy {
    /// Fail the stack with a schema error.
    #[default]
    Fail,
    /// Copy the overlapping region, leave the rest zero and report a diagnostic.
    Warn,
}

impl ShapeMismatchPolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "warn" => Self::Warn,
            _ => Self::Fail,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Warn => "warn",
        }
    }
}

impl std::fmt::Display for ShapeMismatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Processor Configuration
// ============================================================================

/// Configuration for band stacking and spectrum cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub spectrum: SpectrumConfig,

    /// Clean bands on the rayon pool while stacking.
    pub parallel_stack: bool,

    pub shape_mismatch: ShapeMismatchPolicy,
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REFL_WATER_WINDOWS") {
            match parse_windows(&val) {
                Some(windows) => config.spectrum.windows = windows,
                None => tracing::warn!(value = %val, "Ignoring malformed REFL_WATER_WINDOWS"),
            }
        }

        if let Ok(val) = std::env::var("REFL_TRAILING_NOISE_SAMPLES") {
            match val.parse() {
                Ok(count) => config.spectrum.trailing_noise_samples = count,
                Err(_) => {
                    tracing::warn!(value = %val, "Ignoring malformed REFL_TRAILING_NOISE_SAMPLES")
                }
            }
        }

        if let Ok(val) = std::env::var("REFL_PARALLEL_STACK") {
            config.parallel_stack = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("REFL_SHAPE_MISMATCH") {
            config.shape_mismatch = ShapeMismatchPolicy::from_str(&val);
        }

        config
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read processor config {:?}", path))?;
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid YAML in {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid processor config {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ReflResult<()> {
        self.spectrum.validate()
    }
}
