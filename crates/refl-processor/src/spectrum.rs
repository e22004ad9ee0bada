//! Spectrum cleaning: masking water-absorption ranges and sensor-edge noise.

use crate::config::SpectrumConfig;

/// Clean a wavelength-indexed series with the default water-absorption windows.
pub fn clean_spectrum(values: &[f64]) -> Vec<f64> {
    clean_spectrum_with(values, &SpectrumConfig::default())
}

/// Return a copy of `values` with masked samples replaced by NaN.
///
/// A value is masked when it falls inside any configured window (inclusive)
/// or is among the last `trailing_noise_samples` elements.
pub fn clean_spectrum_with(values: &[f64], config: &SpectrumConfig) -> Vec<f64> {
    let keep = values.len().saturating_sub(config.trailing_noise_samples);
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i >= keep || config.windows.iter().any(|w| w.contains(value)) {
                f64::NAN
            } else {
                value
            }
        })
        .collect()
}

/// 1-indexed bands whose wavelength survives cleaning.
pub fn valid_band_numbers(wavelengths: &[f64], config: &SpectrumConfig) -> Vec<usize> {
    clean_spectrum_with(wavelengths, config)
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .map(|(index, _)| index + 1)
        .collect()
}
