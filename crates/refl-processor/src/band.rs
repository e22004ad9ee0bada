//! Single-band extraction: no-data masking and scale correction.

use ndarray::Array2;
use refl_common::{BandSource, Metadata, ReflError, ReflResult};

/// Check that a 1-indexed band number is within `[1, band_count]`.
pub fn validate_band_number(band_number: usize, band_count: usize) -> ReflResult<()> {
    if band_number == 0 || band_number > band_count {
        return Err(ReflError::BandOutOfRange {
            band: band_number,
            band_count,
        });
    }
    Ok(())
}

/// Read one band and convert raw counts to reflectance.
///
/// Samples equal to the truncated no-data value become NaN; the rest are
/// divided by the scale factor. Band numbers are 1-indexed.
pub fn extract_band<B: BandSource + ?Sized>(
    raw: &B,
    metadata: &Metadata,
    band_number: usize,
) -> ReflResult<Array2<f64>> {
    validate_band_number(band_number, metadata.band_count())?;

    tracing::debug!(band = band_number, "Extracting band");
    let band = raw.read_band(band_number - 1)?;
    Ok(clean_band(band, metadata))
}

/// Apply no-data masking and scale correction in place.
pub(crate) fn clean_band(mut band: Array2<f64>, metadata: &Metadata) -> Array2<f64> {
    let sentinel = metadata.no_data_sentinel();
    let scale = metadata.scale_factor;
    band.mapv_inplace(|value| {
        if value == sentinel {
            f64::NAN
        } else {
            value / scale
        }
    });
    band
}
