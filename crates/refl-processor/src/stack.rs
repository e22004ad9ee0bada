//! Band stacking into georeferenced composites.
//!
//! The output grid is sized from the metadata extent, not from the raw
//! array, so a product whose extent disagrees with its pixel count is
//! detected here. By default that is an error; [`ShapeMismatchPolicy::Warn`]
//! copies the overlapping region instead and reports a [`StackDiagnostic`].

use ndarray::{s, Array2, Array3, ArrayViewMut2, Axis};
use rayon::prelude::*;
use refl_common::{BandSource, Extent, Metadata, ReflError, ReflResult};
use serde::{Deserialize, Serialize};

use crate::band::{clean_band, extract_band, validate_band_number};
use crate::config::{ProcessorConfig, ShapeMismatchPolicy};

/// A cleaned band that did not match the stack grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StackDiagnostic {
    /// 1-indexed band number as requested.
    pub band: usize,
    /// Position of the band in the stack.
    pub slot: usize,
    /// `(rows, cols)` of the cleaned band.
    pub band_shape: (usize, usize),
    /// `(rows, cols)` of the stack derived from the extent.
    pub stack_shape: (usize, usize),
}

/// A stacked array with the georeferencing needed to place it on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    /// `(rows, cols, bands.len())` reflectance values.
    pub data: Array3<f64>,
    /// 1-indexed band numbers in stack order.
    pub bands: Vec<usize>,
    /// One label per slot, `b{band}`.
    pub labels: Vec<String>,
    pub extent: Extent,
    pub epsg: i32,
}

impl Composite {
    /// Slot holding the first occurrence of `band`.
    pub fn slot_of(&self, band: usize) -> Option<usize> {
        self.bands.iter().position(|&b| b == band)
    }
}

/// Label of a band in a composite.
pub fn band_label(band: usize) -> String {
    format!("b{}", band)
}

/// `(rows, cols)` of the stack grid: the truncated extent height and width.
pub fn stack_dimensions(extent: &Extent) -> ReflResult<(usize, usize)> {
    let rows = extent.height().trunc();
    let cols = extent.width().trunc();
    for (name, value) in [("height", rows), ("width", cols)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ReflError::schema(format!(
                "extent {} {} cannot size a stack",
                name, value
            )));
        }
    }
    Ok((rows as usize, cols as usize))
}

/// Stack bands with the default configuration.
pub fn stack<B: BandSource + ?Sized>(
    raw: &B,
    metadata: &Metadata,
    bands: &[usize],
) -> ReflResult<Array3<f64>> {
    stack_with(raw, metadata, bands, &ProcessorConfig::default(), |_| {})
}

/// Stack bands into a `(rows, cols, bands.len())` array.
///
/// Every band number is validated before any pixel is read. `on_mismatch`
/// is called for each band copied under [`ShapeMismatchPolicy::Warn`].
pub fn stack_with<B, F>(
    raw: &B,
    metadata: &Metadata,
    bands: &[usize],
    config: &ProcessorConfig,
    mut on_mismatch: F,
) -> ReflResult<Array3<f64>>
where
    B: BandSource + ?Sized,
    F: FnMut(&StackDiagnostic),
{
    for &band in bands {
        validate_band_number(band, metadata.band_count())?;
    }

    let (rows, cols) = stack_dimensions(&metadata.extent)?;
    check_grid(rows, cols, bands.len(), metadata, config.shape_mismatch)?;
    let mut out = Array3::<f64>::zeros((rows, cols, bands.len()));

    tracing::debug!(
        bands = bands.len(),
        rows,
        cols,
        parallel = config.parallel_stack,
        "Stacking bands"
    );

    if config.parallel_stack {
        // Container handles are not shared across threads: read sequentially,
        // clean and place in parallel.
        let slices = bands
            .iter()
            .map(|&band| raw.read_band(band - 1))
            .collect::<ReflResult<Vec<_>>>()?;

        let placed: Vec<Option<StackDiagnostic>> = out
            .axis_iter_mut(Axis(2))
            .into_par_iter()
            .zip(slices.into_par_iter())
            .zip(bands.par_iter().enumerate())
            .map(|((slot_view, slice), (slot, &band))| {
                let cleaned = clean_band(slice, metadata);
                place(slot_view, &cleaned, band, slot, config.shape_mismatch)
            })
            .collect::<ReflResult<_>>()?;

        for diagnostic in placed.iter().flatten() {
            report(diagnostic, &mut on_mismatch);
        }
    } else {
        for (slot, &band) in bands.iter().enumerate() {
            let cleaned = extract_band(raw, metadata, band)?;
            let slot_view = out.index_axis_mut(Axis(2), slot);
            if let Some(diagnostic) = place(slot_view, &cleaned, band, slot, config.shape_mismatch)? {
                report(&diagnostic, &mut on_mismatch);
            }
        }
    }

    Ok(out)
}

/// Stack bands and attach labels and georeferencing.
pub fn stack_composite<B, F>(
    raw: &B,
    metadata: &Metadata,
    bands: &[usize],
    config: &ProcessorConfig,
    on_mismatch: F,
) -> ReflResult<Composite>
where
    B: BandSource + ?Sized,
    F: FnMut(&StackDiagnostic),
{
    let data = stack_with(raw, metadata, bands, config, on_mismatch)?;
    Ok(Composite {
        data,
        bands: bands.to_vec(),
        labels: bands.iter().map(|&band| band_label(band)).collect(),
        extent: metadata.extent,
        epsg: metadata.epsg,
    })
}

/// Reject a stack grid before it is allocated.
///
/// Under `Fail` the grid must equal the raw spatial shape. Under `Warn` it
/// only has to be addressable.
fn check_grid(
    rows: usize,
    cols: usize,
    slots: usize,
    metadata: &Metadata,
    policy: ShapeMismatchPolicy,
) -> ReflResult<()> {
    let raw_shape = (metadata.rows(), metadata.cols());
    match policy {
        ShapeMismatchPolicy::Fail if (rows, cols) != raw_shape => Err(ReflError::schema(format!(
            "raw bands have shape {:?} but the extent implies {:?}",
            raw_shape,
            (rows, cols)
        ))),
        ShapeMismatchPolicy::Fail => Ok(()),
        ShapeMismatchPolicy::Warn => {
            let bytes = rows
                .checked_mul(cols)
                .and_then(|n| n.checked_mul(slots.max(1)))
                .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
                .filter(|&bytes| bytes <= isize::MAX as usize);
            match bytes {
                Some(_) => Ok(()),
                None => Err(ReflError::schema(format!(
                    "extent implies a {} x {} x {} stack, too large to allocate",
                    rows, cols, slots
                ))),
            }
        }
    }
}

/// Copy a cleaned band into its slot, applying the mismatch policy.
fn place(
    mut slot_view: ArrayViewMut2<'_, f64>,
    cleaned: &Array2<f64>,
    band: usize,
    slot: usize,
    policy: ShapeMismatchPolicy,
) -> ReflResult<Option<StackDiagnostic>> {
    let stack_shape = slot_view.dim();
    let band_shape = cleaned.dim();

    if band_shape == stack_shape {
        slot_view.assign(cleaned);
        return Ok(None);
    }

    match policy {
        ShapeMismatchPolicy::Fail => Err(ReflError::schema(format!(
            "band {} has shape {:?} but the extent implies {:?}",
            band, band_shape, stack_shape
        ))),
        ShapeMismatchPolicy::Warn => {
            let rows = band_shape.0.min(stack_shape.0);
            let cols = band_shape.1.min(stack_shape.1);
            slot_view
                .slice_mut(s![..rows, ..cols])
                .assign(&cleaned.slice(s![..rows, ..cols]));
            Ok(Some(StackDiagnostic {
                band,
                slot,
                band_shape,
                stack_shape,
            }))
        }
    }
}

fn report<F: FnMut(&StackDiagnostic)>(diagnostic: &StackDiagnostic, on_mismatch: &mut F) {
    tracing::warn!(
        band = diagnostic.band,
        slot = diagnostic.slot,
        band_shape = ?diagnostic.band_shape,
        stack_shape = ?diagnostic.stack_shape,
        "Band shape differs from extent; copied overlapping region"
    );
    on_mismatch(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{MemoryContainer, SyntheticProduct};

    fn extract(product: &SyntheticProduct) -> (test_utils::MemoryBands, Metadata) {
        crate::metadata::extract(&MemoryContainer::from_product(product)).unwrap()
    }

    #[test]
    fn test_stack_dimensions_truncate() {
        let extent = Extent::new(0.0, 3.9, 10.0, 12.5);
        assert_eq!(stack_dimensions(&extent).unwrap(), (2, 3));
    }

    #[test]
    fn test_stack_dimensions_reject_negative() {
        let extent = Extent::new(5.0, 3.0, 0.0, 1.0);
        assert!(stack_dimensions(&extent).unwrap_err().is_schema());
        let extent = Extent::new(0.0, f64::INFINITY, 0.0, 1.0);
        assert!(stack_dimensions(&extent).is_err());
    }

    #[test]
    fn test_slots_match_extracted_bands() {
        let (raw, metadata) = extract(&SyntheticProduct::new(3, 2, 4));
        let stacked = stack(&raw, &metadata, &[4, 1, 4]).unwrap();
        assert_eq!(stacked.dim(), (3, 2, 3));

        for (slot, band) in [4, 1, 4].into_iter().enumerate() {
            let expected = extract_band(&raw, &metadata, band).unwrap();
            assert_eq!(stacked.index_axis(Axis(2), slot), expected);
        }
    }

    #[test]
    fn test_empty_band_list() {
        let (raw, metadata) = extract(&SyntheticProduct::new(2, 2, 2));
        assert_eq!(stack(&raw, &metadata, &[]).unwrap().dim(), (2, 2, 0));
    }

    #[test]
    fn test_invalid_band_fails_before_reading() {
        let container = MemoryContainer::from_product(&SyntheticProduct::new(2, 2, 3));
        let (raw, metadata) = crate::metadata::extract(&container).unwrap();
        let err = stack(&raw, &metadata, &[1, 2, 9]).unwrap_err();
        assert!(matches!(err, ReflError::BandOutOfRange { band: 9, .. }));
        assert_eq!(container.band_reads(), 0);
    }

    #[test]
    fn test_mismatch_fails_by_default() {
        // 2 m pixels: the extent is twice the pixel grid
        let (raw, metadata) = extract(&SyntheticProduct::new(2, 2, 1).with_pixel_size(2.0, 2.0));
        let err = stack(&raw, &metadata, &[1]).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("(2, 2)"));
        assert!(err.to_string().contains("(4, 4)"));
    }

    #[test]
    fn test_mismatch_warn_copies_overlap() {
        let (raw, metadata) = extract(&SyntheticProduct::new(2, 2, 1).with_pixel_size(2.0, 2.0));
        let config = ProcessorConfig {
            shape_mismatch: ShapeMismatchPolicy::Warn,
            ..ProcessorConfig::default()
        };

        let mut diagnostics = Vec::new();
        let stacked =
            stack_with(&raw, &metadata, &[1], &config, |d| diagnostics.push(d.clone())).unwrap();

        assert_eq!(stacked.dim(), (4, 4, 1));
        assert_eq!(stacked[[1, 1, 0]], 0.0111);
        assert_eq!(stacked[[3, 3, 0]], 0.0);
        assert_eq!(
            diagnostics,
            vec![StackDiagnostic {
                band: 1,
                slot: 0,
                band_shape: (2, 2),
                stack_shape: (4, 4),
            }]
        );
    }

    #[test]
    fn test_huge_pixel_size_rejected_before_allocating() {
        let product = SyntheticProduct::new(2, 2, 1).with_pixel_size(1e12, 1e12);
        let container = MemoryContainer::from_product(&product);
        let (raw, metadata) = crate::metadata::extract(&container).unwrap();

        let err = stack(&raw, &metadata, &[1]).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("(2, 2)"));
        assert_eq!(container.band_reads(), 0);

        let config = ProcessorConfig {
            shape_mismatch: ShapeMismatchPolicy::Warn,
            ..ProcessorConfig::default()
        };
        let err = stack_with(&raw, &metadata, &[1], &config, |_| {}).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("too large"));
        assert_eq!(container.band_reads(), 0);
    }

    #[test]
    fn test_sub_unit_pixels_rejected() {
        let (raw, metadata) = extract(&SyntheticProduct::new(2, 2, 1).with_pixel_size(0.1, 0.1));
        let err = stack(&raw, &metadata, &[1]).unwrap_err();
        assert!(err.to_string().contains("(0, 0)"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let product = SyntheticProduct::new(4, 5, 6).with_no_data_at(2, 3, 1);
        let (raw, metadata) = extract(&product);
        let bands = [6, 2, 2, 1, 5];

        let sequential = stack(&raw, &metadata, &bands).unwrap();
        let config = ProcessorConfig {
            parallel_stack: true,
            ..ProcessorConfig::default()
        };
        let parallel = stack_with(&raw, &metadata, &bands, &config, |_| {}).unwrap();

        assert_eq!(sequential.dim(), parallel.dim());
        for (a, b) in sequential.iter().zip(parallel.iter()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn test_composite_labels() {
        let (raw, metadata) = extract(&SyntheticProduct::new(2, 2, 3));
        let composite =
            stack_composite(&raw, &metadata, &[3, 1], &ProcessorConfig::default(), |_| {})
                .unwrap();
        assert_eq!(composite.labels, vec!["b3", "b1"]);
        assert_eq!(composite.slot_of(1), Some(1));
        assert_eq!(composite.epsg, 32611);
        assert_eq!(composite.extent, metadata.extent);
    }
}
