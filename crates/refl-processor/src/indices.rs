//! Band-arithmetic spectral indices.
//!
//! All indices take two same-shaped arrays of any dimensionality and return
//! a new array of that shape. Shapes are checked before any arithmetic.
//! Division by zero and negative radicands are not special-cased: they
//! yield NaN or infinity per IEEE 754.

use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use num_traits::Float;
use refl_common::{ReflError, ReflResult};

fn check_shapes<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> ReflResult<()>
where
    S1: Data,
    S2: Data,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return Err(ReflError::shape_mismatch(a.shape(), b.shape()));
    }
    Ok(())
}

/// `(band1 - band2) / (band1 + band2)`.
pub fn normalized_difference<F, S1, S2, D>(
    band1: &ArrayBase<S1, D>,
    band2: &ArrayBase<S2, D>,
) -> ReflResult<Array<F, D>>
where
    F: Float,
    S1: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: Dimension,
{
    check_shapes(band1, band2)?;
    Ok(Zip::from(band1)
        .and(band2)
        .map_collect(|&a, &b| (a - b) / (a + b)))
}

/// Modified Soil Adjusted Vegetation Index (Qi et al., 1994).
///
/// `nir + 0.5 - 0.5 * sqrt(4 nir^2 - 4 nir + 8 red + 1)`
pub fn modified_soil_adjusted_vegetation_index<F, S1, S2, D>(
    nir: &ArrayBase<S1, D>,
    red: &ArrayBase<S2, D>,
) -> ReflResult<Array<F, D>>
where
    F: Float,
    S1: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: Dimension,
{
    check_shapes(nir, red)?;
    let one = F::one();
    let two = one + one;
    let half = one / two;
    let four = two + two;
    let eight = four + four;
    Ok(Zip::from(nir).and(red).map_collect(|&n, &r| {
        n + half - half * (four * n * n - four * n + eight * r + one).sqrt()
    }))
}

/// Normalized Difference Vegetation Index from near-infrared and red bands.
pub fn ndvi<F, S1, S2, D>(nir: &ArrayBase<S1, D>, red: &ArrayBase<S2, D>) -> ReflResult<Array<F, D>>
where
    F: Float,
    S1: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: Dimension,
{
    normalized_difference(nir, red)
}

/// Normalized Burn Ratio from near-infrared and shortwave-infrared bands.
pub fn nbr<F, S1, S2, D>(nir: &ArrayBase<S1, D>, swir: &ArrayBase<S2, D>) -> ReflResult<Array<F, D>>
where
    F: Float,
    S1: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: Dimension,
{
    normalized_difference(nir, swir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};
    use test_utils::{assert_approx_eq, assert_nan};

    #[test]
    fn test_normalized_difference_values() {
        let a = array![[0.5, 0.2], [0.0, 0.4]];
        let b = array![[0.1, 0.2], [0.0, 0.0]];
        let nd = normalized_difference(&a, &b).unwrap();

        assert_approx_eq!(nd[[0, 0]], 0.4 / 0.6, 1e-12);
        assert_eq!(nd[[0, 1]], 0.0);
        assert_nan!(nd[[1, 0]]);
        assert_eq!(nd[[1, 1]], 1.0);
    }

    #[test]
    fn test_antisymmetric() {
        let a = array![0.8, 0.1, 0.33, -0.2];
        let b = array![0.2, 0.4, 0.33, 0.5];
        let ab = normalized_difference(&a, &b).unwrap();
        let ba = normalized_difference(&b, &a).unwrap();
        for (x, y) in ab.iter().zip(ba.iter()) {
            assert_eq!(*x, -*y);
        }
    }

    #[test]
    fn test_self_difference() {
        let a = array![[0.3, 0.0], [-0.1, 1.0]];
        let nd = normalized_difference(&a, &a).unwrap();
        assert_eq!(nd[[0, 0]], 0.0);
        assert_nan!(nd[[0, 1]]);
        assert_eq!(nd[[1, 0]], 0.0);
        assert_eq!(nd[[1, 1]], 0.0);
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let nd = normalized_difference(&array![0.5], &array![-0.5]).unwrap();
        assert!(nd[0].is_infinite());
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 2));
        let err = normalized_difference(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            ReflError::ShapeMismatch { ref left, ref right } if left == &[2, 3] && right == &[3, 2]
        ));
        assert!(modified_soil_adjusted_vegetation_index(&a, &b).is_err());
    }

    #[test]
    fn test_msavi_reference_values() {
        let nir = array![0.5, 0.0];
        let red = array![0.1, 0.0];
        let msavi = modified_soil_adjusted_vegetation_index(&nir, &red).unwrap();

        // sqrt(1 - 2 + 0.8 + 1) = sqrt(0.8)
        assert_approx_eq!(msavi[0], 1.0 - 0.5 * 0.8_f64.sqrt(), 1e-12);
        assert_eq!(msavi[1], 0.0);
    }

    #[test]
    fn test_msavi_negative_radicand() {
        // 4 - 4 + 8 * -1 + 1 < 0
        let msavi = modified_soil_adjusted_vegetation_index(&array![1.0], &array![-1.0]).unwrap();
        assert_nan!(msavi[0]);
    }

    #[test]
    fn test_f32_and_views() {
        let nir = Array1::<f32>::from(vec![0.6, 0.4]);
        let red = Array1::<f32>::from(vec![0.2, 0.4]);
        let result = ndvi(&nir.view(), &red.view()).unwrap();
        assert!((result[0] - 0.5).abs() < 1e-6);
        assert_eq!(result[1], 0.0);
        assert_eq!(nbr(&nir, &red).unwrap(), result);
    }
}
