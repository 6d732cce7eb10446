//! Gaussian kernel smoothing that skips missing values.
//!
//! The filter runs over the *dense run* of a sequence (its present values in
//! order, treated as evenly spaced) and scatters the results back, so gaps in
//! the input stay gaps in the output.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SmoothError};
use crate::sequence::LabeledSequence;

/// Kernel half-width in units of sigma.
pub const TRUNCATE: f64 = 4.0;

/// Largest kernel radius accepted; wider kernels fail with `InvalidSigma`.
pub const MAX_KERNEL_RADIUS: usize = 1 << 20;

/// Kernel radius for a given spread: `floor(TRUNCATE * sigma + 0.5)`.
pub fn kernel_radius(sigma: f64) -> usize {
    (TRUNCATE * sigma + 0.5) as usize
}

/// Sampled Gaussian kernel on `[-radius, radius]`, or its `order`-th derivative.
///
/// The zeroth-order kernel is normalized to unit sum. Derivative kernels are
/// the normalized Gaussian multiplied by the derivative polynomial, which is
/// built by applying `d/dx + (-x / sigma^2)` to the constant polynomial
/// `order` times.
///
/// `sigma` must be positive and `radius` no larger than [`MAX_KERNEL_RADIUS`].
pub(crate) fn gaussian_kernel(sigma: f64, order: usize, radius: usize) -> Vec<f64> {
    let xs: Vec<f64> = (-(radius as isize)..=radius as isize)
        .map(|x| x as f64)
        .collect();
    let mut phi: Vec<f64> = xs.iter().map(|x| (-0.5 * (x / sigma).powi(2)).exp()).collect();
    let total: f64 = phi.iter().sum();
    phi.iter_mut().for_each(|p| *p /= total);

    if order == 0 {
        return phi;
    }

    let sigma2 = sigma * sigma;
    let mut operator = DMatrix::<f64>::zeros(order + 1, order + 1);
    for k in 1..=order {
        operator[(k - 1, k)] = k as f64;
        operator[(k, k - 1)] = -1.0 / sigma2;
    }
    let mut poly = DVector::<f64>::zeros(order + 1);
    poly[0] = 1.0;
    for _ in 0..order {
        poly = &operator * &poly;
    }

    xs.iter()
        .zip(phi)
        .map(|(&x, p)| {
            let q: f64 = (0..=order).map(|j| poly[j] * x.powi(j as i32)).sum();
            q * p
        })
        .collect()
}

/// Map any integer position onto `[0, n)` by half-sample symmetric reflection
/// (`d c b a | a b c d | d c b a`), repeating as often as needed.
fn reflect_index(idx: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = idx.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

/// Collapse kernel taps onto `(shift, weight)` pairs with
/// `out[i] = sum(weight * data[reflect(i + shift)])`.
///
/// Reflection repeats every `2n` samples, so a kernel wider than that folds
/// onto at most `2n` taps.
fn fold_kernel(kernel: &[f64], radius: usize, n: usize) -> Vec<(isize, f64)> {
    let r = radius as isize;
    let period = 2 * n;
    if kernel.len() <= period {
        return kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| (r - k as isize, w))
            .collect();
    }
    let mut folded = vec![0.0; period];
    for (k, &w) in kernel.iter().enumerate() {
        folded[(r - k as isize).rem_euclid(period as isize) as usize] += w;
    }
    folded
        .into_iter()
        .enumerate()
        .map(|(s, w)| (s as isize, w))
        .collect()
}

fn validate_sigma(sigma: f64, order: usize) -> Result<()> {
    if !sigma.is_finite()
        || sigma < 0.0
        || (sigma == 0.0 && order > 0)
        || TRUNCATE * sigma + 0.5 >= (MAX_KERNEL_RADIUS + 1) as f64
    {
        return Err(SmoothError::InvalidSigma { sigma, order });
    }
    Ok(())
}

/// Convolve a dense (gap-free) run with a Gaussian kernel using reflective edges.
///
/// `sigma == 0` with `order == 0` returns the input unchanged.
///
/// A run shorter than the kernel support (`2 * radius + 1`) is not rejected:
/// the reflection is well-defined, but whether such output is meaningful is
/// the caller's call. Spreads whose radius exceeds [`MAX_KERNEL_RADIUS`] are
/// rejected with [`SmoothError::InvalidSigma`].
pub fn gaussian_filter(data: &[f64], sigma: f64, order: usize) -> Result<Vec<f64>> {
    validate_sigma(sigma, order)?;
    if sigma == 0.0 || data.is_empty() {
        return Ok(data.to_vec());
    }

    let radius = kernel_radius(sigma);
    let kernel = gaussian_kernel(sigma, order, radius);
    let n = data.len();
    if n < kernel.len() {
        warn!(
            "gaussian filter: run of {} values is shorter than kernel support {}",
            n,
            kernel.len()
        );
    }

    let taps = fold_kernel(&kernel, radius, n);
    let smoothed = (0..n as isize)
        .map(|i| {
            taps.iter()
                .map(|&(shift, w)| w * data[reflect_index(i + shift, n)])
                .sum::<f64>()
        })
        .collect();
    Ok(smoothed)
}

/// Gaussian-smooth a labeled sequence, skipping missing values.
///
/// Missing positions are dropped before filtering, the dense run is filtered
/// as if evenly spaced, and the results land back on the originally present
/// positions. Missing positions stay missing; an all-missing input comes back
/// unchanged. Coordinates in the index are ignored.
///
/// # Arguments
///
/// * `seq` - The sequence to smooth
/// * `sigma` - Kernel spread in positions (`3.0` is the customary default)
/// * `order` - `0` smooths, `1` gives a smoothed first derivative, and so on
pub fn gaussian_smooth(seq: &LabeledSequence, sigma: f64, order: usize) -> Result<LabeledSequence> {
    validate_sigma(sigma, order)?;
    let present = seq.present_positions();
    debug!(
        "gaussian smoothing: {} of {} positions present, sigma={}, order={}",
        present.len(),
        seq.len(),
        sigma,
        order
    );
    if present.is_empty() {
        return Ok(seq.clone());
    }

    let dense: Vec<f64> = present.iter().map(|&p| seq.values()[p]).collect();
    let filtered = gaussian_filter(&dense, sigma, order)?;

    let mut values = vec![f64::NAN; seq.len()];
    for (&p, v) in present.iter().zip(filtered) {
        values[p] = v;
    }
    seq.with_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let k = gaussian_kernel(3.0, 0, kernel_radius(3.0));
        assert_eq!(k.len(), 25);
        assert_abs_diff_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..12 {
            assert_abs_diff_eq!(k[i], k[24 - i], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_derivative_kernel_is_antisymmetric() {
        let k = gaussian_kernel(2.0, 1, kernel_radius(2.0));
        assert_abs_diff_eq!(k.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
        let mid = k.len() / 2;
        assert_abs_diff_eq!(k[mid], 0.0, epsilon = 1e-15);
        // weight at positive offsets is negative: d/dx of a bump
        assert!(k[mid + 1] < 0.0);
        assert!(k[mid - 1] > 0.0);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-7, 1), 0);
    }

    #[test]
    fn test_constant_preserved_for_any_sigma() {
        let data = vec![5.0; 5];
        for sigma in [0.5, 1.0, 3.0, 10.0] {
            let out = gaussian_filter(&data, sigma, 0).unwrap();
            for v in out {
                assert_abs_diff_eq!(v, 5.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_first_order_on_ramp() {
        let data: Vec<f64> = (0..60).map(|i| 0.5 * i as f64).collect();
        let out = gaussian_filter(&data, 2.0, 1).unwrap();
        // truncating the kernel at 4 sigma loses a little of its second moment
        for &v in &out[15..45] {
            assert_abs_diff_eq!(v, 0.5, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let data = vec![1.0, -3.0, 7.5, 2.0];
        assert_eq!(gaussian_filter(&data, 0.0, 0).unwrap(), data);
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(gaussian_filter(&[1.0], -1.0, 0).is_err());
        assert!(gaussian_filter(&[1.0], f64::NAN, 0).is_err());
        assert!(gaussian_filter(&[1.0], 0.0, 1).is_err());
    }

    #[test]
    fn test_wide_kernel_folds_onto_short_run() {
        let data = [1.0, 4.0, 2.0, 7.0];
        let (sigma, order) = (3.0, 1);
        let radius = kernel_radius(sigma);
        let kernel = gaussian_kernel(sigma, order, radius);
        let r = radius as isize;
        let direct: Vec<f64> = (0..4isize)
            .map(|i| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * data[reflect_index(i - (k as isize - r), 4)])
                    .sum::<f64>()
            })
            .collect();
        let out = gaussian_filter(&data, sigma, order).unwrap();
        for (a, b) in out.iter().zip(&direct) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_very_wide_sigma_tends_to_mean() {
        let out = gaussian_filter(&[1.0, 2.0, 3.0], 50.0, 0).unwrap();
        for v in out {
            assert_abs_diff_eq!(v, 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_unrepresentable_sigma_rejected() {
        for sigma in [1e9, 1e300] {
            assert!(matches!(
                gaussian_filter(&[1.0, 2.0, 3.0], sigma, 0),
                Err(SmoothError::InvalidSigma { .. })
            ));
        }
        let seq = LabeledSequence::from_values(vec![1.0, 2.0, 3.0]);
        assert!(gaussian_smooth(&seq, 1e300, 0).is_err());
        // largest accepted radius still works
        let sigma = (MAX_KERNEL_RADIUS as f64 - 0.5) / TRUNCATE;
        assert_eq!(kernel_radius(sigma), MAX_KERNEL_RADIUS);
        assert!(gaussian_filter(&[1.0, 2.0], sigma, 0).is_ok());
    }

    #[test]
    fn test_missing_positions_preserved() {
        let seq = LabeledSequence::from_values(vec![1.0, f64::NAN, 3.0, 4.0, f64::NAN, 6.0]);
        let out = gaussian_smooth(&seq, 1.0, 0).unwrap();
        assert_eq!(out.len(), seq.len());
        assert_eq!(out.present_positions(), seq.present_positions());
        assert_eq!(out.index(), seq.index());
    }

    #[test]
    fn test_gaps_are_skipped_not_zero_filled() {
        // dense run is constant, so the gap must not pull values down
        let seq = LabeledSequence::from_values(vec![2.0, f64::NAN, f64::NAN, 2.0, 2.0]);
        let out = gaussian_smooth(&seq, 2.0, 0).unwrap();
        for p in [0, 3, 4] {
            assert_abs_diff_eq!(out.values()[p], 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_all_missing_returns_all_missing() {
        let seq = LabeledSequence::from_values(vec![f64::NAN; 4]);
        let out = gaussian_smooth(&seq, 3.0, 0).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.values().iter().all(|v| v.is_nan()));
    }
}
