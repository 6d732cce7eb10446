use std::collections::HashMap;

use ahash::RandomState;
use log::trace;
use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SmoothError};

/// Checks the window/order combination shared by every Savitzky-Golay entry point.
pub fn validate_window(window_size: usize, poly_order: usize) -> Result<()> {
    if window_size % 2 == 0 || window_size == 0 {
        return Err(SmoothError::InvalidWindowSize(window_size));
    }
    if poly_order >= window_size {
        return Err(SmoothError::InvalidPolynomialOrder(poly_order, window_size));
    }
    Ok(())
}

/// Computes Savitzky-Golay filter coefficients for a centered window.
///
/// The filter fits a polynomial of degree `poly_order` to a moving window of
/// `window_size` points by least squares and evaluates the polynomial (or its
/// derivative) at the center point. The returned weights are applied as a dot
/// product with the window, first sample first.
///
/// # Arguments
///
/// * `window_size` - Size of the moving window (must be odd)
/// * `poly_order` - Degree of the polynomial to fit (must be < window_size)
/// * `derivative` - Order of derivative to compute (0 for smoothing, 1 for first derivative, etc.)
pub fn compute_coefficients(
    window_size: usize,
    poly_order: usize,
    derivative: usize,
) -> Result<Vec<f64>> {
    validate_window(window_size, poly_order)?;
    let half_window = (window_size / 2) as isize;
    let offsets: Vec<isize> = (-half_window..=half_window).collect();
    compute_coefficients_for_offsets(&offsets, poly_order, derivative, 1.0)
}

/// Least-squares weights for samples at arbitrary integer `offsets` from the
/// evaluation point, with samples spaced `delta` apart in physical units.
///
/// Used directly for the shifted windows at the edges of a signal, where the
/// evaluation point is no longer in the middle of the window.
pub fn compute_coefficients_for_offsets(
    offsets: &[isize],
    poly_order: usize,
    derivative: usize,
    delta: f64,
) -> Result<Vec<f64>> {
    let window_size = offsets.len();
    if window_size == 0 {
        return Err(SmoothError::InvalidWindowSize(0));
    }
    if poly_order >= window_size {
        return Err(SmoothError::InvalidPolynomialOrder(poly_order, window_size));
    }
    if !delta.is_finite() || delta == 0.0 {
        return Err(SmoothError::InvalidDelta(delta));
    }

    // Derivative order higher than polynomial order results in zero
    if derivative > poly_order {
        return Ok(vec![0.0; window_size]);
    }

    // Vandermonde in offset units; rescaled by delta^-derivative at the end
    let mut vandermonde = DMatrix::<f64>::zeros(window_size, poly_order + 1);
    for (i, &off) in offsets.iter().enumerate() {
        let x = off as f64;
        for j in 0..=poly_order {
            vandermonde[(i, j)] = x.powi(j as i32);
        }
    }

    // Solve A^T A c = k! e_k
    let ata = vandermonde.transpose() * &vandermonde;
    let mut rhs = DVector::<f64>::zeros(poly_order + 1);
    let factorial = (1..=derivative).fold(1.0, |acc, x| acc * x as f64);
    rhs[derivative] = factorial;

    let coeffs_poly = ata.lu().solve(&rhs).ok_or_else(|| {
        SmoothError::Computation("Failed to solve least squares system".to_string())
    })?;

    let scale = delta.powi(derivative as i32);
    let filter_coeffs = (0..window_size)
        .map(|i| {
            (0..=poly_order)
                .map(|j| coeffs_poly[j] * vandermonde[(i, j)])
                .sum::<f64>()
                / scale
        })
        .collect();

    Ok(filter_coeffs)
}

/// Key: (first offset, window size, poly order, derivative, delta bits).
/// Windows are always contiguous, so the first offset pins down all of them.
type CacheKey = (isize, usize, usize, usize, u64);

/// Per-filter memo of computed coefficient sets.
#[derive(Default)]
pub struct CoefficientCache {
    coefficients: HashMap<CacheKey, Vec<f64>, RandomState>,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficients for the contiguous window `first_offset..first_offset + window_size`,
    /// computed on first use.
    pub fn get(
        &mut self,
        first_offset: isize,
        window_size: usize,
        poly_order: usize,
        derivative: usize,
        delta: f64,
    ) -> Result<&[f64]> {
        let key = (first_offset, window_size, poly_order, derivative, delta.to_bits());
        if !self.coefficients.contains_key(&key) {
            trace!("coefficient cache miss: {:?}", key);
            let offsets: Vec<isize> =
                (first_offset..first_offset + window_size as isize).collect();
            let coeffs =
                compute_coefficients_for_offsets(&offsets, poly_order, derivative, delta)?;
            self.coefficients.insert(key, coeffs);
        }
        Ok(&self.coefficients[&key])
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}
