use log::debug;
use serde::{Deserialize, Serialize};

use crate::coefficients::{validate_window, CoefficientCache};
use crate::error::{Result, SmoothError};
use crate::sequence::LabeledSequence;

/// Boundary handling strategies for the Savitzky-Golay filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Fit the polynomial to the first/last full window and evaluate it at each edge point
    #[default]
    Interp,
    /// Reflect about the edge sample (`c b | a b c`)
    Mirror,
    /// Repeat the edge sample
    Nearest,
    /// Pad with zeros
    Constant,
    /// Wrap around (circular boundary)
    Wrap,
}

/// Configuration for the Savitzky-Golay filter.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Size of the filter window (must be odd)
    pub window_size: usize,
    /// Order of the polynomial to fit
    pub poly_order: usize,
    /// Boundary handling strategy
    pub boundary_mode: BoundaryMode,
}

impl FilterConfig {
    /// Creates a new filter configuration with validation
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        validate_window(window_size, poly_order)?;
        Ok(Self {
            window_size,
            poly_order,
            boundary_mode: BoundaryMode::Interp,
        })
    }

    /// Sets the boundary handling mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }
}

/// A Savitzky-Golay filter for signal smoothing and differentiation.
///
/// Coefficient sets are cached per instance, so reusing one filter across many
/// signals of the same configuration avoids refitting. Higher polynomial orders
/// follow the data more closely but may oscillate near the boundaries.
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    cache: CoefficientCache,
}

impl SavitzkyGolayFilter {
    /// Creates a new Savitzky-Golay filter with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Size of the filter window (must be odd)
    /// * `poly_order` - Order of the polynomial to fit (must be < window_size)
    ///
    /// # Example
    ///
    /// ```rust
    /// use group_smooth::SavitzkyGolayFilter;
    ///
    /// let filter = SavitzkyGolayFilter::new(5, 2).expect("Valid parameters");
    /// ```
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        let config = FilterConfig::new(window_size, poly_order)?;
        Ok(Self::with_config(config))
    }

    /// Creates a filter with custom configuration
    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            config,
            cache: CoefficientCache::new(),
        }
    }

    /// Sets the boundary handling mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.config.boundary_mode = mode;
        self
    }

    /// Applies the Savitzky-Golay filter to smooth the input data.
    ///
    /// Fails with [`SmoothError::InsufficientData`] when the data is shorter
    /// than the window.
    ///
    /// # Example
    ///
    /// ```rust
    /// use group_smooth::SavitzkyGolayFilter;
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
    /// let mut filter = SavitzkyGolayFilter::new(5, 2).expect("Valid parameters");
    /// let smoothed = filter.apply(&data).expect("Long enough");
    /// assert_eq!(smoothed.len(), data.len());
    /// ```
    pub fn apply(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        self.apply_derivative(data, 0, 1.0)
    }

    /// Applies the Savitzky-Golay filter to compute derivatives of the input data.
    ///
    /// # Arguments
    ///
    /// * `data` - The input signal data
    /// * `derivative_order` - Order of derivative to compute (0 smooths, 1 for first derivative, etc.)
    /// * `delta` - Spacing of the samples; derivatives come out per unit of `delta`
    pub fn apply_derivative(
        &mut self,
        data: &[f64],
        derivative_order: usize,
        delta: f64,
    ) -> Result<Vec<f64>> {
        let window_size = self.config.window_size;
        if data.len() < window_size {
            return Err(SmoothError::InsufficientData(data.len(), window_size));
        }
        if !delta.is_finite() || delta == 0.0 {
            return Err(SmoothError::InvalidDelta(delta));
        }
        debug!(
            "savgol: {} points, window={}, polyorder={}, deriv={}, mode={:?}",
            data.len(),
            window_size,
            self.config.poly_order,
            derivative_order,
            self.config.boundary_mode
        );

        (0..data.len())
            .map(|center| self.compute_filtered_value(data, center, derivative_order, delta))
            .collect()
    }

    /// Computes the filtered value at a specific point
    fn compute_filtered_value(
        &mut self,
        data: &[f64],
        center: usize,
        derivative_order: usize,
        delta: f64,
    ) -> Result<f64> {
        let n = data.len() as isize;
        let window_size = self.config.window_size;
        let wn = window_size as isize;
        let hw = wn / 2;
        let center = center as isize;
        let poly_order = self.config.poly_order;

        // Interp: shift a full window into bounds and evaluate the edge fit at `center`
        if self.config.boundary_mode == BoundaryMode::Interp && (center < hw || center + hw >= n) {
            let start = (center - hw).clamp(0, n - wn);
            let coeffs =
                self.cache
                    .get(start - center, window_size, poly_order, derivative_order, delta)?;
            let window = &data[start as usize..(start + wn) as usize];
            return Ok(coeffs.iter().zip(window).map(|(c, y)| c * y).sum());
        }

        let mode = self.config.boundary_mode;
        let coeffs = self
            .cache
            .get(-hw, window_size, poly_order, derivative_order, delta)?;
        let sum: f64 = coeffs
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let idx = center - hw + j as isize;
                let value = if (0..n).contains(&idx) {
                    data[idx as usize]
                } else {
                    boundary_value(mode, data, idx)
                };
                c * value
            })
            .sum();
        Ok(sum)
    }

    /// Returns the filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

/// Value standing in for an out-of-range sample.
fn boundary_value(mode: BoundaryMode, data: &[f64], requested_idx: isize) -> f64 {
    let n = data.len();
    let last = n as isize - 1;
    match mode {
        BoundaryMode::Mirror => {
            let reflected = if requested_idx < 0 {
                -requested_idx
            } else {
                2 * last - requested_idx
            };
            data[reflected.clamp(0, last) as usize]
        }
        BoundaryMode::Wrap => data[requested_idx.rem_euclid(n as isize) as usize],
        BoundaryMode::Constant => 0.0,
        // Interp never reaches here: its edge windows stay in bounds
        BoundaryMode::Nearest | BoundaryMode::Interp => {
            if requested_idx < 0 {
                data[0]
            } else {
                data[n - 1]
            }
        }
    }
}

/// Savitzky-Golay smoothing of a labeled sequence with interpolating edges.
///
/// The values must be gap-free; missing values propagate into every window
/// that touches them.
///
/// # Errors
///
/// * [`SmoothError::InvalidWindowSize`] for an even or zero `window_length`
/// * [`SmoothError::InvalidPolynomialOrder`] when `polyorder >= window_length`
/// * [`SmoothError::InsufficientData`] when `window_length` exceeds the sequence length
pub fn savgol_smooth(
    seq: &LabeledSequence,
    window_length: usize,
    polyorder: usize,
) -> Result<LabeledSequence> {
    savgol_derivative(seq, window_length, polyorder, 0, 1.0)
}

/// Savitzky-Golay derivative of order `deriv` of a labeled sequence, for samples
/// spaced `delta` apart.
pub fn savgol_derivative(
    seq: &LabeledSequence,
    window_length: usize,
    polyorder: usize,
    deriv: usize,
    delta: f64,
) -> Result<LabeledSequence> {
    savgol_with_mode(seq, window_length, polyorder, deriv, delta, BoundaryMode::Interp)
}

/// Savitzky-Golay filtering of a labeled sequence with an explicit boundary mode.
pub fn savgol_with_mode(
    seq: &LabeledSequence,
    window_length: usize,
    polyorder: usize,
    deriv: usize,
    delta: f64,
    mode: BoundaryMode,
) -> Result<LabeledSequence> {
    let mut filter = SavitzkyGolayFilter::new(window_length, polyorder)?.with_boundary_mode(mode);
    let values = filter.apply_derivative(seq.values(), deriv, delta)?;
    seq.with_values(values)
}
