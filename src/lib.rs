//! # group_smooth
//!
//! Smoothing and differentiation of ordered, labeled sequences such as time
//! series or strike-indexed option curves, applied one group at a time.
//!
//! Every transform takes a [`LabeledSequence`] (values with an equal-length,
//! possibly multi-tier [`Index`]) and returns a new one with the same length
//! and the same labels:
//!
//! - [`second_derivative`]: raw second difference `y[i+1] - 2y[i] + y[i-1]`
//! - [`gaussian_smooth`]: Gaussian kernel smoothing that skips missing values
//! - [`savgol_smooth`]: Savitzky-Golay polynomial smoothing
//! - [`centered_gradient`]: `dy/dx` against a numeric index tier
//!
//! Missing values are `NaN`. [`GroupedSeries`] runs any of these per group,
//! sequentially or in parallel, and puts the results back in input order.
//!
//! ## Example
//!
//! ```rust
//! use group_smooth::{centered_gradient, GroupedSeries, Index, LabeledSequence};
//!
//! // two option chains, strikes on the inner tier
//! let index = Index::from_tiers(vec![
//!     vec!["SPX".into(), "SPX".into(), "SPX".into(), "NDX".into(), "NDX".into()],
//!     vec![90.0.into(), 100.0.into(), 110.0.into(), 100.0.into(), 120.0.into()],
//! ])
//! .unwrap();
//! let prices = LabeledSequence::new(vec![12.0, 5.0, 1.0, 9.0, 3.0], index).unwrap();
//!
//! let grouped = GroupedSeries::new(&prices, &[0]).unwrap();
//! let slope = grouped.transform(|chain| centered_gradient(chain, -1)).unwrap();
//! assert_eq!(slope.len(), prices.len());
//! assert_eq!(slope.index(), prices.index());
//! ```

mod coefficients;
mod config;
mod csv_utils;
mod derivative;
mod error;
mod filter;
mod gaussian;
mod gradient;
mod grouped;
mod sequence;

pub use coefficients::{compute_coefficients, compute_coefficients_for_offsets};
pub use config::{GaussianParams, GradientParams, SavgolParams, Transform};
pub use csv_utils::{read_csv_sequence, write_csv_sequence};
pub use derivative::second_derivative;
pub use error::{Result, SmoothError};
pub use filter::{
    savgol_derivative, savgol_smooth, savgol_with_mode, BoundaryMode, FilterConfig,
    SavitzkyGolayFilter,
};
pub use gaussian::{gaussian_filter, gaussian_smooth};
pub use gradient::{centered_gradient, unit_gradient};
pub use grouped::{GroupKey, GroupedSeries};
pub use sequence::{Index, LabelValue, LabeledSequence, Shift};

/// Gaussian smoothing with the default spread (`sigma = 3`, `order = 0`).
///
/// # Example
///
/// ```rust
/// use group_smooth::{smooth, LabeledSequence};
///
/// let seq = LabeledSequence::from_values(vec![5.0, 5.0, f64::NAN, 5.0, 5.0]);
/// let smoothed = smooth(&seq).unwrap();
/// assert!(smoothed.values()[2].is_nan());
/// ```
pub fn smooth(seq: &LabeledSequence) -> Result<LabeledSequence> {
    let params = GaussianParams::default();
    gaussian_smooth(seq, params.sigma, params.order)
}

/// Centered gradient against the innermost index tier.
pub fn gradient(seq: &LabeledSequence) -> Result<LabeledSequence> {
    centered_gradient(seq, GradientParams::default().index_level)
}
