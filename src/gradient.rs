use log::debug;

use crate::error::{Result, SmoothError};
use crate::sequence::LabeledSequence;

/// Finite-difference gradient with unit spacing: central differences
/// `(v[i+1] - v[i-1]) / 2` inside, one-sided differences at the two ends.
///
/// Needs at least two samples.
pub fn unit_gradient(values: &[f64]) -> Result<Vec<f64>> {
    let n = values.len();
    if n < 2 {
        return Err(SmoothError::InsufficientData(n, 2));
    }
    let mut out = vec![0.0; n];
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }
    out[0] = values[1] - values[0];
    out[n - 1] = values[n - 1] - values[n - 2];
    Ok(out)
}

/// Centered derivative `dy/dx` of a labeled sequence against one of its index tiers.
///
/// `x` is read from the index tier `index_level` (`-1` is the innermost tier)
/// and both `y` and `x` are differenced with [`unit_gradient`] before dividing,
/// so irregular spacing in `x` is corrected locally.
///
/// Missing values propagate. A zero local spacing in `x` yields an infinite or
/// undefined value at that position.
///
/// # Errors
///
/// * [`SmoothError::LevelOutOfRange`] if the tier does not exist
/// * [`SmoothError::NonNumericLevel`] if the tier holds non-numeric labels
/// * [`SmoothError::InsufficientData`] for fewer than two positions
pub fn centered_gradient(seq: &LabeledSequence, index_level: isize) -> Result<LabeledSequence> {
    let x = seq.index().numeric_level(index_level)?;
    debug!(
        "centered gradient over {} positions against index level {}",
        seq.len(),
        index_level
    );
    let dy = unit_gradient(seq.values())?;
    let dx = unit_gradient(&x)?;
    let values = dy.iter().zip(&dx).map(|(a, b)| a / b).collect();
    seq.with_values(values)
}
