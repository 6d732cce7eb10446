use log::debug;

use crate::error::Result;
use crate::sequence::{LabeledSequence, Shift};

/// Raw second finite difference `y[i+1] - 2*y[i] + y[i-1]`.
///
/// Built from one-step forward and backward shifts of `obj`, so when `obj` is a
/// [`GroupedSeries`](crate::GroupedSeries) the shifts stay inside each group and
/// the first and last position of every group come out missing.
///
/// The result is not divided by the squared step; callers with a physical
/// spacing `h` divide by `h * h` themselves.
pub fn second_derivative<S: Shift + ?Sized>(obj: &S) -> Result<LabeledSequence> {
    let current = obj.shift(0);
    let neighbours = obj.shift(1).zip_with(&obj.shift(-1), |prev, next| prev + next)?;
    debug!("second difference over {} positions", current.len());
    neighbours.zip_with(&current, |sum, y| sum - 2.0 * y)
}
