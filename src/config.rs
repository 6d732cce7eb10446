use serde::{Deserialize, Serialize};

use crate::derivative::second_derivative;
use crate::error::Result;
use crate::filter::{savgol_with_mode, BoundaryMode};
use crate::gaussian::gaussian_smooth;
use crate::gradient::centered_gradient;
use crate::sequence::LabeledSequence;

/// Parameters of the Gaussian smoother.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianParams {
    /// Kernel spread, in positions of the dense run.
    pub sigma: f64,
    /// Derivative order; 0 smooths.
    pub order: usize,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            order: 0,
        }
    }
}

/// Parameters of the Savitzky-Golay smoother.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavgolParams {
    pub window_length: usize,
    pub polyorder: usize,
    pub deriv: usize,
    pub delta: f64,
    pub mode: BoundaryMode,
}

impl Default for SavgolParams {
    fn default() -> Self {
        Self {
            window_length: 5,
            polyorder: 2,
            deriv: 0,
            delta: 1.0,
            mode: BoundaryMode::Interp,
        }
    }
}

/// Parameters of the centered gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientParams {
    /// Index tier holding the coordinate axis; negative counts from the innermost.
    pub index_level: isize,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self { index_level: -1 }
    }
}

/// One configured transform, e.g. loaded from a pipeline description.
///
/// ```rust
/// use group_smooth::{LabeledSequence, Transform};
///
/// let transform: Transform =
///     serde_json::from_str(r#"{"kind": "gaussian", "sigma": 1.5}"#).unwrap();
/// let seq = LabeledSequence::from_values(vec![1.0, 2.0, 3.0]);
/// assert_eq!(transform.apply(&seq).unwrap().len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    SecondDerivative,
    Gaussian(GaussianParams),
    Savgol(SavgolParams),
    Gradient(GradientParams),
}

impl Transform {
    /// Run the transform on one sequence.
    pub fn apply(&self, seq: &LabeledSequence) -> Result<LabeledSequence> {
        match self {
            Transform::SecondDerivative => second_derivative(seq),
            Transform::Gaussian(p) => gaussian_smooth(seq, p.sigma, p.order),
            Transform::Savgol(p) => {
                savgol_with_mode(seq, p.window_length, p.polyorder, p.deriv, p.delta, p.mode)
            }
            Transform::Gradient(p) => centered_gradient(seq, p.index_level),
        }
    }
}
