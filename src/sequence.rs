use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, SmoothError};

// ---------------------------------------------------------------------------
// LabelValue – one label on one index tier
// ---------------------------------------------------------------------------

/// A dynamically-typed label. Totally ordered so it can key groups.
#[derive(Debug, Clone)]
pub enum LabelValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl LabelValue {
    /// Interpret the label as a coordinate, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LabelValue::Int(i) => Some(*i as f64),
            LabelValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Parse a raw text field: integer first, then float, then text. Empty is `Null`.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            return LabelValue::Null;
        }
        if let Ok(i) = field.parse::<i64>() {
            return LabelValue::Int(i);
        }
        if let Ok(v) = field.parse::<f64>() {
            return LabelValue::Float(v);
        }
        LabelValue::Text(field.to_string())
    }
}

impl Ord for LabelValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use LabelValue::*;
        fn rank(v: &LabelValue) -> u8 {
            match v {
                Null => 0,
                Int(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl PartialOrd for LabelValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LabelValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LabelValue {}

impl std::hash::Hash for LabelValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LabelValue::Int(i) => i.hash(state),
            LabelValue::Float(v) => v.to_bits().hash(state),
            LabelValue::Text(s) => s.hash(state),
            LabelValue::Null => {}
        }
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Int(i) => write!(f, "{i}"),
            // keep the decimal point so the label reads back as a float
            LabelValue::Float(v) => write!(f, "{v:?}"),
            LabelValue::Text(s) => write!(f, "{s}"),
            LabelValue::Null => Ok(()),
        }
    }
}

impl From<i64> for LabelValue {
    fn from(v: i64) -> Self {
        LabelValue::Int(v)
    }
}

impl From<f64> for LabelValue {
    fn from(v: f64) -> Self {
        LabelValue::Float(v)
    }
}

impl From<&str> for LabelValue {
    fn from(v: &str) -> Self {
        LabelValue::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Index – one or more label tiers of equal length
// ---------------------------------------------------------------------------

/// Multi-tier label structure. Tier 0 is the outermost, the last tier the innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    tiers: Vec<Vec<LabelValue>>,
    len: usize,
}

impl Index {
    /// Single-tier index `0, 1, ..., n - 1`.
    pub fn positional(n: usize) -> Self {
        Self {
            tiers: vec![(0..n as i64).map(LabelValue::Int).collect()],
            len: n,
        }
    }

    /// Single-tier index from labels.
    pub fn from_level(labels: Vec<LabelValue>) -> Self {
        let len = labels.len();
        Self {
            tiers: vec![labels],
            len,
        }
    }

    /// Single-tier numeric index, e.g. strikes or timestamps.
    pub fn from_coordinates(coords: &[f64]) -> Self {
        Self::from_level(coords.iter().copied().map(LabelValue::Float).collect())
    }

    /// Build a multi-tier index. Every tier must have the same length.
    pub fn from_tiers(tiers: Vec<Vec<LabelValue>>) -> Result<Self> {
        let len = tiers.first().map_or(0, Vec::len);
        if let Some(bad) = tiers.iter().find(|t| t.len() != len) {
            return Err(SmoothError::LengthMismatch {
                expected: len,
                actual: bad.len(),
            });
        }
        Ok(Self { tiers, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of tiers.
    pub fn nlevels(&self) -> usize {
        self.tiers.len()
    }

    /// Resolve a possibly negative level to a tier position (`-1` is the innermost tier).
    pub fn resolve_level(&self, level: isize) -> Result<usize> {
        let levels = self.tiers.len();
        let resolved = if level < 0 {
            levels as isize + level
        } else {
            level
        };
        if resolved < 0 || resolved >= levels as isize {
            return Err(SmoothError::LevelOutOfRange { level, levels });
        }
        Ok(resolved as usize)
    }

    /// Labels on one tier.
    pub fn level(&self, level: isize) -> Result<&[LabelValue]> {
        let tier = self.resolve_level(level)?;
        Ok(&self.tiers[tier])
    }

    /// Labels on one tier as coordinates. Fails unless every label is numeric.
    pub fn numeric_level(&self, level: isize) -> Result<Vec<f64>> {
        let tier = self.resolve_level(level)?;
        self.tiers[tier]
            .iter()
            .map(|label| label.as_f64().ok_or(SmoothError::NonNumericLevel(tier)))
            .collect()
    }

    /// Labels of one position across the given (already resolved) tiers.
    pub fn key(&self, position: usize, tiers: &[usize]) -> Vec<LabelValue> {
        tiers
            .iter()
            .map(|&t| self.tiers[t][position].clone())
            .collect()
    }

    /// Sub-index of the given positions, in the given order.
    pub fn take(&self, positions: &[usize]) -> Self {
        Self {
            tiers: self
                .tiers
                .iter()
                .map(|tier| positions.iter().map(|&p| tier[p].clone()).collect())
                .collect(),
            len: positions.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// LabeledSequence
// ---------------------------------------------------------------------------

/// Ordered `f64` values (missing values are `NaN`) aligned with an [`Index`].
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSequence {
    values: Vec<f64>,
    index: Index,
}

impl LabeledSequence {
    pub fn new(values: Vec<f64>, index: Index) -> Result<Self> {
        if values.len() != index.len() {
            return Err(SmoothError::LengthMismatch {
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Self { values, index })
    }

    /// Sequence with a positional index.
    pub fn from_values(values: Vec<f64>) -> Self {
        let index = Index::positional(values.len());
        Self { values, index }
    }

    /// Sequence whose single index tier holds numeric coordinates.
    pub fn from_xy(x: &[f64], y: Vec<f64>) -> Result<Self> {
        Self::new(y, Index::from_coordinates(x))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values in place; the length (and so the alignment with the index) cannot change.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_parts(self) -> (Vec<f64>, Index) {
        (self.values, self.index)
    }

    /// Same labels, new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        Self::new(values, self.index.clone())
    }

    pub fn is_missing(&self, position: usize) -> bool {
        self.values[position].is_nan()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Positions holding a value, in order.
    pub fn present_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, _)| i)
            .collect()
    }

    /// Elementwise map, labels unchanged.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            values: self.values.iter().map(|&v| f(v)).collect(),
            index: self.index.clone(),
        }
    }

    /// Elementwise combination of two sequences sharing the same labels.
    pub fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Result<Self> {
        if other.len() != self.len() {
            return Err(SmoothError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            values,
            index: self.index.clone(),
        })
    }

    /// Sub-sequence of the given positions, in the given order.
    pub fn take(&self, positions: &[usize]) -> Self {
        Self {
            values: positions.iter().map(|&p| self.values[p]).collect(),
            index: self.index.take(positions),
        }
    }
}

/// Anything that can produce label-aligned shifted copies of its values.
///
/// `shift(k)` yields `out[i] = y[i - k]`; positions with no source value are `NaN`.
pub trait Shift {
    fn shift(&self, periods: isize) -> LabeledSequence;
}

impl Shift for LabeledSequence {
    fn shift(&self, periods: isize) -> LabeledSequence {
        LabeledSequence {
            values: shift_slice(&self.values, periods),
            index: self.index.clone(),
        }
    }
}

pub(crate) fn shift_slice(values: &[f64], periods: isize) -> Vec<f64> {
    let n = values.len() as isize;
    (0..n)
        .map(|i| {
            let src = i - periods;
            if (0..n).contains(&src) {
                values[src as usize]
            } else {
                f64::NAN
            }
        })
        .collect()
}
