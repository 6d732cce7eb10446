//! Per-group application of sequence transforms.
//!
//! A [`GroupedSeries`] partitions the positions of a [`LabeledSequence`] by the
//! labels on one or more index tiers. Transforms run on each group's
//! sub-sequence independently and their results are written back into the
//! original positions, so the output always lines up with the input.

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;

use crate::config::Transform;
use crate::error::{Result, SmoothError};
use crate::sequence::{shift_slice, LabelValue, LabeledSequence, Shift};

/// Group key: one label per grouping tier.
pub type GroupKey = Vec<LabelValue>;

/// A view of a labeled sequence split into groups.
#[derive(Debug, Clone)]
pub struct GroupedSeries<'a> {
    seq: &'a LabeledSequence,
    groups: Vec<(GroupKey, Vec<usize>)>,
}

impl<'a> GroupedSeries<'a> {
    /// Group `seq` by the labels on the tiers `by` (negative levels count from the innermost).
    ///
    /// Groups are ordered by key; positions inside a group keep their original
    /// order. An empty `by` puts every position in a single group.
    pub fn new(seq: &'a LabeledSequence, by: &[isize]) -> Result<Self> {
        let tiers = by
            .iter()
            .map(|&level| seq.index().resolve_level(level))
            .collect::<Result<Vec<_>>>()?;

        let mut grouped: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        for position in 0..seq.len() {
            grouped
                .entry(seq.index().key(position, &tiers))
                .or_default()
                .push(position);
        }
        debug!(
            "grouped {} positions into {} group(s) by levels {:?}",
            seq.len(),
            grouped.len(),
            by
        );
        Ok(Self {
            seq,
            groups: grouped.into_iter().collect(),
        })
    }

    /// The underlying sequence.
    pub fn sequence(&self) -> &LabeledSequence {
        self.seq
    }

    /// `(key, positions)` for every group, in key order.
    pub fn groups(&self) -> &[(GroupKey, Vec<usize>)] {
        &self.groups
    }

    pub fn ngroups(&self) -> usize {
        self.groups.len()
    }

    /// Sub-sequence of one group.
    pub fn get_group(&self, key: &[LabelValue]) -> Option<LabeledSequence> {
        self.groups
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, positions)| self.seq.take(positions))
    }

    /// Run `f` on every group and stitch the results back into the original positions.
    ///
    /// Fails if any group fails, or if `f` changes a group's length.
    pub fn transform<F>(&self, f: F) -> Result<LabeledSequence>
    where
        F: Fn(&LabeledSequence) -> Result<LabeledSequence>,
    {
        let results = self
            .groups
            .iter()
            .map(|(_, positions)| run_group(self.seq, positions, &f))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.scatter(results))
    }

    /// Same as [`transform`](Self::transform), with groups processed in parallel.
    pub fn par_transform<F>(&self, f: F) -> Result<LabeledSequence>
    where
        F: Fn(&LabeledSequence) -> Result<LabeledSequence> + Sync + Send,
    {
        let results = self
            .groups
            .par_iter()
            .map(|(_, positions)| run_group(self.seq, positions, &f))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.scatter(results))
    }

    /// Apply a configured transform to every group.
    pub fn apply(&self, transform: &Transform) -> Result<LabeledSequence> {
        self.transform(|group| transform.apply(group))
    }

    /// Apply a configured transform to every group in parallel.
    pub fn par_apply(&self, transform: &Transform) -> Result<LabeledSequence> {
        self.par_transform(|group| transform.apply(group))
    }

    fn scatter(&self, results: Vec<Vec<f64>>) -> LabeledSequence {
        let mut out = self.seq.map(|_| f64::NAN);
        let values = out.values_mut();
        for ((_, positions), group_values) in self.groups.iter().zip(results) {
            for (&p, v) in positions.iter().zip(group_values) {
                values[p] = v;
            }
        }
        out
    }
}

fn run_group<F>(seq: &LabeledSequence, positions: &[usize], f: &F) -> Result<Vec<f64>>
where
    F: Fn(&LabeledSequence) -> Result<LabeledSequence>,
{
    let out = f(&seq.take(positions))?;
    if out.len() != positions.len() {
        return Err(SmoothError::LengthMismatch {
            expected: positions.len(),
            actual: out.len(),
        });
    }
    Ok(out.into_parts().0)
}

/// Shifts stay inside each group: the first `periods` positions of every group
/// come out missing instead of borrowing from the previous group.
impl Shift for GroupedSeries<'_> {
    fn shift(&self, periods: isize) -> LabeledSequence {
        let mut out = self.seq.map(|_| f64::NAN);
        let values = out.values_mut();
        for (_, positions) in &self.groups {
            let group_values: Vec<f64> = positions.iter().map(|&p| self.seq.values()[p]).collect();
            for (&p, v) in positions.iter().zip(shift_slice(&group_values, periods)) {
                values[p] = v;
            }
        }
        out
    }
}
