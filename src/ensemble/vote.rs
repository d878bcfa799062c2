//! Majority-vote consensus across three labelings.

use crate::cluster::Label;
use crate::error::{Error, Result};

/// Combine three positionally aligned labelings into a consensus labeling
/// by per-point majority vote.
///
/// Label ids from different algorithms are compared as plain integers, the
/// same way the base algorithms report them. Noise votes are discarded
/// whenever at least one real vote exists at that point, so an unassigned
/// point can neither win against real votes nor suppress agreement between
/// the other two algorithms; a point all three leave unassigned stays
/// [`Label::Noise`].
///
/// Ties (including three pairwise-distinct labels) break deterministically
/// to the **lowest label id**. Base algorithms hand out ids arbitrarily, so
/// any fixed rule is as good as another; this one is documented and stable.
///
/// Pure and stateless: identical inputs always produce identical output.
/// Fails fast when the three vectors differ in length.
pub fn majority_vote(a: &[Label], b: &[Label], c: &[Label]) -> Result<Vec<Label>> {
    if b.len() != a.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    if c.len() != a.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            found: c.len(),
        });
    }

    Ok(a.iter()
        .zip(b)
        .zip(c)
        .map(|((&va, &vb), &vc)| vote_one([va, vb, vc]))
        .collect())
}

/// Consensus for a single point.
fn vote_one(votes: [Label; 3]) -> Label {
    let mut real: Vec<usize> = votes.iter().filter_map(|v| v.id()).collect();
    if real.is_empty() {
        return Label::Noise;
    }

    // Sorting makes the count scan see equal ids adjacently, and makes the
    // first id with the maximal count the lowest one: the tie-break.
    real.sort_unstable();

    let mut best_id = real[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < real.len() {
        let id = real[i];
        let mut count = 0;
        while i < real.len() && real[i] == id {
            count += 1;
            i += 1;
        }
        if count > best_count {
            best_count = count;
            best_id = id;
        }
    }

    Label::Assigned(best_id)
}
