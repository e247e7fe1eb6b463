//! Linear-space divide-and-conquer engine (Hirschberg splitting).
//!
//! Matches [`DpEngine`](crate::dp::DpEngine) result-for-result: same optimal
//! score, same set of optimal alignments, while never materialising a full
//! score grid for the recursion. Each level keeps two O(|B|) score rows: a
//! forward row for the top half of `A` and a backward row for the bottom
//! half. Every column where the two rows sum to the optimum is a midpoint an
//! optimal path crosses, and each midpoint splits the problem into two
//! independent halves whose alignment sets are combined by cross-product
//! concatenation.
//!
//! Local mode first locates every optimal end cell with a linear-space
//! Smith-Waterman scan, then for each end runs a backward global scan over
//! the corresponding prefix pair to find every start cell, and finally hands
//! each trimmed slice pair to the global recursion.

use std::collections::BTreeSet;

use crate::alignment::{Alignment, AlignmentResult, Mode};
use crate::dp;
use crate::error::AlignError;
use crate::score::ScoreModel;
use crate::traits::AlignEngine;

/// Subproblems at least this many grid cells wide are split onto the rayon
/// pool when the `parallel` feature is enabled.
#[cfg(feature = "parallel")]
const PARALLEL_CELLS: usize = 16 * 1024;

/// Linear-space engine. Stateless, like its quadratic counterpart.
#[derive(Copy, Clone, Debug, Default)]
pub struct DcEngine;

impl DcEngine {
    pub fn new() -> Self {
        Self
    }
}

impl AlignEngine for DcEngine {
    fn align(
        &self,
        seq_a: &[u8],
        seq_b: &[u8],
        model: &ScoreModel,
        mode: Mode,
    ) -> Result<AlignmentResult, AlignError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("dc_align", n = seq_a.len(), m = seq_b.len(), ?mode)
            .entered();

        model.validate(seq_a)?;
        model.validate(seq_b)?;
        let (score, alignments) = match mode {
            Mode::Global => {
                let score = prefix_scores(seq_a, seq_b, model)[seq_b.len()];
                (score, global_set(seq_a, seq_b, model))
            }
            Mode::Local => local_set(seq_a, seq_b, model),
        };
        log::debug!(
            "dc: {}x{} problem, {:?} score {}, {} alignment(s)",
            seq_a.len(),
            seq_b.len(),
            mode,
            score,
            alignments.len()
        );
        Ok(AlignmentResult::new(score, alignments))
    }
}

/// All optimal global alignments of `seq_a` against `seq_b`.
///
/// Splits `seq_a` at its midpoint and recurses once per optimal crossing
/// column of `seq_b`. The same alignment can be reachable through several
/// crossing columns, so each level inserts into a set rather than a list.
fn global_set(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel) -> BTreeSet<Alignment> {
    if seq_a.len() <= 1 || seq_b.len() <= 1 {
        return dp::global_alignments(seq_a, seq_b, model);
    }

    let mid = seq_a.len() / 2;
    let forward = prefix_scores(&seq_a[..mid], seq_b, model);
    let backward = suffix_scores(&seq_a[mid..], seq_b, model);

    let best = forward
        .iter()
        .zip(&backward)
        .map(|(f, b)| f + b)
        .max()
        .expect("score rows have at least the empty-prefix column");

    let mut out = BTreeSet::new();
    log::trace!(
        "split {}x{} at row {}: {} tied column(s)",
        seq_a.len(),
        seq_b.len(),
        mid,
        forward
            .iter()
            .zip(&backward)
            .filter(|(f, b)| *f + *b == best)
            .count()
    );
    for (j, total) in forward.iter().zip(&backward).map(|(f, b)| f + b).enumerate() {
        if total != best {
            continue;
        }
        let (left, right) = split_sets(&seq_a[..mid], &seq_b[..j], &seq_a[mid..], &seq_b[j..], model);
        for l in &left {
            for r in &right {
                out.insert(l.concat(r));
            }
        }
    }
    out
}

/// Recurse into the two halves of one midpoint, in parallel when the
/// subproblem is big enough to pay for the fork.
fn split_sets(
    left_a: &[u8],
    left_b: &[u8],
    right_a: &[u8],
    right_b: &[u8],
    model: &ScoreModel,
) -> (BTreeSet<Alignment>, BTreeSet<Alignment>) {
    #[cfg(feature = "parallel")]
    {
        let cells = left_a.len() * left_b.len() + right_a.len() * right_b.len();
        if cells >= PARALLEL_CELLS {
            return rayon::join(
                || global_set(left_a, left_b, model),
                || global_set(right_a, right_b, model),
            );
        }
    }
    (
        global_set(left_a, left_b, model),
        global_set(right_a, right_b, model),
    )
}

/// Optimal local score plus all optimal local alignments.
fn local_set(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel) -> (i32, BTreeSet<Alignment>) {
    let (best, ends) = local_ends(seq_a, seq_b, model);
    log::trace!("local optimum {} at {} end cell(s)", best, ends.len());
    let mut out = BTreeSet::new();
    for &(i, j) in &ends {
        for (p, q) in trim_starts(&seq_a[..i], &seq_b[..j], model, best) {
            out.extend(global_set(&seq_a[p..i], &seq_b[q..j], model));
        }
    }
    (best, out)
}

/// Last row of the global score grid: entry `j` is the score of aligning all
/// of `seq_a` against `seq_b[..j]`.
fn prefix_scores(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel) -> Vec<i32> {
    let m = seq_b.len();
    let indel = model.indel();
    let mut prev: Vec<i32> = (0..=m).map(|j| j as i32 * indel).collect();
    let mut curr = vec![0i32; m + 1];
    for &a in seq_a {
        curr[0] = prev[0] + indel;
        for j in 1..=m {
            let diag = prev[j - 1] + model.score(a, seq_b[j - 1]);
            let up = prev[j] + indel;
            let left = curr[j - 1] + indel;
            curr[j] = diag.max(up).max(left);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev
}

/// Mirror of [`prefix_scores`]: entry `j` is the score of aligning all of
/// `seq_a` against `seq_b[j..]`, computed by scanning both sequences
/// backwards instead of copying them reversed.
fn suffix_scores(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel) -> Vec<i32> {
    let m = seq_b.len();
    let indel = model.indel();
    let mut prev: Vec<i32> = (0..=m).map(|j| (m - j) as i32 * indel).collect();
    let mut curr = vec![0i32; m + 1];
    for &a in seq_a.iter().rev() {
        curr[m] = prev[m] + indel;
        for j in (0..m).rev() {
            let diag = prev[j + 1] + model.score(a, seq_b[j]);
            let up = prev[j] + indel;
            let left = curr[j + 1] + indel;
            curr[j] = diag.max(up).max(left);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev
}

/// Linear-space Smith-Waterman scan. Returns the optimal local score and
/// every grid cell achieving it, boundary cells included so that a zero
/// optimum still yields the empty alignment.
fn local_ends(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel) -> (i32, Vec<(usize, usize)>) {
    let n = seq_a.len();
    let m = seq_b.len();
    let indel = model.indel();

    let mut best = 0i32;
    let mut ends: Vec<(usize, usize)> = (0..=n)
        .map(|i| (i, 0))
        .chain((1..=m).map(|j| (0, j)))
        .collect();

    let mut prev = vec![0i32; m + 1];
    let mut curr = vec![0i32; m + 1];
    for i in 1..=n {
        for j in 1..=m {
            let diag = prev[j - 1] + model.score(seq_a[i - 1], seq_b[j - 1]);
            let up = prev[j] + indel;
            let left = curr[j - 1] + indel;
            let value = diag.max(up).max(left).max(0);
            curr[j] = value;
            if value > best {
                best = value;
                ends.clear();
            }
            if value == best {
                ends.push((i, j));
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best, ends)
}

/// Every start cell for one local end: positions `(p, q)` whose suffix pair
/// `(seq_a[p..], seq_b[q..])` aligns globally to exactly `target`. The scan
/// runs backwards over the prefix pair that ends at the end cell, keeping two
/// rows just like [`suffix_scores`].
fn trim_starts(
    seq_a: &[u8],
    seq_b: &[u8],
    model: &ScoreModel,
    target: i32,
) -> Vec<(usize, usize)> {
    let n = seq_a.len();
    let m = seq_b.len();
    let indel = model.indel();
    let mut starts = Vec::new();

    let mut prev: Vec<i32> = (0..=m).map(|q| (m - q) as i32 * indel).collect();
    for (q, &value) in prev.iter().enumerate() {
        if value == target {
            starts.push((n, q));
        }
    }
    let mut curr = vec![0i32; m + 1];
    for p in (0..n).rev() {
        curr[m] = prev[m] + indel;
        for q in (0..m).rev() {
            let diag = prev[q + 1] + model.score(seq_a[p], seq_b[q]);
            let up = prev[q] + indel;
            let left = curr[q + 1] + indel;
            curr[q] = diag.max(up).max(left);
        }
        for (q, &value) in curr.iter().enumerate() {
            if value == target {
                starts.push((p, q));
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dp::DpEngine;

    fn align(
        seq_a: &[u8],
        seq_b: &[u8],
        model: &ScoreModel,
        mode: Mode,
    ) -> AlignmentResult {
        DcEngine::new().align(seq_a, seq_b, model, mode).unwrap()
    }

    fn lines(result: &AlignmentResult) -> Vec<(String, String)> {
        result
            .alignments()
            .iter()
            .map(|a| {
                (
                    String::from_utf8(a.seq_a().to_vec()).unwrap(),
                    String::from_utf8(a.seq_b().to_vec()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn prefix_and_suffix_rows_mirror() {
        let model = ScoreModel::from_scalars(2, -1, -2);
        let forward = prefix_scores(b"GAT", b"GCAT", &model);
        let backward = suffix_scores(b"GAT", b"GCAT", &model);
        // Entry 0 of the backward row scores the whole problem, as does the
        // last entry of the forward row.
        assert_eq!(forward[4], backward[0]);
    }

    #[test]
    fn global_unique_optimum() {
        let model = ScoreModel::from_scalars(5, -1, -4);
        let result = align(b"AGC", b"GCT", &model, Mode::Global);
        assert_eq!(result.score(), 2);
        assert_eq!(lines(&result), vec![("AGC-".into(), "-GCT".into())]);
    }

    #[test]
    fn global_tie_enumeration() {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let result = align(b"AAAA", b"AAA", &model, Mode::Global);
        assert_eq!(result.score(), 2);
        assert_eq!(
            lines(&result),
            vec![
                ("AAAA".into(), "-AAA".into()),
                ("AAAA".into(), "A-AA".into()),
                ("AAAA".into(), "AA-A".into()),
                ("AAAA".into(), "AAA-".into()),
            ]
        );
    }

    #[test]
    fn global_empty_side_is_all_gaps() {
        let model = ScoreModel::from_scalars(1, -1, -2);
        let result = align(b"", b"ACGT", &model, Mode::Global);
        assert_eq!(result.score(), -8);
        assert_eq!(lines(&result), vec![("----".into(), "ACGT".into())]);
    }

    #[test]
    fn global_both_empty() {
        let model = ScoreModel::from_scalars(1, -1, -2);
        let result = align(b"", b"", &model, Mode::Global);
        assert_eq!(result.score(), 0);
        assert_eq!(lines(&result), vec![(String::new(), String::new())]);
    }

    #[test]
    fn local_best_substring_pair() {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let result = align(b"AGC", b"GCT", &model, Mode::Local);
        assert_eq!(result.score(), 2);
        assert_eq!(lines(&result), vec![("GC".into(), "GC".into())]);
    }

    #[test]
    fn local_no_similarity_scores_zero() {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let result = align(b"AAAA", b"CCCC", &model, Mode::Local);
        assert_eq!(result.score(), 0);
        assert_eq!(lines(&result), vec![(String::new(), String::new())]);
    }

    #[test]
    fn local_empty_sequence_scores_zero() {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let result = align(b"", b"ACGT", &model, Mode::Local);
        assert_eq!(result.score(), 0);
        assert_eq!(lines(&result), vec![(String::new(), String::new())]);
    }

    #[test]
    fn agrees_with_full_grid_engine() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"CTATGCCA", b"CCTACA"),
            (b"GATTACA", b"GCATGCU"),
            (b"AAAAGTC", b"GTCAAAA"),
            (b"ACGTACGT", b"TGCATGCA"),
            (b"AGGA", b"GA"),
        ];
        let models = [
            ScoreModel::from_scalars(1, -1, -1),
            ScoreModel::from_scalars(2, -1, -2),
            ScoreModel::from_scalars(1, 0, -1),
            ScoreModel::from_scalars(3, -2, 0),
        ];
        let dp = DpEngine::new();
        let dc = DcEngine::new();
        for &(a, b) in cases {
            for model in &models {
                for mode in [Mode::Global, Mode::Local] {
                    let full = dp.align(a, b, model, mode).unwrap();
                    let lean = dc.align(a, b, model, mode).unwrap();
                    assert_eq!(full, lean, "{:?} {:?}/{:?}", mode, a, b);
                }
            }
        }
    }
}
