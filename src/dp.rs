//! Quadratic-space dynamic-programming engine with full backtracking.
//!
//! Builds the complete (|A|+1) × (|B|+1) score grid together with a per-cell
//! tie set of predecessor moves, then enumerates every optimal alignment by
//! an iterative depth-first traversal over the implicit backpointer DAG.
//!
//! Enumeration time is proportional to the number of optimal paths, which is
//! exponential on pathological tie-heavy inputs; that is inherent to
//! reporting all optima, not a defect.

use std::collections::BTreeSet;

use crate::alignment::{Alignment, AlignmentResult, Mode, GAP};
use crate::error::AlignError;
use crate::score::ScoreModel;
use crate::traits::AlignEngine;

/// Predecessor-move tags. A cell stores the subset of moves whose candidate
/// score equals the cell value, so ties survive into backtracking.
const DIAG: u8 = 0b001;
const UP: u8 = 0b010;
const LEFT: u8 = 0b100;

/// Full-grid engine. Stateless; every `align` call owns its own grid.
#[derive(Copy, Clone, Debug, Default)]
pub struct DpEngine;

impl DpEngine {
    pub fn new() -> Self {
        Self
    }
}

impl AlignEngine for DpEngine {
    fn align(
        &self,
        seq_a: &[u8],
        seq_b: &[u8],
        model: &ScoreModel,
        mode: Mode,
    ) -> Result<AlignmentResult, AlignError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("dp_align", n = seq_a.len(), m = seq_b.len(), ?mode)
            .entered();

        model.validate(seq_a)?;
        model.validate(seq_b)?;
        let (score, alignments) = solve(seq_a, seq_b, model, mode);
        log::debug!(
            "dp: {}x{} grid, {:?} score {}, {} alignment(s)",
            seq_a.len(),
            seq_b.len(),
            mode,
            score,
            alignments.len()
        );
        Ok(AlignmentResult::new(score, alignments))
    }
}

/// Grid + backtracking without input validation; the public entry points
/// validate first. Also serves as the bounded-size base case of the
/// divide-and-conquer engine.
pub(crate) fn solve(
    seq_a: &[u8],
    seq_b: &[u8],
    model: &ScoreModel,
    mode: Mode,
) -> (i32, BTreeSet<Alignment>) {
    let grid = Grid::fill(seq_a, seq_b, model, mode);
    let (score, ends) = grid.optimal_ends(mode);
    let alignments = grid.backtrack(seq_a, seq_b, mode, &ends);
    (score, alignments)
}

/// Global-mode alignment set for a subproblem slice.
pub(crate) fn global_alignments(
    seq_a: &[u8],
    seq_b: &[u8],
    model: &ScoreModel,
) -> BTreeSet<Alignment> {
    solve(seq_a, seq_b, model, Mode::Global).1
}

/// Score grid with per-cell predecessor tie sets, exclusively owned by one
/// `align` call.
struct Grid {
    cols: usize,
    rows: usize,
    scores: Vec<i32>,
    moves: Vec<u8>,
}

impl Grid {
    fn fill(seq_a: &[u8], seq_b: &[u8], model: &ScoreModel, mode: Mode) -> Self {
        let rows = seq_a.len() + 1;
        let cols = seq_b.len() + 1;
        let indel = model.indel();
        let mut scores = vec![0i32; rows * cols];
        let mut moves = vec![0u8; rows * cols];

        if mode == Mode::Global {
            for j in 1..cols {
                scores[j] = j as i32 * indel;
                moves[j] = LEFT;
            }
            for i in 1..rows {
                scores[i * cols] = i as i32 * indel;
                moves[i * cols] = UP;
            }
        } else if indel == 0 {
            // A free gap keeps border cells reachable: the gap candidate ties
            // with the zero floor, so optimal local paths may carry leading
            // gap columns along the border.
            for j in 1..cols {
                moves[j] = LEFT;
            }
            for i in 1..rows {
                moves[i * cols] = UP;
            }
        }

        for i in 1..rows {
            for j in 1..cols {
                let diag = scores[(i - 1) * cols + (j - 1)]
                    + model.score(seq_a[i - 1], seq_b[j - 1]);
                let up = scores[(i - 1) * cols + j] + indel;
                let left = scores[i * cols + (j - 1)] + indel;

                let mut best = diag.max(up).max(left);
                if mode == Mode::Local && best < 0 {
                    best = 0;
                }

                let mut tie = 0u8;
                if diag == best {
                    tie |= DIAG;
                }
                if up == best {
                    tie |= UP;
                }
                if left == best {
                    tie |= LEFT;
                }
                scores[i * cols + j] = best;
                moves[i * cols + j] = tie;
            }
        }

        Self {
            cols,
            rows,
            scores,
            moves,
        }
    }

    #[inline]
    fn score(&self, i: usize, j: usize) -> i32 {
        self.scores[i * self.cols + j]
    }

    #[inline]
    fn tie_set(&self, i: usize, j: usize) -> u8 {
        self.moves[i * self.cols + j]
    }

    /// Optimal score plus every valid backtracking end cell.
    fn optimal_ends(&self, mode: Mode) -> (i32, Vec<(usize, usize)>) {
        match mode {
            Mode::Global => {
                let i = self.rows - 1;
                let j = self.cols - 1;
                (self.score(i, j), vec![(i, j)])
            }
            Mode::Local => {
                let best = self.scores.iter().copied().max().unwrap_or(0);
                let mut ends = Vec::new();
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        if self.score(i, j) == best {
                            ends.push((i, j));
                        }
                    }
                }
                (best, ends)
            }
        }
    }

    /// Depth-first traversal over the tie sets, iterative with an explicit
    /// stack so tie-heavy inputs cannot overflow the call stack. Columns are
    /// accumulated end-to-start and reversed on emission.
    ///
    /// Global paths emit at (0,0), the only cell with an empty tie set.
    /// Local paths emit at every zero-score cell they reach, which keeps the
    /// enumeration in lockstep with the divide-and-conquer start-cell search
    /// when an optimal path crosses a zero-score cell that still has
    /// predecessors.
    fn backtrack(
        &self,
        seq_a: &[u8],
        seq_b: &[u8],
        mode: Mode,
        ends: &[(usize, usize)],
    ) -> BTreeSet<Alignment> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<(usize, usize, Vec<(u8, u8)>)> =
            ends.iter().map(|&(i, j)| (i, j, Vec::new())).collect();

        while let Some((i, j, columns)) = stack.pop() {
            let tie = self.tie_set(i, j);
            let emit = match mode {
                Mode::Global => tie == 0,
                Mode::Local => self.score(i, j) == 0,
            };
            if emit {
                out.insert(Alignment::from_rev_columns(&columns));
            }
            if tie & DIAG != 0 {
                let mut next = columns.clone();
                next.push((seq_a[i - 1], seq_b[j - 1]));
                stack.push((i - 1, j - 1, next));
            }
            if tie & UP != 0 {
                let mut next = columns.clone();
                next.push((seq_a[i - 1], GAP));
                stack.push((i - 1, j, next));
            }
            if tie & LEFT != 0 {
                let mut next = columns;
                next.push((GAP, seq_b[j - 1]));
                stack.push((i, j - 1, next));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(
        seq_a: &[u8],
        seq_b: &[u8],
        model: &ScoreModel,
        mode: Mode,
    ) -> AlignmentResult {
        DpEngine::new().align(seq_a, seq_b, model, mode).unwrap()
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
    fn global_unique_optimum() {
        // Hand-computed: the only optimal path is AGC- / -GCT with score
        // -4 + 5 + 5 - 4 = 2.
        let model = ScoreModel::from_scalars(5, -1, -4);
        let result = align(b"AGC", b"GCT", &model, Mode::Global);
        assert_eq!(result.score(), 2);
        assert_eq!(lines(&result), vec![("AGC-".into(), "-GCT".into())]);
    }

    #[test]
    fn global_tie_enumeration() {
        // One gap slides across four equivalent positions.
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
    fn global_identical_sequences() {
        let model = ScoreModel::from_scalars(3, -1, -1);
        let result = align(b"ACGT", b"ACGT", &model, Mode::Global);
        assert_eq!(result.score(), 12);
        assert_eq!(lines(&result), vec![("ACGT".into(), "ACGT".into())]);
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
    fn local_needle_in_haystack() {
        let model = ScoreModel::from_scalars(2, -5, -5);
        let result = align(b"AAAAGTCAAAA", b"GTC", &model, Mode::Local);
        assert_eq!(result.score(), 6);
        assert_eq!(lines(&result), vec![("GTC".into(), "GTC".into())]);
    }

    #[test]
    fn table_model_rejects_unknown_symbol() {
        let model =
            ScoreModel::from_table(b"AC", &[vec![1, -1], vec![-1, 1]], -1).unwrap();
        let err = DpEngine::new()
            .align(b"AXC", b"AC", &model, Mode::Global)
            .unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput { symbol: 'X', position: 1 }));
    }
}
