//! Output contract shared by both engines: alignment mode, a single gapped
//! alignment, and the deduplicated set of all optimal alignments.
//!
//! An [`Alignment`] is a pair of equal-length byte strings over the input
//! alphabet plus the gap marker `-`. Removing the gaps from either line
//! reconstructs the corresponding input sequence (global mode) or a
//! contiguous substring of it (local mode).
//!
//! [`AlignmentResult`] carries the optimal score and every distinct optimal
//! alignment, sorted lexicographically so that repeated runs and different
//! engines produce byte-identical output.

use std::collections::BTreeSet;
use std::fmt;

/// Gap marker inserted into aligned sequences. Not a valid alphabet symbol.
pub const GAP: u8 = b'-';

/// Alignment semantics selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Needleman–Wunsch: the alignment spans both sequences end to end.
    Global,
    /// Smith–Waterman: best-scoring substring pair, recurrence floored at 0.
    Local,
}

/// One gapped alignment of two sequences.
///
/// Ordering is lexicographic on `(seq_a, seq_b)`, which gives result sets a
/// deterministic order and makes deduplication a set insertion.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment {
    seq_a: Vec<u8>,
    seq_b: Vec<u8>,
}

impl Alignment {
    /// Build an alignment from two gapped lines of equal length.
    pub fn new(seq_a: Vec<u8>, seq_b: Vec<u8>) -> Self {
        debug_assert_eq!(seq_a.len(), seq_b.len(), "gapped lines must match");
        Self { seq_a, seq_b }
    }

    /// Build an alignment from aligned columns listed end-to-start, as they
    /// come out of a backtracking pass.
    pub(crate) fn from_rev_columns(columns: &[(u8, u8)]) -> Self {
        let mut seq_a = Vec::with_capacity(columns.len());
        let mut seq_b = Vec::with_capacity(columns.len());
        for &(a, b) in columns.iter().rev() {
            seq_a.push(a);
            seq_b.push(b);
        }
        Self { seq_a, seq_b }
    }

    /// Concatenate two partial alignments column-for-column.
    pub(crate) fn concat(&self, right: &Alignment) -> Self {
        let mut seq_a = Vec::with_capacity(self.len() + right.len());
        let mut seq_b = Vec::with_capacity(self.len() + right.len());
        seq_a.extend_from_slice(&self.seq_a);
        seq_a.extend_from_slice(&right.seq_a);
        seq_b.extend_from_slice(&self.seq_b);
        seq_b.extend_from_slice(&right.seq_b);
        Self { seq_a, seq_b }
    }

    /// Gapped first line.
    pub fn seq_a(&self) -> &[u8] {
        &self.seq_a
    }

    /// Gapped second line.
    pub fn seq_b(&self) -> &[u8] {
        &self.seq_b
    }

    /// Number of aligned columns.
    pub fn len(&self) -> usize {
        self.seq_a.len()
    }

    /// True for the empty alignment (the optimal local alignment of
    /// dissimilar sequences).
    pub fn is_empty(&self) -> bool {
        self.seq_a.is_empty()
    }

    /// First line with gaps removed.
    pub fn ungapped_a(&self) -> Vec<u8> {
        self.seq_a.iter().copied().filter(|&c| c != GAP).collect()
    }

    /// Second line with gaps removed.
    pub fn ungapped_b(&self) -> Vec<u8> {
        self.seq_b.iter().copied().filter(|&c| c != GAP).collect()
    }

    /// Mirror image: swap the two lines.
    pub fn swapped(&self) -> Self {
        Self {
            seq_a: self.seq_b.clone(),
            seq_b: self.seq_a.clone(),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", String::from_utf8_lossy(&self.seq_a))?;
        write!(f, "{}", String::from_utf8_lossy(&self.seq_b))
    }
}

/// The optimal score and every distinct alignment achieving it.
///
/// Constructed once per `align()` call and immutable afterwards. Alignments
/// are deduplicated and sorted; two results from different engines compare
/// equal exactly when score and alignment sets agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentResult {
    score: i32,
    alignments: Vec<Alignment>,
}

impl AlignmentResult {
    pub(crate) fn new(score: i32, alignments: BTreeSet<Alignment>) -> Self {
        Self {
            score,
            alignments: alignments.into_iter().collect(),
        }
    }

    /// The shared optimal score.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// All distinct optimal alignments, in lexicographic order.
    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Number of distinct optimal alignments.
    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }
}

impl fmt::Display for AlignmentResult {
    /// Numbered listing of every optimal alignment, followed by a count.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alignment) in self.alignments.iter().enumerate() {
            writeln!(f, "alignment {}:", i + 1)?;
            writeln!(f, "{alignment}")?;
        }
        write!(
            f,
            "{} alignment(s) with score {}",
            self.alignments.len(),
            self.score
        )
    }
}
