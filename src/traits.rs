//! The engine contract.
//!
//! [`DpEngine`](crate::dp::DpEngine) and [`DcEngine`](crate::dc::DcEngine)
//! are two independent implementations of this one interface, not a shared
//! base with variants. Either can stand in for the other, and the test suite
//! cross-validates them: for the same inputs they must return the same
//! optimal score and the same set of optimal alignments.

use crate::alignment::{AlignmentResult, Mode};
use crate::error::AlignError;
use crate::score::ScoreModel;

/// An exhaustive optimal-alignment engine.
pub trait AlignEngine {
    /// Align `seq_a` against `seq_b` under `model`, returning the optimal
    /// score and every distinct optimal alignment.
    ///
    /// Empty sequences are valid input: global alignment degenerates to an
    /// all-gap line, local alignment to the empty alignment with score 0.
    ///
    /// # Errors
    /// [`AlignError::InvalidInput`] if a sequence symbol has no score entry;
    /// both engines fail identically on identical input.
    fn align(
        &self,
        seq_a: &[u8],
        seq_b: &[u8],
        model: &ScoreModel,
        mode: Mode,
    ) -> Result<AlignmentResult, AlignError>;
}
