//! Exhaustive pairwise sequence alignment.
//!
//! Most aligners report one optimal alignment. This crate reports all of
//! them: `align()` returns the optimal score together with the complete,
//! deduplicated, lexicographically sorted set of optimal alignments, in
//! global (Needleman-Wunsch) or local (Smith-Waterman) mode under a
//! substitution score model with a single linear gap penalty.
//!
//! Two engines implement the same [`AlignEngine`] contract:
//! - [`DpEngine`]: the classic quadratic-space grid with per-cell
//!   predecessor tie sets and full backtracking.
//! - [`DcEngine`]: Hirschberg-style divide and conquer that keeps only two
//!   score rows per recursion level.
//!
//! The two are interchangeable and cross-checked against each other: for any
//! input they return equal results, so each acts as an executable oracle for
//! the other.
//!
//! # Quick start
//!
//! ```
//! use enumalign::{AlignEngine, DpEngine, Mode, ScoreModel};
//!
//! let model = ScoreModel::from_scalars(1, -1, -1);
//! let result = DpEngine::new().align(b"AAAA", b"AAA", &model, Mode::Global)?;
//!
//! assert_eq!(result.score(), 2);
//! // The single gap slides across four equivalent positions.
//! assert_eq!(result.len(), 4);
//! # Ok::<(), enumalign::AlignError>(())
//! ```
//!
//! # Feature flags
//!
//! - `parallel`: splits large divide-and-conquer subproblems onto a rayon
//!   pool.
//! - `tracing`: emits `tracing` spans around engine entry points in addition
//!   to the always-on `log` statements.

pub mod alignment;
pub mod dc;
pub mod dp;
pub mod error;
pub mod score;
pub mod traits;

pub use alignment::{Alignment, AlignmentResult, Mode, GAP};
pub use dc::DcEngine;
pub use dp::DpEngine;
pub use error::AlignError;
pub use score::ScoreModel;
pub use traits::AlignEngine;
