//! Scoring scheme for symbol pairs plus a single indel penalty.
//!
//! A [`ScoreModel`] is a pure lookup: `score(a, b)` for aligned symbol pairs
//! and `indel()` for a gap against either sequence. Two construction routes
//! exist:
//! - [`ScoreModel::from_scalars`]: uniform match/mismatch/indel scores,
//!   defined for every symbol pair.
//! - [`ScoreModel::from_table`]: a dense alphabet × alphabet table, optionally
//!   with a default mismatch score for pairs outside the alphabet.
//!
//! Table models can also be loaded from the persisted text format: the first
//! row enumerates the alphabet with a trailing `-` column, interior cells are
//! pairwise substitution scores, and the `-` row/column carries the indel
//! penalty (all `-` entries must agree, since the model has a single indel
//! penalty).
//!
//! Symmetry (`score(a, b) == score(b, a)`) is a documented expectation of
//! most scoring tables, not a runtime requirement.

use std::fs;
use std::path::Path;

use crate::alignment::GAP;
use crate::error::AlignError;

const NO_INDEX: u16 = u16::MAX;

/// Substitution scores plus a single indel penalty.
///
/// The indel penalty is expected to be zero or negative. A positive penalty
/// makes gap runs profitable, which local mode's zero floor cannot represent.
#[derive(Clone, Debug)]
pub struct ScoreModel {
    kind: Kind,
    indel: i32,
}

#[derive(Clone, Debug)]
enum Kind {
    Scalars {
        matched: i32,
        mismatched: i32,
    },
    Table {
        alphabet: Vec<u8>,
        index: [u16; 256],
        matrix: Vec<i32>,
        default_mismatch: Option<i32>,
    },
}

impl ScoreModel {
    /// Uniform scoring: `matched` for equal symbols, `mismatched` otherwise.
    /// Defined for every symbol pair, so any sequence validates.
    pub fn from_scalars(matched: i32, mismatched: i32, indel: i32) -> Self {
        Self {
            kind: Kind::Scalars {
                matched,
                mismatched,
            },
            indel,
        }
    }

    /// Dense table over an explicit alphabet. `matrix[i][j]` scores
    /// `(alphabet[i], alphabet[j])`. Pairs outside the alphabet have no
    /// score; sequences containing such symbols are rejected by
    /// [`validate`](Self::validate).
    pub fn from_table(alphabet: &[u8], matrix: &[Vec<i32>], indel: i32) -> Result<Self, AlignError> {
        Self::build_table(alphabet, matrix, indel, None)
    }

    /// Like [`from_table`](Self::from_table), but symbol pairs outside the
    /// alphabet fall back to `default_mismatch` instead of being rejected.
    pub fn from_table_with_default(
        alphabet: &[u8],
        matrix: &[Vec<i32>],
        indel: i32,
        default_mismatch: i32,
    ) -> Result<Self, AlignError> {
        Self::build_table(alphabet, matrix, indel, Some(default_mismatch))
    }

    fn build_table(
        alphabet: &[u8],
        matrix: &[Vec<i32>],
        indel: i32,
        default_mismatch: Option<i32>,
    ) -> Result<Self, AlignError> {
        if alphabet.is_empty() {
            return Err(AlignError::Configuration("empty alphabet".into()));
        }
        if alphabet.contains(&GAP) {
            return Err(AlignError::Configuration(
                "the gap marker '-' cannot be an alphabet symbol".into(),
            ));
        }
        if matrix.len() != alphabet.len() {
            return Err(AlignError::Configuration(format!(
                "score table has {} rows for {} alphabet symbols",
                matrix.len(),
                alphabet.len()
            )));
        }
        let mut index = [NO_INDEX; 256];
        for (i, &symbol) in alphabet.iter().enumerate() {
            if index[symbol as usize] != NO_INDEX {
                return Err(AlignError::Configuration(format!(
                    "duplicate alphabet symbol '{}'",
                    symbol as char
                )));
            }
            index[symbol as usize] = i as u16;
        }
        let mut flat = Vec::with_capacity(alphabet.len() * alphabet.len());
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != alphabet.len() {
                return Err(AlignError::Configuration(format!(
                    "score table row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    alphabet.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        Ok(Self {
            kind: Kind::Table {
                alphabet: alphabet.to_vec(),
                index,
                matrix: flat,
                default_mismatch,
            },
            indel,
        })
    }

    /// Load a table model from the persisted text format.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AlignError> {
        let text = fs::read_to_string(path)?;
        Self::parse_table(&text)
    }

    /// Parse the persisted text format:
    ///
    /// ```text
    ///         A       C       G       T       -
    /// A       1       -1      -2      -3      -4
    /// C       -1      6       -3      -4      -4
    /// G       -2      -3      5       -5      -4
    /// T       -3      -4      -5      4       -4
    /// -       -4      -4      -4      -4
    /// ```
    ///
    /// The `-` row/column holds the indel penalty; the `(-, -)` cell is
    /// absent. All `-` entries must agree.
    pub fn parse_table(text: &str) -> Result<Self, AlignError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(no, line)| (no + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (header_no, header) = lines.next().ok_or(AlignError::MatrixFormat {
            line: 1,
            reason: "empty score matrix".into(),
        })?;
        let mut symbols = Vec::new();
        for token in header.split_whitespace() {
            let bytes = token.as_bytes();
            if bytes.len() != 1 {
                return Err(AlignError::MatrixFormat {
                    line: header_no,
                    reason: format!("alphabet symbol '{token}' is not a single character"),
                });
            }
            symbols.push(bytes[0]);
        }
        let gap_col = symbols
            .iter()
            .position(|&s| s == GAP)
            .ok_or(AlignError::MatrixFormat {
                line: header_no,
                reason: "header is missing the '-' indel column".into(),
            })?;
        if gap_col != symbols.len() - 1 {
            return Err(AlignError::MatrixFormat {
                line: header_no,
                reason: "the '-' indel column must come last".into(),
            });
        }
        let alphabet: Vec<u8> = symbols[..gap_col].to_vec();

        let mut rows: Vec<Option<Vec<i32>>> = vec![None; alphabet.len()];
        let mut indel: Option<i32> = None;

        for (line_no, line) in lines {
            let mut tokens = line.split_whitespace();
            let label = tokens.next().unwrap_or_default();
            let label = match label.as_bytes() {
                [b] => *b,
                _ => {
                    return Err(AlignError::MatrixFormat {
                        line: line_no,
                        reason: format!("row label '{label}' is not a single character"),
                    })
                }
            };
            let mut scores = Vec::new();
            for token in tokens {
                let value = token.parse::<i32>().map_err(|_| AlignError::MatrixFormat {
                    line: line_no,
                    reason: format!("'{token}' is not an integer score"),
                })?;
                scores.push(value);
            }

            if label == GAP {
                // The (-, -) cell may be absent.
                if scores.len() != alphabet.len() && scores.len() != alphabet.len() + 1 {
                    return Err(AlignError::MatrixFormat {
                        line: line_no,
                        reason: format!(
                            "'-' row has {} entries, expected {}",
                            scores.len(),
                            alphabet.len()
                        ),
                    });
                }
                for &value in scores.iter().take(alphabet.len()) {
                    merge_indel(&mut indel, value)?;
                }
                continue;
            }

            let row_idx =
                alphabet
                    .iter()
                    .position(|&s| s == label)
                    .ok_or(AlignError::MatrixFormat {
                        line: line_no,
                        reason: format!("row symbol '{}' not in header", label as char),
                    })?;
            if scores.len() != symbols.len() {
                return Err(AlignError::MatrixFormat {
                    line: line_no,
                    reason: format!(
                        "row '{}' has {} entries, expected {}",
                        label as char,
                        scores.len(),
                        symbols.len()
                    ),
                });
            }
            merge_indel(&mut indel, scores[gap_col])?;
            if rows[row_idx].is_some() {
                return Err(AlignError::MatrixFormat {
                    line: line_no,
                    reason: format!("duplicate row for symbol '{}'", label as char),
                });
            }
            rows[row_idx] = Some(scores[..gap_col].to_vec());
        }

        let indel = indel.ok_or(AlignError::Configuration(
            "score matrix defines no indel penalty".into(),
        ))?;
        let mut matrix = Vec::with_capacity(alphabet.len());
        for (idx, row) in rows.into_iter().enumerate() {
            match row {
                Some(scores) => matrix.push(scores),
                None => {
                    return Err(AlignError::Configuration(format!(
                        "score matrix is missing the row for '{}'",
                        alphabet[idx] as char
                    )))
                }
            }
        }
        Self::from_table(&alphabet, &matrix, indel)
    }

    /// Substitution score for a symbol pair.
    ///
    /// Sequences must have passed [`validate`](Self::validate) first; for
    /// table models without a default, unvalidated symbols are a contract
    /// violation.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        match &self.kind {
            Kind::Scalars {
                matched,
                mismatched,
            } => {
                if a == b {
                    *matched
                } else {
                    *mismatched
                }
            }
            Kind::Table {
                alphabet,
                index,
                matrix,
                default_mismatch,
            } => {
                let i = index[a as usize];
                let j = index[b as usize];
                if i != NO_INDEX && j != NO_INDEX {
                    matrix[i as usize * alphabet.len() + j as usize]
                } else {
                    default_mismatch.expect("sequences must be validated before scoring")
                }
            }
        }
    }

    /// The gap penalty, applied identically for insertions and deletions.
    #[inline]
    pub fn indel(&self) -> i32 {
        self.indel
    }

    /// Check that every symbol of `seq` has a score entry.
    ///
    /// Scalar models and table models with a default accept everything;
    /// plain table models reject the first out-of-alphabet symbol.
    pub fn validate(&self, seq: &[u8]) -> Result<(), AlignError> {
        if let Kind::Table {
            index,
            default_mismatch: None,
            ..
        } = &self.kind
        {
            for (position, &symbol) in seq.iter().enumerate() {
                if index[symbol as usize] == NO_INDEX {
                    return Err(AlignError::InvalidInput {
                        symbol: symbol as char,
                        position,
                    });
                }
            }
        }
        Ok(())
    }
}

fn merge_indel(indel: &mut Option<i32>, value: i32) -> Result<(), AlignError> {
    match *indel {
        None => {
            *indel = Some(value);
            Ok(())
        }
        Some(existing) if existing == value => Ok(()),
        Some(existing) => Err(AlignError::Configuration(format!(
            "inconsistent indel penalties in '-' row/column: {existing} and {value}"
        ))),
    }
}
