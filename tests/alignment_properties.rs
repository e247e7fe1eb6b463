//! Structural properties every result must satisfy, independent of which
//! engine produced it: gap-stripping reconstructs the inputs, every reported
//! alignment rescoring to the reported optimum, symmetry under swapping the
//! sequences, and deterministic ordering.

use enumalign::{Alignment, AlignEngine, DcEngine, DpEngine, Mode, ScoreModel, GAP};
use proptest::prelude::*;

fn rescore(alignment: &Alignment, model: &ScoreModel) -> i32 {
    alignment
        .seq_a()
        .iter()
        .zip(alignment.seq_b())
        .map(|(&a, &b)| {
            if a == GAP || b == GAP {
                model.indel()
            } else {
                model.score(a, b)
            }
        })
        .sum()
}

fn is_substring(needle: &[u8], haystack: &[u8]) -> bool {
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

fn check_result(a: &[u8], b: &[u8], model: &ScoreModel, mode: Mode, engine: &dyn AlignEngine) {
    let result = engine.align(a, b, model, mode).unwrap();
    assert!(!result.is_empty(), "at least one optimal alignment exists");

    for pair in result.alignments().windows(2) {
        assert!(pair[0] < pair[1], "alignments sorted without duplicates");
    }

    for alignment in result.alignments() {
        assert_eq!(alignment.seq_a().len(), alignment.seq_b().len());
        for (&ca, &cb) in alignment.seq_a().iter().zip(alignment.seq_b()) {
            assert!(ca != GAP || cb != GAP, "no column may pair two gaps");
        }
        assert_eq!(rescore(alignment, model), result.score());
        match mode {
            Mode::Global => {
                assert_eq!(alignment.ungapped_a(), a);
                assert_eq!(alignment.ungapped_b(), b);
            }
            Mode::Local => {
                assert!(is_substring(&alignment.ungapped_a(), a));
                assert!(is_substring(&alignment.ungapped_b(), b));
            }
        }
    }

    if mode == Mode::Local {
        assert!(result.score() >= 0);
        let global = engine.align(a, b, model, Mode::Global).unwrap();
        assert!(result.score() >= global.score());
    }
}

proptest! {
    #[test]
    fn results_are_well_formed(a in "[ACGT]{0,7}", b in "[ACGT]{0,7}") {
        let model = ScoreModel::from_scalars(2, -1, -2);
        for engine in [&DpEngine::new() as &dyn AlignEngine, &DcEngine::new()] {
            for mode in [Mode::Global, Mode::Local] {
                check_result(a.as_bytes(), b.as_bytes(), &model, mode, engine);
            }
        }
    }

    #[test]
    fn swapping_inputs_mirrors_the_result(a in "[ACGT]{0,7}", b in "[ACGT]{0,7}") {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let engine = DpEngine::new();
        for mode in [Mode::Global, Mode::Local] {
            let forward = engine.align(a.as_bytes(), b.as_bytes(), &model, mode).unwrap();
            let reverse = engine.align(b.as_bytes(), a.as_bytes(), &model, mode).unwrap();
            prop_assert_eq!(forward.score(), reverse.score());
            let mut mirrored: Vec<Alignment> =
                reverse.alignments().iter().map(Alignment::swapped).collect();
            mirrored.sort();
            prop_assert_eq!(forward.alignments(), mirrored.as_slice());
        }
    }

    #[test]
    fn repeated_runs_are_identical(a in "[ACGT]{0,7}", b in "[ACGT]{0,7}") {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let engine = DcEngine::new();
        for mode in [Mode::Global, Mode::Local] {
            let first = engine.align(a.as_bytes(), b.as_bytes(), &model, mode).unwrap();
            let second = engine.align(a.as_bytes(), b.as_bytes(), &model, mode).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn appending_matching_symbols_never_hurts(a in "[ACGT]{0,7}", b in "[ACGT]{0,7}") {
        let model = ScoreModel::from_scalars(1, -1, -1);
        let engine = DpEngine::new();
        let base = engine.align(a.as_bytes(), b.as_bytes(), &model, Mode::Global).unwrap();
        let mut a_ext = a.clone().into_bytes();
        a_ext.push(b'A');
        let mut b_ext = b.clone().into_bytes();
        b_ext.push(b'A');
        let extended = engine.align(&a_ext, &b_ext, &model, Mode::Global).unwrap();
        prop_assert!(extended.score() >= base.score());
    }
}
