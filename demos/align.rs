//! Align two short sequences with both engines and print every optimal
//! alignment.
//!
//! Run with:
//! `cargo run --example align`

use enumalign::{AlignEngine, AlignError, DcEngine, DpEngine, Mode, ScoreModel};

fn main() -> Result<(), AlignError> {
    env_logger::init();

    let seq_a = b"GATTACA";
    let seq_b = b"GCATGCT";
    let model = ScoreModel::from_scalars(1, -1, -1);

    println!("sequences: GATTACA vs GCATGCT");
    println!("scoring: match +1, mismatch -1, indel -1");
    println!();

    let global = DpEngine::new().align(seq_a, seq_b, &model, Mode::Global)?;
    println!("global (full grid):");
    println!("{global}");
    println!();

    let local = DcEngine::new().align(seq_a, seq_b, &model, Mode::Local)?;
    println!("local (divide and conquer):");
    println!("{local}");

    Ok(())
}
