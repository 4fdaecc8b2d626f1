//! The `quizdesk tier` command.

use anyhow::Result;

use quizdesk_core::tier::{format_score, ResultTier};

pub fn execute(score: f64) -> Result<()> {
    anyhow::ensure!(
        (0.0..=100.0).contains(&score),
        "score must be between 0 and 100"
    );
    let tier = ResultTier::from_score(score);
    println!("{}: {} ({})", format_score(score), tier, tier.message());
    Ok(())
}
