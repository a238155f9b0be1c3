//! Round estimation for duration-bounded runs.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::schedule::{RoundLimit, rounds_for_budget};
use crate::debate::Debate;
use crate::io::generator::Generator;

/// Outcome of one timed trial round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub rounds: u32,
    pub trial: Duration,
}

/// Time one throwaway round from a fresh context and project it into `budget`.
///
/// The trial's turns are discarded; the real run starts over from the seed.
/// Failures of the trial round propagate unchanged.
#[instrument(skip_all, fields(budget = ?budget))]
pub fn estimate_rounds<G: Generator + ?Sized>(
    debate: &Debate<'_, G>,
    seed: &str,
    budget: Duration,
) -> Result<Estimate> {
    let started = Instant::now();
    debate.run(seed, RoundLimit::Fixed(1), |_| {})?;
    let trial = started.elapsed();

    let rounds = rounds_for_budget(budget, trial);
    info!(trial_ms = trial.as_millis() as u64, rounds, "estimated rounds for budget");
    Ok(Estimate { rounds, trial })
}
