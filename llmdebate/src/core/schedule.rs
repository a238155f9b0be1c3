//! Round scheduling: fixed count, wall-clock budget, or unbounded.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::DebateError;

/// How many rounds a run should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Exactly this many rounds (always >= 1).
    Rounds(u32),
    /// As many rounds as a single timed trial round projects into the budget.
    Budget(Duration),
    /// Until the run is cancelled.
    Unbounded,
}

/// Upper bound on rounds for one debate loop invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLimit {
    Fixed(u32),
    Unbounded,
}

impl RoundLimit {
    pub fn allows(self, completed: u32) -> bool {
        match self {
            RoundLimit::Fixed(limit) => completed < limit,
            RoundLimit::Unbounded => true,
        }
    }
}

/// Combine the round-count and duration options into a [`Schedule`].
///
/// `rounds == 0` means "not set". Setting both is a configuration error; a
/// malformed duration is an estimation error.
pub fn resolve_schedule(rounds: u32, duration: Option<&str>) -> Result<Schedule, DebateError> {
    let duration = duration.map(str::trim).filter(|d| !d.is_empty());
    match (rounds, duration) {
        (0, None) => Ok(Schedule::Unbounded),
        (0, Some(raw)) => parse_budget(raw).map(Schedule::Budget),
        (n, None) => Ok(Schedule::Rounds(n)),
        (_, Some(_)) => Err(DebateError::configuration(
            "--rounds and --duration cannot be used together",
        )),
    }
}

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)").expect("duration term regex")
});

/// Parse a budget such as `90s`, `2m`, `1h30m` or `1.5h`.
pub fn parse_budget(raw: &str) -> Result<Duration, DebateError> {
    let invalid = || DebateError::Estimation(format!("invalid duration {raw:?}"));
    let input = raw.trim();
    if input.is_empty() {
        return Err(invalid());
    }

    let mut consumed = 0;
    let mut total_nanos = 0f64;
    for caps in TERM_RE.captures_iter(input) {
        let whole = caps.get(0).ok_or_else(invalid)?;
        if whole.start() != consumed {
            return Err(invalid());
        }
        consumed = whole.end();
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let unit_nanos = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        total_nanos += value * unit_nanos;
    }
    if consumed != input.len() {
        return Err(invalid());
    }

    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    let budget = Duration::from_nanos(total_nanos.round() as u64);
    if budget.is_zero() {
        return Err(DebateError::Estimation(format!(
            "duration {raw:?} must be greater than zero"
        )));
    }
    Ok(budget)
}

/// Project how many rounds fit into `budget` given one measured round.
///
/// A zero measurement counts as one millisecond; the result is at least 1.
pub fn rounds_for_budget(budget: Duration, trial: Duration) -> u32 {
    let trial = trial.max(Duration::from_millis(1));
    let rounds = budget.as_nanos() / trial.as_nanos();
    u32::try_from(rounds).unwrap_or(u32::MAX).max(1)
}
