//! Run orchestration: seed -> schedule -> debate -> summary -> output file.
//!
//! Shared by the binary and the integration tests. The output file is written
//! only after the summary succeeds; the diagnostic transcript, when requested,
//! is also written for cancelled runs with whatever rounds completed.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::core::schedule::{RoundLimit, Schedule};
use crate::core::types::{DebateSettings, Role, Round};
use crate::debate::{Debate, TurnRecord};
use crate::error::DebateError;
use crate::estimate::{Estimate, estimate_rounds};
use crate::io::cancel::{CancelToken, is_interrupted};
use crate::io::generator::Generator;
use crate::io::progress::ProgressSender;
use crate::io::prompt::load_seed;
use crate::io::report::{TranscriptRecord, write_summary, write_transcript};
use crate::summarize::{SummaryRequest, summarize};

/// Everything needed for one run, resolved from CLI flags and config.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub transcript: Option<PathBuf>,
    pub schedule: Schedule,
    pub settings: DebateSettings,
    pub summarizer_model: String,
    pub summary_instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub rounds: Vec<Round>,
    pub summary: String,
    /// Present when the round count was projected from a duration budget.
    pub estimate: Option<Estimate>,
}

/// Execute `plan` against `generator`.
///
/// `on_turn` first sees the seed claim as round 0, then every debate turn.
/// Schedule conflicts must already be resolved into `plan.schedule`; nothing
/// here re-validates them.
#[instrument(skip_all, fields(input = %plan.input.display(), schedule = ?plan.schedule))]
pub fn execute_plan<G, F>(
    plan: &RunPlan,
    generator: &G,
    cancel: &CancelToken,
    progress: Option<ProgressSender>,
    mut on_turn: F,
) -> Result<RunOutcome>
where
    G: Generator + ?Sized,
    F: FnMut(&TurnRecord<'_>),
{
    let seed = load_seed(&plan.input)?;
    on_turn(&TurnRecord {
        round: 0,
        role: Role::Seed,
        content: &seed,
    });

    let mut debate = Debate::new(generator, &plan.settings).with_cancel(cancel.clone());
    if let Some(sender) = progress.clone() {
        debate = debate.with_progress(sender);
    }

    let (limit, estimate) = match plan.schedule {
        Schedule::Rounds(n) => (RoundLimit::Fixed(n), None),
        Schedule::Unbounded => (RoundLimit::Unbounded, None),
        Schedule::Budget(budget) => {
            let estimate = estimate_rounds(&debate, &seed, budget)
                .inspect_err(|err| note_cancelled(plan, &seed, err))?;
            (RoundLimit::Fixed(estimate.rounds), Some(estimate))
        }
    };

    let rounds = debate
        .run(&seed, limit, on_turn)
        .inspect_err(|err| note_cancelled(plan, &seed, err))?;

    let request = SummaryRequest {
        model: &plan.summarizer_model,
        instruction: &plan.summary_instruction,
    };
    let summary = match summarize(generator, &rounds, &request, progress.as_ref()) {
        Ok(summary) => summary,
        Err(err) if is_interrupted(&err) => {
            let err = DebateError::Cancelled { completed: rounds }.into();
            note_cancelled(plan, &seed, &err);
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    if let Some(path) = &plan.transcript {
        write_transcript(path, &transcript_record(plan, &seed, &rounds, true))?;
    }
    write_summary(&plan.output, &summary)?;
    info!(output = %plan.output.display(), rounds = rounds.len(), "summary written");

    Ok(RunOutcome {
        rounds,
        summary,
        estimate,
    })
}

fn transcript_record<'a>(
    plan: &'a RunPlan,
    seed: &'a str,
    rounds: &'a [Round],
    complete: bool,
) -> TranscriptRecord<'a> {
    TranscriptRecord {
        seed,
        challenger_model: &plan.settings.challenger.model,
        defender_model: &plan.settings.defender.model,
        complete,
        rounds,
    }
}

/// Persist the partial transcript of a cancelled run, if one was requested.
fn note_cancelled(plan: &RunPlan, seed: &str, err: &anyhow::Error) {
    let Some(DebateError::Cancelled { completed }) = err.downcast_ref::<DebateError>() else {
        return;
    };
    warn!(completed_rounds = completed.len(), "run cancelled");
    let Some(path) = &plan.transcript else {
        return;
    };
    if let Err(write_err) = write_transcript(path, &transcript_record(plan, seed, completed, false))
    {
        warn!(path = %path.display(), err = %format!("{write_err:#}"), "failed to write partial transcript");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Participant;
    use crate::io::cancel::Interrupted;
    use crate::test_support::{ScriptedGenerator, debate_reply};
    use std::fs;
    use std::path::Path;

    fn plan(dir: &Path, schedule: Schedule) -> RunPlan {
        let input = dir.join("seed.md");
        fs::write(&input, "Startup X should skip paid marketing").expect("write seed");
        RunPlan {
            input,
            output: dir.join("summary.md"),
            transcript: Some(dir.join("transcript.json")),
            schedule,
            settings: DebateSettings {
                history_capacity: 10,
                challenger: Participant::new("mC", "CP"),
                defender: Participant::new("mD", "DP"),
            },
            summarizer_model: "mS".to_string(),
            summary_instruction: "Summarize.".to_string(),
        }
    }

    #[test]
    fn fixed_schedule_writes_summary_and_transcript() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plan = plan(temp.path(), Schedule::Rounds(2));
        let generator = ScriptedGenerator::debaters();

        let outcome =
            execute_plan(&plan, &generator, &CancelToken::new(), None, |_| {}).expect("run");

        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.estimate, None);
        assert_eq!(generator.call_count(), 5);
        assert_eq!(fs::read_to_string(&plan.output).expect("read"), "summary");

        let transcript: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("transcript.json")).expect("read"),
        )
        .expect("parse");
        assert_eq!(transcript["complete"], true);
        assert_eq!(transcript["rounds"][1]["challenger"], "chal-2");
    }

    #[test]
    fn budget_schedule_runs_trial_then_real_rounds() {
        let temp = tempfile::tempdir().expect("tempdir");
        // Budget below any real trial duration projects to exactly one round.
        let plan = plan(
            temp.path(),
            Schedule::Budget(std::time::Duration::from_nanos(1)),
        );
        let generator = ScriptedGenerator::debaters();

        let outcome =
            execute_plan(&plan, &generator, &CancelToken::new(), None, |_| {}).expect("run");

        let estimate = outcome.estimate.expect("estimate");
        assert_eq!(estimate.rounds, 1);
        // Trial round (2) + real round (2) + summary (1).
        assert_eq!(generator.call_count(), 5);
        assert_eq!(outcome.rounds.len(), 1);
    }

    #[test]
    fn generation_failure_leaves_no_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plan = plan(temp.path(), Schedule::Rounds(2));
        let generator = ScriptedGenerator::new(|request, index| {
            if index == 3 {
                return Ok(String::new());
            }
            Ok(debate_reply(request, index))
        });

        let err = execute_plan(&plan, &generator, &CancelToken::new(), None, |_| {}).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DebateError>(),
            Some(DebateError::Generation { .. })
        ));
        assert!(!plan.output.exists());
        assert!(!temp.path().join("transcript.json").exists());
    }

    #[test]
    fn missing_seed_is_input_unavailable_before_any_call() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut plan = plan(temp.path(), Schedule::Rounds(1));
        plan.input = temp.path().join("missing.md");
        let generator = ScriptedGenerator::debaters();

        let err = execute_plan(&plan, &generator, &CancelToken::new(), None, |_| {}).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DebateError>(),
            Some(DebateError::InputUnavailable { .. })
        ));
        assert_eq!(generator.call_count(), 0);
    }

    #[test]
    fn cancelled_summary_keeps_partial_transcript() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plan = plan(temp.path(), Schedule::Rounds(1));
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let generator = ScriptedGenerator::new(move |request, index| {
            if index == 2 {
                trigger.cancel();
                return Err(Interrupted.into());
            }
            Ok(debate_reply(request, index))
        });

        let err = execute_plan(&plan, &generator, &cancel, None, |_| {}).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DebateError>(),
            Some(DebateError::Cancelled { completed }) if completed.len() == 1
        ));
        assert!(!plan.output.exists());
        let transcript: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("transcript.json")).expect("read"),
        )
        .expect("parse");
        assert_eq!(transcript["complete"], false);
        assert_eq!(transcript["rounds"][0]["defender"], "def-1");
    }
}
