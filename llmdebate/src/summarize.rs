//! Final reduction of the completed rounds into one summary text.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::types::{Role, Round, Turn};
use crate::io::generator::Generator;
use crate::io::progress::{ProgressEvent, ProgressSender, notify};
use crate::io::prompt::PromptEngine;
use crate::turn::{TurnRequest, execute_turn};

pub const SUMMARY_STAGE: &str = "summary";

#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub model: &'a str,
    /// System text for the summary call, sent as-is.
    pub instruction: &'a str,
}

/// Serialize every round and issue exactly one summary call.
///
/// The transcript travels as a single synthetic `system` turn; no chunking.
#[instrument(skip_all, fields(model = request.model, rounds = rounds.len()))]
pub fn summarize<G: Generator + ?Sized>(
    generator: &G,
    rounds: &[Round],
    request: &SummaryRequest<'_>,
    progress: Option<&ProgressSender>,
) -> Result<String> {
    let transcript = PromptEngine::new().summary_transcript(rounds)?;
    let synthetic = Turn::new(Role::System, transcript);

    notify(
        progress,
        ProgressEvent::Started {
            label: SUMMARY_STAGE.to_string(),
        },
    );
    let result = execute_turn(
        generator,
        &TurnRequest {
            stage: SUMMARY_STAGE,
            model: request.model,
            system: request.instruction,
            view: &[&synthetic],
        },
    );
    notify(progress, ProgressEvent::Finished);

    let summary = result?;
    info!(chars = summary.len(), "summary complete");
    Ok(summary)
}
