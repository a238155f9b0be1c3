//! Turn executor: one context view plus one role instruction in, one
//! non-empty generated text out.

use anyhow::{Result, anyhow};
use tracing::{debug, instrument};

use crate::core::transcript::render_context;
use crate::core::types::Turn;
use crate::error::DebateError;
use crate::io::cancel::is_interrupted;
use crate::io::generator::{GenerationRequest, Generator};

/// Parameters for a single turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnRequest<'a> {
    /// Human-readable position of the turn, e.g. `round 2 defender`.
    pub stage: &'a str,
    pub model: &'a str,
    /// Instruction passed as system content.
    pub system: &'a str,
    /// Context in window order.
    pub view: &'a [&'a Turn],
}

/// Render the view, call the backend once, and reject empty output.
///
/// Backend errors and empty replies become [`DebateError::Generation`];
/// interrupts pass through untouched. No retries.
#[instrument(skip_all, fields(stage = request.stage, model = request.model, context_turns = request.view.len()))]
pub fn execute_turn<G: Generator + ?Sized>(
    generator: &G,
    request: &TurnRequest<'_>,
) -> Result<String> {
    let prompt = render_context(request.view);
    let generation = GenerationRequest {
        model: request.model,
        system: request.system,
        prompt: &prompt,
    };

    let text = match generator.generate(&generation) {
        Ok(text) => text,
        Err(err) if is_interrupted(&err) => return Err(err),
        Err(err) => return Err(DebateError::generation(request.stage, err).into()),
    };
    if text.trim().is_empty() {
        return Err(DebateError::generation(request.stage, anyhow!("empty response")).into());
    }

    debug!(chars = text.len(), "turn generated");
    Ok(text)
}
