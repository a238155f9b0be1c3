//! Debate loop: alternating Challenger/Defender turns over a shared,
//! seed-anchored context window.
//!
//! Each round runs the Challenger over the current window, appends its turn,
//! then runs the Defender over the refreshed window. A round is recorded only
//! once both halves succeed. Any failure aborts the whole run; an interrupt
//! surfaces as [`DebateError::Cancelled`] with the rounds completed so far.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::schedule::RoundLimit;
use crate::core::types::{DebateSettings, Role, Round, Turn};
use crate::core::window::ContextWindow;
use crate::error::DebateError;
use crate::io::cancel::{CancelToken, is_interrupted};
use crate::io::generator::Generator;
use crate::io::progress::{ProgressEvent, ProgressSender, notify};
use crate::io::prompt::PromptEngine;
use crate::turn::{TurnRequest, execute_turn};

/// A turn that was just appended to the context, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRecord<'a> {
    /// 1-based round number; 0 when the seed claim is reported at run start.
    pub round: u32,
    pub role: Role,
    pub content: &'a str,
}

pub struct Debate<'a, G: Generator + ?Sized> {
    generator: &'a G,
    settings: &'a DebateSettings,
    prompts: PromptEngine,
    cancel: CancelToken,
    progress: Option<ProgressSender>,
}

/// Rendered system text for both sides, computed once per run.
struct Systems {
    challenger: String,
    defender: String,
}

impl<'a, G: Generator + ?Sized> Debate<'a, G> {
    pub fn new(generator: &'a G, settings: &'a DebateSettings) -> Self {
        Self {
            generator,
            settings,
            prompts: PromptEngine::new(),
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run rounds from a fresh context seeded with `seed` until `limit` is reached.
    ///
    /// `on_turn` sees every turn right after it is appended; it cannot affect the run.
    #[instrument(skip_all, fields(limit = ?limit, capacity = self.settings.history_capacity))]
    pub fn run<F: FnMut(&TurnRecord<'_>)>(
        &self,
        seed: &str,
        limit: RoundLimit,
        mut on_turn: F,
    ) -> Result<Vec<Round>> {
        let systems = Systems {
            challenger: self
                .prompts
                .debater_system(Role::Challenger, &self.settings.challenger.instruction)?,
            defender: self
                .prompts
                .debater_system(Role::Defender, &self.settings.defender.instruction)?,
        };
        let mut window = ContextWindow::new(Turn::seed(seed), self.settings.history_capacity);
        let mut rounds = Vec::new();
        info!("starting debate");

        let mut completed = 0u32;
        while limit.allows(completed) {
            let number = completed.saturating_add(1);
            match self.play_round(&mut window, number, &systems, &mut on_turn) {
                Ok(round) => rounds.push(round),
                Err(err) if is_interrupted(&err) => {
                    info!(completed_rounds = rounds.len(), "debate cancelled");
                    return Err(DebateError::Cancelled { completed: rounds }.into());
                }
                Err(err) => return Err(err),
            }
            completed = number;
        }

        info!(rounds = rounds.len(), "debate complete");
        Ok(rounds)
    }

    fn play_round<F: FnMut(&TurnRecord<'_>)>(
        &self,
        window: &mut ContextWindow,
        number: u32,
        systems: &Systems,
        on_turn: &mut F,
    ) -> Result<Round> {
        let challenger = &self.settings.challenger;
        let challenger_text = self.take_turn(
            window,
            number,
            Role::Challenger,
            &challenger.model,
            &systems.challenger,
        )?;
        on_turn(&TurnRecord {
            round: number,
            role: Role::Challenger,
            content: &challenger_text,
        });

        let defender = &self.settings.defender;
        let defender_text = self.take_turn(
            window,
            number,
            Role::Defender,
            &defender.model,
            &systems.defender,
        )?;
        on_turn(&TurnRecord {
            round: number,
            role: Role::Defender,
            content: &defender_text,
        });

        Ok(Round {
            challenger: challenger_text,
            defender: defender_text,
        })
    }

    fn take_turn(
        &self,
        window: &mut ContextWindow,
        number: u32,
        role: Role,
        model: &str,
        system: &str,
    ) -> Result<String> {
        self.cancel.check()?;
        let stage = format!("round {number} {role}");
        notify(
            self.progress.as_ref(),
            ProgressEvent::Started {
                label: stage.clone(),
            },
        );

        // One slot beyond capacity is reserved for the seed.
        let view = window.trimmed(window.capacity().saturating_add(1));
        let result = execute_turn(
            self.generator,
            &TurnRequest {
                stage: &stage,
                model,
                system,
                view: &view,
            },
        );
        notify(self.progress.as_ref(), ProgressEvent::Finished);
        let text = result?;

        info!(round = number, role = %role, chars = text.len(), "turn complete");
        window.append(Turn::new(role, text.clone()));
        Ok(text)
    }
}
