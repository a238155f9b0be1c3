//! Domain failures surfaced to the CLI.
//!
//! Everything is carried through `anyhow::Error`; callers recover the kind with
//! `err.downcast_ref::<DebateError>()` to choose an exit code.

use std::fmt;
use std::path::PathBuf;

use crate::core::types::Round;
use crate::exit_codes;

#[derive(Debug)]
pub enum DebateError {
    /// Invalid or contradictory options, detected before any generation.
    Configuration(String),
    /// The seed claim could not be read.
    InputUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A backend call failed or produced no text.
    Generation {
        stage: String,
        source: anyhow::Error,
    },
    /// The wall-clock budget could not be parsed.
    Estimation(String),
    /// The run was interrupted; holds the rounds completed before the interrupt.
    Cancelled { completed: Vec<Round> },
}

impl DebateError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn generation(stage: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Generation {
            stage: stage.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::InputUnavailable { .. } | Self::Estimation(_) => {
                exit_codes::CONFIG
            }
            Self::Generation { .. } => exit_codes::FAILURE,
            Self::Cancelled { .. } => exit_codes::INTERRUPTED,
        }
    }
}

impl fmt::Display for DebateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "configuration error: {message}"),
            Self::InputUnavailable { path, .. } => {
                write!(f, "input unavailable: {}", path.display())
            }
            Self::Generation { stage, source } => {
                write!(f, "generation failed ({stage}): {source:#}")
            }
            Self::Estimation(message) => write!(f, "round estimation failed: {message}"),
            Self::Cancelled { completed } => {
                write!(f, "debate cancelled after {} round(s)", completed.len())
            }
        }
    }
}

impl std::error::Error for DebateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InputUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Exit code for an arbitrary run error.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<DebateError>()
        .map(DebateError::exit_code)
        .unwrap_or(exit_codes::FAILURE)
}
