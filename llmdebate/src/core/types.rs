//! Shared deterministic types for the debate core.
//!
//! These types define the contracts between the context window, the turn
//! executor and the summarizer. They carry no I/O and serialize stably for the
//! diagnostic transcript.

use serde::{Deserialize, Serialize};

/// Author of a turn in the shared context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The original claim the debate is anchored to.
    Seed,
    Challenger,
    Defender,
    /// Synthetic context used for the final summary call.
    System,
}

impl Role {
    /// Label used when the turn is rendered into a transcript line.
    pub fn label(self) -> &'static str {
        match self {
            Role::Seed => "user",
            Role::Challenger => "challenger",
            Role::Defender => "defender",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One utterance attributed to a role. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn seed(content: impl Into<String>) -> Self {
        Self::new(Role::Seed, content)
    }
}

/// Paired output of one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub challenger: String,
    pub defender: String,
}

/// Model and instruction used for one side of the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub model: String,
    pub instruction: String,
}

impl Participant {
    pub fn new(model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
        }
    }
}

/// Per-run debate configuration handed to [`crate::debate::Debate::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateSettings {
    /// Maximum number of non-seed turns kept in the shared context.
    pub history_capacity: usize,
    pub challenger: Participant,
    pub defender: Participant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_renders_as_user() {
        assert_eq!(Role::Seed.label(), "user");
        assert_eq!(Role::Challenger.to_string(), "challenger");
        assert_eq!(Role::Defender.to_string(), "defender");
    }

    #[test]
    fn round_serializes_with_role_keys() {
        let round = Round {
            challenger: "c".to_string(),
            defender: "d".to_string(),
        };
        let json = serde_json::to_value(&round).expect("serialize");
        assert_eq!(json["challenger"], "c");
        assert_eq!(json["defender"], "d");
    }
}
