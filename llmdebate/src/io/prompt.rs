//! Seed and instruction loading, and prompt rendering for backend calls.

use std::fs;
use std::path::Path;

use anyhow::Result;
use minijinja::{Environment, context};
use tracing::{debug, warn};

use crate::core::types::{Role, Round};
use crate::error::DebateError;

pub const DEFAULT_CHALLENGER_INSTRUCTION: &str = "You are the Challenger. Attack ruthlessly:";
pub const DEFAULT_DEFENDER_INSTRUCTION: &str = "You are the Defender. Represent the user:";

const DEBATER_SYSTEM_TEMPLATE: &str = include_str!("prompts/debater_system.md");
const SUMMARY_TRANSCRIPT_TEMPLATE: &str = include_str!("prompts/summary_transcript.md");

/// Read the seed claim. Unreadable files and empty claims are fatal.
pub fn load_seed(path: &Path) -> Result<String, DebateError> {
    let seed = fs::read_to_string(path).map_err(|source| DebateError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    if seed.trim().is_empty() {
        return Err(DebateError::configuration(format!(
            "seed claim {} is empty",
            path.display()
        )));
    }
    debug!(path = %path.display(), bytes = seed.len(), "loaded seed claim");
    Ok(seed)
}

/// Read an instruction override verbatim, degrading to `fallback` with a warning
/// when the file is unreadable or blank.
pub fn load_instruction(path: Option<&Path>, fallback: &str) -> String {
    let Some(path) = path else {
        return fallback.to_string();
    };
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(path = %path.display(), "instruction file is empty, using default");
            fallback.to_string()
        }
        Err(err) => {
            warn!(path = %path.display(), err = %err, "failed to load instruction, using default");
            fallback.to_string()
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("debater_system", DEBATER_SYSTEM_TEMPLATE)
            .expect("debater system template should be valid");
        env.add_template("summary_transcript", SUMMARY_TRANSCRIPT_TEMPLATE)
            .expect("summary transcript template should be valid");
        Self { env }
    }

    /// System text for a debater: the role name on its own line, then the instruction.
    pub fn debater_system(&self, role: Role, instruction: &str) -> Result<String> {
        let template = self.env.get_template("debater_system")?;
        let rendered = template.render(context! {
            role => role.label(),
            instruction => instruction,
        })?;
        Ok(rendered)
    }

    /// All rounds with `### Round <n>` headers, separated by blank lines.
    pub fn summary_transcript(&self, rounds: &[Round]) -> Result<String> {
        let template = self.env.get_template("summary_transcript")?;
        let rendered = template.render(context! { rounds => rounds })?;
        Ok(rendered)
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debater_system_puts_role_first() {
        let engine = PromptEngine::new();
        let system = engine
            .debater_system(Role::Challenger, "Attack ruthlessly:")
            .expect("render");
        assert_eq!(system, "challenger\nAttack ruthlessly:");
    }

    #[test]
    fn summary_transcript_numbers_rounds_from_one() {
        let engine = PromptEngine::new();
        let rounds = vec![
            Round {
                challenger: "C1".to_string(),
                defender: "D1".to_string(),
            },
            Round {
                challenger: "C2 <b>&</b>".to_string(),
                defender: "D2".to_string(),
            },
        ];
        let transcript = engine.summary_transcript(&rounds).expect("render");
        assert_eq!(
            transcript,
            "### Round 1\nChallenger: C1\nDefender: D1\n\n### Round 2\nChallenger: C2 <b>&</b>\nDefender: D2\n\n"
        );
    }

    #[test]
    fn summary_transcript_of_no_rounds_is_empty() {
        let engine = PromptEngine::new();
        assert_eq!(engine.summary_transcript(&[]).expect("render"), "");
    }

    #[test]
    fn load_instruction_falls_back_on_missing_file() {
        let out = load_instruction(Some(Path::new("/path/does/not/exist")), "FB");
        assert_eq!(out, "FB");
        assert_eq!(load_instruction(None, "FB"), "FB");
    }

    #[test]
    fn load_instruction_reads_override() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("chal.txt");
        fs::write(&path, "  Custom Chal\n").expect("write");
        assert_eq!(load_instruction(Some(&path), "FB"), "  Custom Chal\n");
        fs::write(&path, "\n\t\n").expect("write");
        assert_eq!(load_instruction(Some(&path), "FB"), "FB");
    }

    #[test]
    fn load_seed_reports_missing_file_as_input_unavailable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_seed(&temp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, DebateError::InputUnavailable { .. }));
    }

    #[test]
    fn load_seed_rejects_blank_claim() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("seed.md");
        fs::write(&path, " \n").expect("write");
        assert!(matches!(
            load_seed(&path).unwrap_err(),
            DebateError::Configuration(_)
        ));
        fs::write(&path, "Startup X should skip paid marketing").expect("write");
        assert_eq!(
            load_seed(&path).expect("load"),
            "Startup X should skip paid marketing"
        );
    }
}
