//! Debate configuration loaded from an optional `llmdebate.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_SUMMARY_INSTRUCTION: &str =
    "Summarize the debate: top blind spots, opportunities, deadly assumption.";

/// Debate configuration (TOML).
///
/// Every field is optional in the file; missing fields fall back to the
/// defaults below. Command-line flags override file values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebateConfig {
    /// Maximum number of non-seed turns kept in the shared context.
    pub history_capacity: usize,

    pub challenger_model: String,

    pub defender_model: String,

    /// Model for the final summary; the challenger model when unset.
    pub summarizer_model: Option<String>,

    pub summary_instruction: String,

    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub ollama: OllamaConfig,
    pub command: CommandConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub host: String,
    /// Upper bound on one streamed generation, in seconds.
    pub request_timeout_secs: u64,
    pub temperature: f64,
    pub top_p: f64,
    /// Maximum tokens to generate; backend default when unset.
    pub num_predict: Option<i64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:11434".to_string(),
            request_timeout_secs: 10 * 60,
            temperature: 0.7,
            top_p: 0.9,
            num_predict: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommandConfig {
    /// Program and arguments; `{model}` is replaced by the model identifier.
    pub argv: Vec<String>,
    pub timeout_secs: u64,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            argv: vec![
                "ollama".to_string(),
                "run".to_string(),
                "{model}".to_string(),
            ],
            timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            challenger_model: DEFAULT_MODEL.to_string(),
            defender_model: DEFAULT_MODEL.to_string(),
            summarizer_model: None,
            summary_instruction: DEFAULT_SUMMARY_INSTRUCTION.to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl DebateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(anyhow!("history_capacity must be > 0"));
        }
        if self.challenger_model.trim().is_empty() || self.defender_model.trim().is_empty() {
            return Err(anyhow!("challenger_model and defender_model must be non-empty"));
        }
        if self
            .summarizer_model
            .as_deref()
            .is_some_and(|model| model.trim().is_empty())
        {
            return Err(anyhow!("summarizer_model must be non-empty when set"));
        }
        if self.summary_instruction.trim().is_empty() {
            return Err(anyhow!("summary_instruction must be non-empty"));
        }
        match self.backend.kind {
            BackendKind::Ollama => {
                let ollama = &self.backend.ollama;
                if ollama.host.trim().is_empty() {
                    return Err(anyhow!("backend.ollama.host must be non-empty"));
                }
                if ollama.request_timeout_secs == 0 {
                    return Err(anyhow!("backend.ollama.request_timeout_secs must be > 0"));
                }
            }
            BackendKind::Command => {
                let command = &self.backend.command;
                if command.argv.is_empty() || command.argv[0].trim().is_empty() {
                    return Err(anyhow!("backend.command.argv must be a non-empty array"));
                }
                if command.timeout_secs == 0 {
                    return Err(anyhow!("backend.command.timeout_secs must be > 0"));
                }
                if command.output_limit_bytes == 0 {
                    return Err(anyhow!("backend.command.output_limit_bytes must be > 0"));
                }
            }
        }
        Ok(())
    }

    /// Model used for the final summary.
    pub fn summarizer_model(&self) -> &str {
        self.summarizer_model
            .as_deref()
            .unwrap_or(&self.challenger_model)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DebateConfig::default()`.
pub fn load_config(path: &Path) -> Result<DebateConfig> {
    if !path.exists() {
        let cfg = DebateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DebateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
