//! Backend that spawns a local command per generation call.
//!
//! The prompt is written to stdin, the role instruction and model are exported
//! as `LLMDEBATE_SYSTEM` / `LLMDEBATE_MODEL`, and stdout is the generated text.

use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::cancel::CancelToken;
use crate::io::config::CommandConfig;
use crate::io::generator::{GenerationRequest, Generator};
use crate::io::process::{RunLimits, run_command_streaming};
use crate::io::progress::{ProgressEvent, ProgressSender, notify};

pub const MODEL_PLACEHOLDER: &str = "{model}";
pub const SYSTEM_ENV: &str = "LLMDEBATE_SYSTEM";
pub const MODEL_ENV: &str = "LLMDEBATE_MODEL";

pub struct CommandGenerator {
    config: CommandConfig,
    cancel: CancelToken,
    progress: Option<ProgressSender>,
}

impl CommandGenerator {
    pub fn new(config: CommandConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            cancel,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    fn command_for(&self, request: &GenerationRequest<'_>) -> Result<Command> {
        let (program, args) = self
            .config
            .argv
            .split_first()
            .ok_or_else(|| anyhow!("backend command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(
            args.iter()
                .map(|arg| arg.replace(MODEL_PLACEHOLDER, request.model)),
        )
        .env(SYSTEM_ENV, request.system)
        .env(MODEL_ENV, request.model);
        Ok(cmd)
    }
}

impl Generator for CommandGenerator {
    #[instrument(skip_all, fields(model = request.model, prompt_bytes = request.prompt.len()))]
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        self.cancel.check()?;
        let cmd = self.command_for(request)?;
        info!(program = %self.config.argv[0], "starting backend command");

        let output = run_command_streaming(
            cmd,
            Some(request.prompt.as_bytes()),
            &RunLimits {
                timeout: Duration::from_secs(self.config.timeout_secs),
                output_limit_bytes: self.config.output_limit_bytes,
                cancel: &self.cancel,
            },
            || notify(self.progress.as_ref(), ProgressEvent::Chunk),
        )?;

        if output.timed_out {
            return Err(anyhow!(
                "backend command timed out after {}s",
                self.config.timeout_secs
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "backend command failed");
            return Err(anyhow!(
                "backend command failed with status {:?}: {}",
                output.status.code(),
                output.stderr_lossy()
            ));
        }

        if output.stdout_truncated > 0 {
            return Err(anyhow!(
                "backend output exceeded output_limit_bytes ({} bytes, {} more dropped)",
                self.config.output_limit_bytes,
                output.stdout_truncated
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "backend command completed");
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn generator(script: &str) -> CommandGenerator {
        generator_with_limit(script, 10_000)
    }

    fn generator_with_limit(script: &str, output_limit_bytes: usize) -> CommandGenerator {
        CommandGenerator::new(
            CommandConfig {
                argv: vec![
                    "sh".to_string(),
                    "-c".to_string(),
                    script.to_string(),
                    "backend".to_string(),
                    MODEL_PLACEHOLDER.to_string(),
                ],
                timeout_secs: 10,
                output_limit_bytes,
            },
            CancelToken::new(),
        )
    }

    fn request<'a>(model: &'a str, system: &'a str, prompt: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            model,
            system,
            prompt,
        }
    }

    #[test]
    fn passes_prompt_on_stdin_and_returns_stdout() {
        let text = generator("tr a-z A-Z")
            .generate(&request("m", "sys", "user: claim\n"))
            .expect("generate");
        assert_eq!(text, "USER: CLAIM\n");
    }

    #[test]
    fn exports_system_and_substitutes_model() {
        let text = generator("printf '%s|%s|%s' \"$1\" \"$LLMDEBATE_MODEL\" \"$LLMDEBATE_SYSTEM\"")
            .generate(&request("llama3", "challenger\nAttack", "prompt"))
            .expect("generate");
        assert_eq!(text, "llama3|llama3|challenger\nAttack");
    }

    #[test]
    fn non_zero_exit_is_an_error_with_stderr() {
        let err = generator("echo broken >&2; exit 3")
            .generate(&request("m", "s", "p"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Some(3)"), "{message}");
        assert!(message.contains("broken"), "{message}");
    }

    #[test]
    fn output_beyond_limit_is_an_error() {
        let err = generator_with_limit("printf 'abcdefghijklmnop'", 5)
            .generate(&request("m", "s", "p"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("output_limit_bytes (5 bytes"), "{message}");
    }
}
