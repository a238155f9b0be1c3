//! Ollama `/api/generate` backend.
//!
//! Requests are streamed: the server answers with newline-delimited JSON
//! chunks which are concatenated into the final text. Each chunk emits a
//! progress notification and is a cancellation point.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::io::cancel::CancelToken;
use crate::io::config::OllamaConfig;
use crate::io::generator::{GenerationRequest, Generator};
use crate::io::progress::{ProgressEvent, ProgressSender, notify};

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i64>,
}

/// One line of the streamed response.
#[derive(Debug, Deserialize, PartialEq)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    options: OllamaConfig,
    cancel: CancelToken,
    progress: Option<ProgressSender>,
}

impl OllamaGenerator {
    pub fn new(options: OllamaConfig, cancel: CancelToken) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .build()
            .context("build http client")?;
        let endpoint = format!("{}/api/generate", options.host.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            options,
            cancel,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    fn body<'a>(&self, request: &GenerationRequest<'a>) -> GenerateBody<'a> {
        GenerateBody {
            model: request.model,
            system: request.system,
            prompt: request.prompt,
            stream: true,
            options: GenerateOptions {
                temperature: self.options.temperature,
                top_p: self.options.top_p,
                num_predict: self.options.num_predict,
            },
        }
    }
}

impl Generator for OllamaGenerator {
    #[instrument(skip_all, fields(model = request.model, prompt_bytes = request.prompt.len()))]
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        self.cancel.check()?;
        debug!(endpoint = %self.endpoint, "sending generate request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.body(request))
            .send()
            .with_context(|| format!("send request to {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%status, "ollama request failed");
            return Err(anyhow!("ollama returned {status}: {}", body.trim()));
        }

        let text = collect_stream(BufReader::new(response), &self.cancel, |_| {
            notify(self.progress.as_ref(), ProgressEvent::Chunk);
        })?;
        debug!(chars = text.len(), "generate stream complete");
        Ok(text)
    }
}

/// Concatenate the `response` fields of an NDJSON stream until `done`.
///
/// A stream that ends without a `done` chunk is a failed call.
fn collect_stream<R: BufRead, F: FnMut(&str)>(
    reader: R,
    cancel: &CancelToken,
    mut on_chunk: F,
) -> Result<String> {
    let mut text = String::new();
    for line in reader.lines() {
        cancel.check()?;
        let line = line.context("read ollama stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: GenerateChunk =
            serde_json::from_str(&line).with_context(|| format!("parse stream line {line:?}"))?;
        if let Some(error) = chunk.error {
            return Err(anyhow!("ollama error: {error}"));
        }
        text.push_str(&chunk.response);
        on_chunk(&chunk.response);
        if chunk.done {
            return Ok(text);
        }
    }
    Err(anyhow!(
        "ollama stream ended before done after {} bytes",
        text.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cancel::is_interrupted;
    use std::io::Cursor;

    #[test]
    fn collects_chunks_until_done() {
        let stream = concat!(
            "{\"response\":\"Hel\",\"done\":false}\n",
            "\n",
            "{\"response\":\"lo\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
            "{\"response\":\"ignored\",\"done\":false}\n",
        );
        let mut chunks = 0;
        let text = collect_stream(Cursor::new(stream), &CancelToken::new(), |_| chunks += 1)
            .expect("collect");
        assert_eq!(text, "Hello");
        assert_eq!(chunks, 3);
    }

    #[test]
    fn stream_without_done_fails_the_call() {
        let stream = "{\"response\":\"The claim is wr\",\"done\":false}\n";
        let err = collect_stream(Cursor::new(stream), &CancelToken::new(), |_| {}).unwrap_err();
        assert!(err.to_string().contains("ended before done"));
        assert!(collect_stream(Cursor::new(""), &CancelToken::new(), |_| {}).is_err());
    }

    #[test]
    fn stream_error_field_fails_the_call() {
        let stream = "{\"error\":\"model 'nope' not found\"}\n";
        let err = collect_stream(Cursor::new(stream), &CancelToken::new(), |_| {}).unwrap_err();
        assert!(err.to_string().contains("model 'nope' not found"));
    }

    #[test]
    fn malformed_line_fails_the_call() {
        let err = collect_stream(Cursor::new("not json\n"), &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(err.to_string().contains("parse stream line"));
    }

    #[test]
    fn cancellation_stops_reading() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let stream = "{\"response\":\"x\",\"done\":true}\n";
        let err = collect_stream(Cursor::new(stream), &cancel, |_| {}).unwrap_err();
        assert!(is_interrupted(&err));
    }

    #[test]
    fn body_carries_system_prompt_and_options() {
        let generator =
            OllamaGenerator::new(OllamaConfig::default(), CancelToken::new()).expect("client");
        let request = GenerationRequest {
            model: "llama3",
            system: "challenger\nAttack",
            prompt: "user: claim\n",
        };
        let body = serde_json::to_value(generator.body(&request)).expect("serialize");
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["system"], "challenger\nAttack");
        assert_eq!(body["prompt"], "user: claim\n");
        assert_eq!(body["stream"], true);
        assert_eq!(body["options"]["temperature"], 0.7);
        assert!(body["options"].get("num_predict").is_none());
        assert_eq!(generator.endpoint, "http://127.0.0.1:11434/api/generate");
    }
}
