//! Investigation tests for the Ollama streaming transport and a short live debate.
//!
//! # Prerequisites
//!
//! - `ollama serve` reachable at `OLLAMA_HOST` (default `http://127.0.0.1:11434`)
//! - The model named by `LLMDEBATE_TEST_MODEL` pulled locally (default `llama3`)
//!
//! # Running
//!
//! ```bash
//! TEST_LOG=1 cargo test -p llmdebate --test investigation_llm ollama_ -- --ignored --nocapture
//! TEST_LOG=1 RUST_LOG=debug cargo test -p llmdebate --test investigation_llm -- --ignored
//! ```

use std::sync::Once;
use std::time::Instant;

use llmdebate::core::schedule::RoundLimit;
use llmdebate::core::types::{DebateSettings, Participant};
use llmdebate::debate::Debate;
use llmdebate::io::cancel::CancelToken;
use llmdebate::io::config::{DEFAULT_MODEL, DEFAULT_SUMMARY_INSTRUCTION, OllamaConfig};
use llmdebate::io::generator::{GenerationRequest, Generator};
use llmdebate::io::ollama::OllamaGenerator;
use llmdebate::io::prompt::{DEFAULT_CHALLENGER_INSTRUCTION, DEFAULT_DEFENDER_INSTRUCTION};
use llmdebate::summarize::{SummaryRequest, summarize};
use tracing::info;

static INIT: Once = Once::new();

fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
                .init();
        }
    });
}

fn model() -> String {
    std::env::var("LLMDEBATE_TEST_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

fn generator() -> OllamaGenerator {
    let mut options = OllamaConfig {
        num_predict: Some(128),
        ..OllamaConfig::default()
    };
    if let Ok(host) = std::env::var("OLLAMA_HOST") {
        options.host = host;
    }
    OllamaGenerator::new(options, CancelToken::new()).expect("build ollama client")
}

/// A single streamed generation returns non-empty text.
#[test]
#[ignore]
fn ollama_single_generation_streams_text() {
    init_test_logging();
    let model = model();
    let started = Instant::now();
    let text = generator()
        .generate(&GenerationRequest {
            model: &model,
            system: "Answer in one short sentence.",
            prompt: "user: Is water wet?\n",
        })
        .expect("generate");
    info!(elapsed_ms = started.elapsed().as_millis() as u64, chars = text.len(), "generation done");
    assert!(!text.trim().is_empty());
}

/// One full round plus summary against the live backend.
#[test]
#[ignore]
fn ollama_one_round_debate_and_summary() {
    init_test_logging();
    let model = model();
    let generator = generator();
    let settings = DebateSettings {
        history_capacity: 10,
        challenger: Participant::new(&model, DEFAULT_CHALLENGER_INSTRUCTION),
        defender: Participant::new(&model, DEFAULT_DEFENDER_INSTRUCTION),
    };

    let started = Instant::now();
    let rounds = Debate::new(&generator, &settings)
        .run(
            "Startup X should skip paid marketing",
            RoundLimit::Fixed(1),
            |turn| info!(round = turn.round, role = %turn.role, chars = turn.content.len(), "turn"),
        )
        .expect("debate");
    assert_eq!(rounds.len(), 1);

    let summary = summarize(
        &generator,
        &rounds,
        &SummaryRequest {
            model: &model,
            instruction: DEFAULT_SUMMARY_INSTRUCTION,
        },
        None,
    )
    .expect("summary");
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "debate done");
    assert!(!summary.trim().is_empty());
}
