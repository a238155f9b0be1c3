//! Adversarial two-model debate over a seed claim.
//!
//! Runs Challenger/Defender rounds against a local model backend, prints every
//! turn as it arrives, and writes a final summary to the output file.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use llmdebate::core::schedule::{Schedule, resolve_schedule};
use llmdebate::core::types::{DebateSettings, Participant, Role};
use llmdebate::debate::TurnRecord;
use llmdebate::error::{DebateError, exit_code_for};
use llmdebate::exit_codes;
use llmdebate::io::cancel::{CancelToken, install_interrupt_handler};
use llmdebate::io::command::CommandGenerator;
use llmdebate::io::config::{BackendKind, DebateConfig, load_config};
use llmdebate::io::generator::Generator;
use llmdebate::io::ollama::OllamaGenerator;
use llmdebate::io::progress::{ProgressReporter, ProgressSender};
use llmdebate::io::prompt::{
    DEFAULT_CHALLENGER_INSTRUCTION, DEFAULT_DEFENDER_INSTRUCTION, load_instruction,
};
use llmdebate::logging;
use llmdebate::run::{RunPlan, execute_plan};

#[derive(Parser, Debug)]
#[command(
    name = "llmdebate",
    version,
    about = "Adversarial Challenger/Defender debate between two local models"
)]
struct Cli {
    /// File holding the seed claim.
    #[arg(long)]
    input: PathBuf,

    /// Where the final summary is written.
    #[arg(long)]
    output: PathBuf,

    /// Number of rounds; 0 runs until interrupted (unless --duration is set).
    #[arg(long, default_value_t = 0)]
    rounds: u32,

    /// Wall-clock budget such as `90s`, `2m` or `1h30m`.
    #[arg(long)]
    duration: Option<String>,

    /// Challenger model.
    #[arg(long)]
    challenger: Option<String>,

    /// Defender model.
    #[arg(long)]
    defender: Option<String>,

    /// Summary model; defaults to the challenger model.
    #[arg(long)]
    summarizer: Option<String>,

    /// File overriding the Challenger instruction.
    #[arg(long)]
    challenger_prompt: Option<PathBuf>,

    /// File overriding the Defender instruction.
    #[arg(long)]
    defender_prompt: Option<PathBuf>,

    /// Maximum number of non-seed turns kept in context.
    #[arg(long)]
    history: Option<usize>,

    /// Optional TOML config file.
    #[arg(long, default_value = "llmdebate.toml")]
    config: PathBuf,

    /// Ollama base URL.
    #[arg(long, env = "OLLAMA_HOST")]
    ollama_host: Option<String>,

    /// Also write a diagnostic JSON transcript here.
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Layer command-line overrides over the file config.
    fn apply_overrides(&self, mut config: DebateConfig) -> Result<DebateConfig, DebateError> {
        if let Some(model) = &self.challenger {
            config.challenger_model = model.clone();
        }
        if let Some(model) = &self.defender {
            config.defender_model = model.clone();
        }
        if let Some(model) = &self.summarizer {
            config.summarizer_model = Some(model.clone());
        }
        if let Some(capacity) = self.history {
            config.history_capacity = capacity;
        }
        if let Some(host) = &self.ollama_host {
            config.backend.ollama.host = host.clone();
        }
        config
            .validate()
            .map_err(|err| DebateError::configuration(format!("{err:#}")))?;
        Ok(config)
    }

    fn plan(&self, config: &DebateConfig, schedule: Schedule) -> RunPlan {
        let challenger_instruction = load_instruction(
            self.challenger_prompt.as_deref(),
            DEFAULT_CHALLENGER_INSTRUCTION,
        );
        let defender_instruction =
            load_instruction(self.defender_prompt.as_deref(), DEFAULT_DEFENDER_INSTRUCTION);
        RunPlan {
            input: self.input.clone(),
            output: self.output.clone(),
            transcript: self.transcript.clone(),
            schedule,
            settings: DebateSettings {
                history_capacity: config.history_capacity,
                challenger: Participant::new(&config.challenger_model, challenger_instruction),
                defender: Participant::new(&config.defender_model, defender_instruction),
            },
            summarizer_model: config.summarizer_model().to_string(),
            summary_instruction: config.summary_instruction.clone(),
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<()> {
    // Schedule conflicts are rejected before anything touches a backend.
    let schedule = resolve_schedule(cli.rounds, cli.duration.as_deref())?;
    let config = load_config(&cli.config)
        .map_err(|err| DebateError::configuration(format!("{err:#}")))?;
    let config = cli.apply_overrides(config)?;
    let plan = cli.plan(&config, schedule);

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel)?;

    let (reporter, progress) = if cli.no_progress {
        (None, None)
    } else {
        let (reporter, sender) = ProgressReporter::spawn();
        (Some(reporter), Some(sender))
    };

    let result = build_generator(&config, &cancel, progress.clone())
        .and_then(|generator| execute_plan(&plan, &generator, &cancel, progress, print_turn));
    // Every sender is gone once the generator and plan execution are dropped.
    if let Some(reporter) = reporter {
        reporter.join();
    }

    let outcome = result?;
    if let Some(estimate) = outcome.estimate {
        eprintln!(
            "trial round took {:.1}s; ran {} round(s)",
            estimate.trial.as_secs_f64(),
            estimate.rounds
        );
    }
    println!("\nSummary written to {}", plan.output.display());
    Ok(())
}

fn build_generator(
    config: &DebateConfig,
    cancel: &CancelToken,
    progress: Option<ProgressSender>,
) -> Result<Box<dyn Generator>> {
    let generator: Box<dyn Generator> = match config.backend.kind {
        BackendKind::Ollama => {
            let mut generator = OllamaGenerator::new(config.backend.ollama.clone(), cancel.clone())?;
            if let Some(sender) = progress {
                generator = generator.with_progress(sender);
            }
            Box::new(generator)
        }
        BackendKind::Command => {
            let mut generator =
                CommandGenerator::new(config.backend.command.clone(), cancel.clone());
            if let Some(sender) = progress {
                generator = generator.with_progress(sender);
            }
            Box::new(generator)
        }
    };
    Ok(generator)
}

fn print_turn(turn: &TurnRecord<'_>) {
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z").to_string();
    println!("{}", format_turn(turn, &stamp));
}

fn format_turn(turn: &TurnRecord<'_>, stamp: &str) -> String {
    let content = turn.content.trim_end();
    match turn.role {
        Role::Seed => format!("\nLogged on: {stamp}\nStarting debate with claim: {content}"),
        role => format!(
            "\nLogged on: {stamp}\n[round {}] {role}:\n{content}",
            turn.round
        ),
    }
}
