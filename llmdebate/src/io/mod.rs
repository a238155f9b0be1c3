//! I/O adapters around the debate core: backends, files, progress, signals.

pub mod cancel;
pub mod command;
pub mod config;
pub mod generator;
pub mod ollama;
pub mod process;
pub mod progress;
pub mod prompt;
pub mod report;
