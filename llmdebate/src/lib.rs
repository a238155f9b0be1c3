//! Two-model adversarial debate orchestrator.
//!
//! A Challenger and a Defender take alternating turns over a shared,
//! seed-anchored context window; the completed rounds are then reduced into a
//! single summary by one more generation call. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure, deterministic logic (context window, rendering,
//!   scheduling math). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (generation backends, files, progress,
//!   signals). Behind the [`io::generator::Generator`] trait so tests can script
//!   every reply.
//!
//! Orchestration modules ([`turn`], [`debate`], [`estimate`], [`summarize`],
//! [`run`]) combine the two to implement the CLI.

pub mod core;
pub mod debate;
pub mod error;
pub mod estimate;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
pub mod summarize;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod turn;
