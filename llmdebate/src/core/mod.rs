//! Deterministic, pure logic shared by the debate orchestration.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod schedule;
pub mod transcript;
pub mod types;
pub mod window;
