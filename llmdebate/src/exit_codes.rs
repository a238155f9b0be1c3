//! Stable exit codes for the `llmdebate` CLI.

/// The summary was written.
pub const OK: i32 = 0;
/// A backend call failed, or any other runtime error.
pub const FAILURE: i32 = 1;
/// Invalid options, unreadable seed input, or malformed duration budget.
pub const CONFIG: i32 = 2;
/// The run was interrupted by the user.
pub const INTERRUPTED: i32 = 130;
