//! Stable exit codes for the scrutineer binary.

/// The audit ran to completion. Targets skipped over broken recipes still
/// exit OK; their absence from the report is the finding.
pub const OK: i32 = 0;

/// The audit aborted, during setup or mid-trial. Usage errors exit with
/// clap's own code (2).
pub const FATAL: i32 = 1;
