//! CLI Exit Code Registry
//!
//! Single source of truth for `remrecon` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 2    | Usage error (bad or missing arguments, from clap)    |
//! | 3    | Malformed input (bad row, bad CSV, bad result JSON)  |
//! | 4    | I/O error (cannot read or write a file)              |
//! | 5    | Invalid config                                       |
//! | 6    | Equivalence check failed                             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error. Clap exits with this on argument errors.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// A ledger row failed validation, a CSV was ragged, or a persisted result
/// could not be parsed.
pub const EXIT_MALFORMED_INPUT: u8 = 3;

/// Cannot read or write a file.
pub const EXIT_IO: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Reduced reconciliation is not equivalent to the full one.
pub const EXIT_EQUIVALENCE_FAILED: u8 = 6;
