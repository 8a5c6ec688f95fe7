//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `pwatch` exit codes.
//! Exit codes are part of the shell contract: cron jobs and scripts rely
//! on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (I/O, serialization)                        |
//! | 2    | Usage error (bad arguments, unknown retailer)             |
//! | 3    | Config file missing, unparseable, or invalid              |
//! | 4    | Data integrity (bad price cell, duplicate reference, ...) |
//! | 5    | Reference snapshot missing or too old                     |
//! | 6    | `report --strict` found non-compliant listings            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use pricewatch_io::SourceError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// Matches clap's own exit code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// Config file cannot be read, parsed, or fails validation.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// Input data is present but malformed: unparseable prices, a reference
/// row without a price, duplicate or negative reference prices.
pub const EXIT_DATA_INTEGRITY: u8 = 4;

/// No usable reference snapshot for the requested date.
pub const EXIT_SOURCE_MISSING: u8 = 5;

/// `report --strict` and at least one listing is non-compliant.
pub const EXIT_REPORT_NONCOMPLIANT: u8 = 6;

/// Map a source error to its exit code.
pub fn source_exit_code(err: &SourceError) -> u8 {
    match err {
        SourceError::SnapshotNotFound { .. } | SourceError::SnapshotTooOld { .. } => {
            EXIT_SOURCE_MISSING
        }
        SourceError::Csv { .. }
        | SourceError::MissingColumn { .. }
        | SourceError::PriceParse { .. }
        | SourceError::MissingReferencePrice { .. } => EXIT_DATA_INTEGRITY,
        SourceError::InvalidMapping { .. } => EXIT_CONFIG_INVALID,
        SourceError::Io { .. } | SourceError::Export(_) => EXIT_ERROR,
    }
}
