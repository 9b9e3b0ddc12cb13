//! Error types
//!
//! Validation errors are reported, never raised: the operation that produced
//! one has already been skipped and logged by the time the caller sees it.

use std::io;

/// A domain value was out of range; the call was a no-op
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("note {0} is outside the keyboard range 21..=108")]
    NoteOutOfRange(i32),

    #[error("center note {0} is outside the keyboard range 21..=108")]
    CenterOutOfRange(f64),

    #[error("visible key count {count} is outside {min}..={max}")]
    VisibleKeysOutOfRange { count: f64, min: f64, max: f64 },

    #[error("no held note {note} with identifier {identifier:?}")]
    UnknownPress {
        note: u8,
        identifier: Option<String>,
    },
}

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
