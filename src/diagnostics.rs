//! Warning log for rejected calls
//!
//! A ring buffer of validation warnings, independent of the view so it can be
//! tested in isolation. Every entry is also emitted through `tracing`.

use std::collections::VecDeque;
use std::time::Instant;

use crate::error::ValidationError;

/// Maximum number of entries to keep in the log
const MAX_LOG_SIZE: usize = 100;

/// A single rejected call
#[derive(Debug, Clone)]
pub struct Warning {
    /// Operation that was rejected, e.g. "note_on"
    pub operation: &'static str,

    pub error: ValidationError,

    pub timestamp: Instant,
}

/// Ring buffer of warnings (newest at back)
#[derive(Debug)]
pub struct WarningLog {
    entries: VecDeque<Warning>,
    capacity: usize,
}

impl Default for WarningLog {
    fn default() -> Self {
        Self::new()
    }
}

impl WarningLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a rejection and log it
    pub fn warn(&mut self, operation: &'static str, error: ValidationError) {
        tracing::warn!(operation, %error, "rejected");

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Warning {
            operation,
            error,
            timestamp: Instant::now(),
        });
    }

    /// Log the error side of a result, passing the result through
    pub fn check<T>(
        &mut self,
        operation: &'static str,
        result: Result<T, ValidationError>,
    ) -> Result<T, ValidationError> {
        if let Err(error) = &result {
            self.warn(operation, error.clone());
        }
        result
    }

    pub fn latest(&self) -> Option<&Warning> {
        self.entries.back()
    }

    /// Entries in reverse chronological order (newest first)
    pub fn entries_recent_first(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
