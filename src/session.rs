use crate::error::Result;
use crate::types::SpeciesRecord;

/// Per-user state across repeated identify/lookup actions.
///
/// Holds the last successful record and the last failure. One session
/// belongs to one user; nothing here is process-wide.
#[derive(Debug, Default, Clone)]
pub struct Session {
    last_record: Option<SpeciesRecord>,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a pipeline run and hand it back.
    ///
    /// A success replaces the current record and clears the error. A
    /// failure is remembered but does not discard the previous record.
    pub fn record(&mut self, outcome: Result<SpeciesRecord>) -> Result<SpeciesRecord> {
        match outcome {
            Ok(record) => {
                self.last_record = Some(record.clone());
                self.last_error = None;
                Ok(record)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// The last successful record, if any.
    pub fn current(&self) -> Option<&SpeciesRecord> {
        self.last_record.as_ref()
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the most recent run failed.
    pub fn failed(&self) -> bool {
        self.last_error.is_some()
    }

    /// Start over: forget the record and the error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
