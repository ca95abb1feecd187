//! Structured logging utilities.
//!
//! Provides context-aware logging with run_id and stage included in every
//! diagnostic line. Diagnostic lines go to standard error, so they carry
//! only stage names, counts, classifications and status codes, never a
//! classified value.

use std::fmt;

use uuid::Uuid;

/// Logging context for one pipeline run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub stage: Option<&'static str>,
}

impl LogContext {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: None,
        }
    }

    /// Fresh context with a generated run id.
    pub fn for_new_run() -> Self {
        Self::new(&format!("run-{}", &Uuid::new_v4().to_string()[..8]))
    }

    pub fn with_stage(&self, stage: &'static str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            stage: Some(stage),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "[run={}] [stage={}]", self.run_id, stage),
            None => write!(f, "[run={}]", self.run_id),
        }
    }
}
