//! External collaborator interfaces.
//!
//! The pipeline never reaches a configuration store, vault, quote feed, log
//! store or submission endpoint directly. Each is injected behind one of the
//! traits below, so a run can be exercised against test doubles.
//!
//! Collaborators see raw values: classification is enforced by the pipeline
//! before a value is handed over, not by the collaborator.

pub mod local;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::CollaboratorError;
use crate::events::{EventSeverity, EventTarget};

/// Status returned by `Submitter::submit` on success.
pub const SUBMIT_OK: i32 = 0;

/// Status returned by `Submitter::submit` when the endpoint rejects the
/// submission for security reasons.
pub const SUBMIT_SECURITY_REJECTION: i32 = 2;

/// Status returned by `AuditBackend::notify_emergency` when accepted.
pub const EMERGENCY_ACCEPTED: i32 = 0;

/// Server connection properties, in order: host, access code, database table,
/// transaction key, password label.
pub trait ConfigSource: Send + Sync {
    fn load_config(&self) -> Result<Vec<Option<String>>, CollaboratorError>;
}

/// User-facing data providers.
pub trait DataProvider: Send + Sync {
    fn fetch_card_data(&self, user_id: &str, key: &str) -> Result<String, CollaboratorError>;

    /// Positional profile fields. Index 1 is the credential, 2 the email,
    /// 3 free-text notes.
    fn fetch_profile(&self, user_id: &str) -> Result<Vec<Option<String>>, CollaboratorError>;

    fn fetch_instruments(&self, gateway: &str, port: u16)
        -> Result<Vec<Option<String>>, CollaboratorError>;
}

/// Physical log persistence and the emergency channel.
pub trait AuditBackend: Send + Sync {
    /// Returns true when the event was persisted.
    fn persist_log(
        &self,
        severity: EventSeverity,
        target: EventTarget,
        message: &str,
        detail: &str,
    ) -> bool;

    /// Returns `EMERGENCY_ACCEPTED` when the notification was taken.
    fn notify_emergency(&self, message: &str) -> i32;
}

/// Scrubbing and formatting services.
pub trait Scrubber: Send + Sync {
    fn scrub_privacy(&self, data: &str) -> String;

    fn scrub_exception(&self, message: &str) -> String;

    /// Display form of a card token. Fails on empty input.
    fn display_card(&self, card_data: &str) -> Result<String, CollaboratorError>;

    fn localize_instrument(&self, raw: &str) -> Result<String, CollaboratorError>;
}

/// Everything the outbound endpoint receives for one user.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub user_id: &'a str,
    pub credential: &'a str,
    pub email: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub instruments: &'a [String],
}

/// Outbound HTML submission endpoint.
pub trait Submitter: Send + Sync {
    /// 0 on success, 2 on security rejection, anything else is a generic
    /// failure.
    fn submit(&self, submission: &Submission<'_>) -> i32;
}

/// The full set of external services one pipeline run needs.
pub trait Collaborator: ConfigSource + DataProvider + AuditBackend + Scrubber + Submitter {}

impl<T> Collaborator for T where T: ConfigSource + DataProvider + AuditBackend + Scrubber + Submitter {}

/// Console-class output (standard error in the binary).
pub trait Console: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Console writing to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrConsole;

impl Console for StderrConsole {
    fn write_line(&self, line: &str) {
        eprintln!("{}", line);
    }
}
