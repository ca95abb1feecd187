//! Scripted collaborator and console used by the unit tests.

use parking_lot::Mutex;

use crate::error::CollaboratorError;
use crate::events::{EventSeverity, EventTarget};
use crate::security::pii::scrub_text;

use super::{AuditBackend, ConfigSource, Console, DataProvider, Scrubber, Submission, Submitter};

#[derive(Debug, Clone)]
pub(crate) struct PersistedEvent {
    pub severity: EventSeverity,
    pub target: EventTarget,
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedSubmission {
    pub user_id: String,
    pub credential: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub instruments: Vec<String>,
}

/// Responses are fixed at construction; `None` makes the matching call fail.
pub(crate) struct FakeCollaborator {
    pub config: Option<Vec<Option<String>>>,
    pub card: Option<String>,
    pub profile: Option<Vec<Option<String>>>,
    pub instruments: Option<Vec<Option<String>>>,
    pub persist_ok: bool,
    pub emergency_status: i32,
    pub submit_status: i32,
    pub persisted: Mutex<Vec<PersistedEvent>>,
    pub emergencies: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<RecordedSubmission>>,
    pub instrument_requests: Mutex<Vec<(String, u16)>>,
}

fn owned(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

impl FakeCollaborator {
    /// Every collaborator succeeds with well-formed data.
    pub fn healthy() -> Self {
        Self {
            config: Some(owned(&[
                "internalAB",
                "access-7731",
                "customer_accounts",
                "txkey-5521",
                "Password",
            ])),
            card: Some("tok_ABCDEF123456".to_string()),
            profile: Some(owned(&[
                "Alice",
                "Abcdefg123",
                "alice@example.com",
                "prefers email",
            ])),
            instruments: Some(owned(&["AAPL 189.50", "MSFT 402.10"])),
            persist_ok: true,
            emergency_status: 0,
            submit_status: 0,
            persisted: Mutex::new(Vec::new()),
            emergencies: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            instrument_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PersistedEvent> {
        self.persisted.lock().clone()
    }

    pub fn events_for(&self, target: EventTarget) -> Vec<PersistedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.target == target)
            .collect()
    }

    pub fn clear_events(&self) {
        self.persisted.lock().clear();
    }
}

impl ConfigSource for FakeCollaborator {
    fn load_config(&self) -> Result<Vec<Option<String>>, CollaboratorError> {
        self.config
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("config store".to_string()))
    }
}

impl DataProvider for FakeCollaborator {
    fn fetch_card_data(&self, _user_id: &str, _key: &str) -> Result<String, CollaboratorError> {
        self.card
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("card vault".to_string()))
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Vec<Option<String>>, CollaboratorError> {
        self.profile
            .clone()
            .ok_or_else(|| CollaboratorError::NotFound(format!("profile {}", user_id.len())))
    }

    fn fetch_instruments(
        &self,
        gateway: &str,
        port: u16,
    ) -> Result<Vec<Option<String>>, CollaboratorError> {
        self.instrument_requests
            .lock()
            .push((gateway.to_string(), port));
        self.instruments
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("quote feed".to_string()))
    }
}

impl AuditBackend for FakeCollaborator {
    fn persist_log(
        &self,
        severity: EventSeverity,
        target: EventTarget,
        message: &str,
        detail: &str,
    ) -> bool {
        self.persisted.lock().push(PersistedEvent {
            severity,
            target,
            message: message.to_string(),
            detail: detail.to_string(),
        });
        self.persist_ok
    }

    fn notify_emergency(&self, message: &str) -> i32 {
        self.emergencies.lock().push(message.to_string());
        self.emergency_status
    }
}

impl Scrubber for FakeCollaborator {
    fn scrub_privacy(&self, data: &str) -> String {
        scrub_text(data).0
    }

    fn scrub_exception(&self, message: &str) -> String {
        scrub_text(message).0
    }

    fn display_card(&self, card_data: &str) -> Result<String, CollaboratorError> {
        if card_data.is_empty() {
            return Err(CollaboratorError::Unavailable("empty card data".to_string()));
        }
        let tail: String = card_data
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        Ok(format!("************{}", tail))
    }

    fn localize_instrument(&self, raw: &str) -> Result<String, CollaboratorError> {
        Ok(raw.replace('.', ","))
    }
}

impl Submitter for FakeCollaborator {
    fn submit(&self, submission: &Submission<'_>) -> i32 {
        self.submissions.lock().push(RecordedSubmission {
            user_id: submission.user_id.to_string(),
            credential: submission.credential.to_string(),
            email: submission.email.map(str::to_string),
            notes: submission.notes.map(str::to_string),
            instruments: submission.instruments.to_vec(),
        });
        self.submit_status
    }
}

/// Console that keeps every line written to it.
#[derive(Default)]
pub(crate) struct RecordingConsole {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Console for RecordingConsole {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
