//! File-backed collaborator used by the binary.
//!
//! - Configuration, card tokens, profiles and quotes come from a JSON fixture
//! - The log store is a JSON-lines file, one `EventRecord` per line
//! - Emergency notifications go to a sibling `.emergency.jsonl` file
//! - Submissions are rendered to HTML files in an outbox directory

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CollaboratorError;
use crate::events::{EventSeverity, EventTarget};
use crate::security::pii::scrub_text;
use crate::security::sanitizer::escape_html;

use super::{
    AuditBackend, ConfigSource, DataProvider, Scrubber, Submission, Submitter, EMERGENCY_ACCEPTED,
    SUBMIT_OK,
};

/// Status returned when the emergency file cannot be written.
pub const EMERGENCY_FAILED: i32 = 1;

/// Status returned when a submission cannot be written to the outbox.
pub const SUBMIT_IO_FAILURE: i32 = 3;

/// Number of trailing card characters left visible.
const CARD_VISIBLE_TAIL: usize = 4;

/// One user's records in the fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub card: Option<String>,
    pub profile: Vec<Option<String>>,
}

/// Contents of the JSON fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// Host, access code, database table, transaction key, password label.
    pub config: Vec<Option<String>>,

    /// Vault key the card vault expects; any key is accepted when unset.
    #[serde(default)]
    pub vault_key: Option<String>,

    #[serde(default)]
    pub users: HashMap<String, UserRecord>,

    /// Quotes keyed by `gateway:port`.
    #[serde(default)]
    pub instruments: HashMap<String, Vec<Option<String>>>,
}

/// One persisted log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub recorded_at: String,
    pub severity: EventSeverity,
    pub target: EventTarget,
    pub message: String,
    pub detail: String,
    pub content_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmergencyRecord {
    recorded_at: String,
    message: String,
}

/// Compute SHA256 hash of content.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

fn open_append(path: &Path) -> Result<File, CollaboratorError> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

pub struct LocalCollaborator {
    fixture: Fixture,
    event_log: Mutex<File>,
    emergency_log: PathBuf,
    outbox_dir: PathBuf,
}

impl LocalCollaborator {
    pub fn new(
        fixture: Fixture,
        event_log: &Path,
        outbox_dir: &Path,
    ) -> Result<Self, CollaboratorError> {
        fs::create_dir_all(outbox_dir)?;

        Ok(Self {
            fixture,
            event_log: Mutex::new(open_append(event_log)?),
            emergency_log: event_log.with_extension("emergency.jsonl"),
            outbox_dir: outbox_dir.to_path_buf(),
        })
    }

    /// Load the fixture from disk and open the log files.
    pub fn open(
        fixture_path: &Path,
        event_log: &Path,
        outbox_dir: &Path,
    ) -> Result<Self, CollaboratorError> {
        let content = fs::read_to_string(fixture_path)?;
        let fixture: Fixture = serde_json::from_str(&content)?;

        log::info!(
            "FIXTURE_LOADED users={} gateways={}",
            fixture.users.len(),
            fixture.instruments.len()
        );

        Self::new(fixture, event_log, outbox_dir)
    }

    pub fn emergency_log(&self) -> &Path {
        &self.emergency_log
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }

    fn user(&self, user_id: &str) -> Result<&UserRecord, CollaboratorError> {
        self.fixture
            .users
            .get(user_id)
            .ok_or_else(|| CollaboratorError::NotFound("user record".to_string()))
    }

    fn append_event(&self, record: &EventRecord) -> Result<(), CollaboratorError> {
        let line = serde_json::to_string(record)?;
        let mut file = self.event_log.lock();
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn append_emergency(&self, message: &str) -> Result<(), CollaboratorError> {
        let record = EmergencyRecord {
            recorded_at: Utc::now().to_rfc3339(),
            message: message.to_string(),
        };
        let line = serde_json::to_string(&record)?;
        let mut file = open_append(&self.emergency_log)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn write_submission(&self, submission: &Submission<'_>) -> Result<PathBuf, CollaboratorError> {
        let path = self
            .outbox_dir
            .join(format!("submission-{}.html", Uuid::new_v4()));
        fs::write(&path, render_submission(submission))?;
        Ok(path)
    }
}

/// Render a submission as an HTML page. Every field is escaped.
pub fn render_submission(submission: &Submission<'_>) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<body>\n");
    html.push_str(&format!(
        "<p class=\"user\">{}</p>\n",
        escape_html(submission.user_id)
    ));
    html.push_str(&format!(
        "<p class=\"credential\">{}</p>\n",
        escape_html(submission.credential)
    ));
    if let Some(email) = submission.email {
        html.push_str(&format!("<p class=\"email\">{}</p>\n", escape_html(email)));
    }
    if let Some(notes) = submission.notes {
        html.push_str(&format!("<p class=\"notes\">{}</p>\n", escape_html(notes)));
    }
    html.push_str("<ul>\n");
    for instrument in submission.instruments {
        html.push_str(&format!("<li>{}</li>\n", escape_html(instrument)));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

impl ConfigSource for LocalCollaborator {
    fn load_config(&self) -> Result<Vec<Option<String>>, CollaboratorError> {
        Ok(self.fixture.config.clone())
    }
}

impl DataProvider for LocalCollaborator {
    fn fetch_card_data(&self, user_id: &str, key: &str) -> Result<String, CollaboratorError> {
        if let Some(expected) = &self.fixture.vault_key {
            if expected != key {
                return Err(CollaboratorError::Unavailable("card vault rejected key".to_string()));
            }
        }

        self.user(user_id)?
            .card
            .clone()
            .ok_or_else(|| CollaboratorError::NotFound("card token".to_string()))
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Vec<Option<String>>, CollaboratorError> {
        Ok(self.user(user_id)?.profile.clone())
    }

    fn fetch_instruments(
        &self,
        gateway: &str,
        port: u16,
    ) -> Result<Vec<Option<String>>, CollaboratorError> {
        let endpoint = format!("{}:{}", gateway, port);
        self.fixture
            .instruments
            .get(&endpoint)
            .cloned()
            .ok_or(CollaboratorError::Unavailable(endpoint))
    }
}

impl AuditBackend for LocalCollaborator {
    fn persist_log(
        &self,
        severity: EventSeverity,
        target: EventTarget,
        message: &str,
        detail: &str,
    ) -> bool {
        let record = EventRecord {
            recorded_at: Utc::now().to_rfc3339(),
            severity,
            target,
            message: message.to_string(),
            detail: detail.to_string(),
            content_hash: compute_hash(message),
        };

        match self.append_event(&record) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("EVENT_PERSIST_FAILED target={} error={}", target, e);
                false
            }
        }
    }

    fn notify_emergency(&self, message: &str) -> i32 {
        match self.append_emergency(message) {
            Ok(()) => {
                log::error!("EMERGENCY_NOTIFIED bytes={}", message.len());
                EMERGENCY_ACCEPTED
            }
            Err(e) => {
                log::error!("EMERGENCY_NOTIFY_FAILED error={}", e);
                EMERGENCY_FAILED
            }
        }
    }
}

impl Scrubber for LocalCollaborator {
    fn scrub_privacy(&self, data: &str) -> String {
        scrub_text(data).0
    }

    fn scrub_exception(&self, message: &str) -> String {
        scrub_text(message).0
    }

    fn display_card(&self, card_data: &str) -> Result<String, CollaboratorError> {
        let len = card_data.chars().count();
        if len == 0 {
            return Err(CollaboratorError::Unavailable("empty card data".to_string()));
        }

        let hidden = len.saturating_sub(CARD_VISIBLE_TAIL);
        let tail: String = card_data.chars().skip(hidden).collect();
        Ok(format!("{}{}", "*".repeat(hidden.max(CARD_VISIBLE_TAIL * 3)), tail))
    }

    fn localize_instrument(&self, raw: &str) -> Result<String, CollaboratorError> {
        Ok(raw
            .chars()
            .map(|c| match c {
                '.' => ',',
                ',' => '.',
                other => other,
            })
            .collect())
    }
}

impl Submitter for LocalCollaborator {
    fn submit(&self, submission: &Submission<'_>) -> i32 {
        match self.write_submission(submission) {
            Ok(path) => {
                log::info!(
                    "SUBMISSION_WRITTEN file={} instruments={}",
                    path.display(),
                    submission.instruments.len()
                );
                SUBMIT_OK
            }
            Err(e) => {
                log::warn!("SUBMISSION_WRITE_FAILED error={}", e);
                SUBMIT_IO_FAILURE
            }
        }
    }
}
