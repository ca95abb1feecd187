//! Event severity, log partitions and the immutable log event.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::{Classification, ClassifiedValue};
use crate::error::PipelineError;

/// Event severity, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Fail,
    Critical,
    Unknown,
}

impl EventSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Debug => "DEBUG",
            EventSeverity::Info => "INFO",
            EventSeverity::Warning => "WARNING",
            EventSeverity::Fail => "FAIL",
            EventSeverity::Critical => "CRITICAL",
            EventSeverity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical log partition an event is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTarget {
    Application,
    Security,
    Reports,
    Action,
    Audit,
    Unknown,
}

impl EventTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTarget::Application => "APPLICATION",
            EventTarget::Security => "SECURITY",
            EventTarget::Reports => "REPORTS",
            EventTarget::Action => "ACTION",
            EventTarget::Audit => "AUDIT",
            EventTarget::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log event. Built once, then moved into the router.
#[derive(Debug)]
pub struct LogEvent {
    severity: EventSeverity,
    target: EventTarget,
    message: ClassifiedValue<String>,
    error: Option<PipelineError>,
    timestamp: DateTime<Utc>,
}

impl LogEvent {
    pub fn new(severity: EventSeverity, target: EventTarget, message: ClassifiedValue<String>) -> Self {
        Self {
            severity,
            target,
            message,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Event raised from a stage error. The message is the error's text.
    pub fn from_error(severity: EventSeverity, target: EventTarget, error: PipelineError) -> Self {
        Self {
            severity,
            target,
            message: ClassifiedValue::new(error.to_string(), Classification::SystemInternal),
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        self.severity
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn message(&self) -> &ClassifiedValue<String> {
        &self.message
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Long form handed to the log store alongside the message.
    pub fn detail(&self) -> String {
        match &self.error {
            Some(err) => format!("{:?}", err),
            None => format!("{}/{}: {}", self.severity, self.target, self.message.as_str()),
        }
    }
}
