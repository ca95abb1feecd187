//! Event sink router.
//!
//! Every log event goes through `EventRouter::emit`, which:
//! 1. persists the event to the log store partition named by its target
//! 2. escalates the raw message to the emergency sink when a Critical event
//!    could not be persisted
//! 3. writes the scrubbed message to the console

use crate::classification::{check_clearance, ClassifiedValue, Sink};
use crate::collaborators::{AuditBackend, Console, Scrubber, EMERGENCY_ACCEPTED};
use crate::error::PipelineError;
use crate::logging::LogContext;
use crate::security::scrub::sanitize_error_message;

use super::types::{EventSeverity, EventTarget, LogEvent};

/// What happened to one emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitReport {
    pub persisted: bool,
    /// Emergency notification status, when escalation happened.
    pub escalation: Option<i32>,
    pub console_written: bool,
}

/// Routes log events to the log store, emergency sink and console.
pub struct EventRouter<'a> {
    backend: &'a dyn AuditBackend,
    scrubber: &'a dyn Scrubber,
    console: &'a dyn Console,
    ctx: LogContext,
}

impl<'a> EventRouter<'a> {
    pub fn new(
        backend: &'a dyn AuditBackend,
        scrubber: &'a dyn Scrubber,
        console: &'a dyn Console,
        ctx: LogContext,
    ) -> Self {
        Self {
            backend,
            scrubber,
            console,
            ctx,
        }
    }

    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    /// Same sinks, diagnostic lines tagged with `stage`.
    pub fn for_stage(&self, stage: &'static str) -> EventRouter<'a> {
        EventRouter {
            backend: self.backend,
            scrubber: self.scrubber,
            console: self.console,
            ctx: self.ctx.with_stage(stage),
        }
    }

    pub fn scrubber(&self) -> &'a dyn Scrubber {
        self.scrubber
    }

    /// Route one event.
    pub fn emit(&self, event: LogEvent) -> EmitReport {
        let message = event.message();

        let persisted = match check_clearance(message, Sink::LogStore) {
            Ok(()) => self.backend.persist_log(
                event.severity(),
                event.target(),
                message.as_str(),
                &event.detail(),
            ),
            Err(_) => false,
        };

        log::debug!(
            "{} EVENT_ROUTED severity={} target={} classification={} persisted={}",
            self.ctx,
            event.severity(),
            event.target(),
            message.classification(),
            persisted
        );

        // A Critical event that could not be persisted is escalated with its
        // raw, unscrubbed message: confidentiality is traded for the
        // availability of the alert. The emergency sink is cleared for every
        // classification.
        let escalation = if event.severity() == EventSeverity::Critical && !persisted {
            self.escalate(message)
        } else {
            None
        };

        let sanitized = sanitize_error_message(self.scrubber, message);
        let console_written = self.console(&sanitized).is_ok();

        EmitReport {
            persisted,
            escalation,
            console_written,
        }
    }

    fn escalate(&self, message: &ClassifiedValue<String>) -> Option<i32> {
        if message.is_empty() {
            return None;
        }
        check_clearance(message, Sink::EmergencySink).ok()?;

        let status = self.backend.notify_emergency(message.as_str());
        if status == EMERGENCY_ACCEPTED {
            log::warn!("{} EMERGENCY_ESCALATED status={}", self.ctx, status);
        } else {
            log::error!("{} EMERGENCY_ESCALATION_FAILED status={}", self.ctx, status);
        }
        Some(status)
    }

    /// Write a line to the console if its classification is cleared.
    pub fn console(&self, line: &ClassifiedValue<String>) -> Result<(), PipelineError> {
        check_clearance(line, Sink::Console)?;
        self.console.write_line(line.as_str());
        Ok(())
    }

    /// Console write for stage output.
    ///
    /// Stage output is always sanitized first, so a refused line is a broken
    /// sanitizer: debug builds panic, release builds drop the line after the
    /// gate has logged the violation.
    pub fn display(&self, line: &ClassifiedValue<String>) -> bool {
        let written = self.console(line).is_ok();
        debug_assert!(
            written,
            "{} value reached a console display write",
            line.classification()
        );
        written
    }

    /// Debug/Application note for developers.
    pub fn programmer_note(&self, message: ClassifiedValue<String>) -> EmitReport {
        self.emit(LogEvent::new(
            EventSeverity::Debug,
            EventTarget::Application,
            message,
        ))
    }

    /// Debug/Application note carrying a stage error.
    pub fn programmer_error(&self, error: PipelineError) -> EmitReport {
        self.emit(LogEvent::from_error(
            EventSeverity::Debug,
            EventTarget::Application,
            error,
        ))
    }

    /// Info/Audit event.
    pub fn audit(&self, message: ClassifiedValue<String>) -> EmitReport {
        self.emit(LogEvent::new(EventSeverity::Info, EventTarget::Audit, message))
    }

    /// Warning/Security event.
    pub fn security(&self, message: ClassifiedValue<String>) -> EmitReport {
        self.emit(LogEvent::new(
            EventSeverity::Warning,
            EventTarget::Security,
            message,
        ))
    }

    /// Fail/Application event for an absorbed stage error.
    pub fn fail(&self, error: PipelineError) -> EmitReport {
        self.emit(LogEvent::from_error(
            EventSeverity::Fail,
            EventTarget::Application,
            error,
        ))
    }

    /// Critical/Application event for an absorbed stage error.
    pub fn critical(&self, error: PipelineError) -> EmitReport {
        self.emit(LogEvent::from_error(
            EventSeverity::Critical,
            EventTarget::Application,
            error,
        ))
    }
}
