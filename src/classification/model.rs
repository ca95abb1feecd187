//! Sensitivity classes, sinks and the clearance table.
//!
//! Clearances are declared here by the pipeline designer. Nothing is inferred:
//! a value carries the tag it was given at retrieval time, and a sink accepts it
//! only when the tag appears in that sink's clearance set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

use super::value::ClassifiedValue;

/// Sensitivity tag attached to every value that flows through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Plaintext,
    Credential,
    PaymentCard,
    PersonallyIdentifiable,
    SystemInternal,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Plaintext,
        Classification::Credential,
        Classification::PaymentCard,
        Classification::PersonallyIdentifiable,
        Classification::SystemInternal,
    ];

    /// Risk rank used when several classified parts are combined.
    ///
    /// Plaintext < SystemInternal < PersonallyIdentifiable < PaymentCard < Credential
    pub fn risk(self) -> u8 {
        match self {
            Classification::Plaintext => 0,
            Classification::SystemInternal => 1,
            Classification::PersonallyIdentifiable => 2,
            Classification::PaymentCard => 3,
            Classification::Credential => 4,
        }
    }

    /// Least upper bound of two classifications.
    pub fn join(self, other: Classification) -> Classification {
        if other.risk() > self.risk() {
            other
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Plaintext => "plaintext",
            Classification::Credential => "credential",
            Classification::PaymentCard => "payment_card",
            Classification::PersonallyIdentifiable => "personally_identifiable",
            Classification::SystemInternal => "system_internal",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A destination a value may be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sink {
    Console,
    LogStore,
    EmergencySink,
    OutboundResponse,
}

impl Sink {
    pub const ALL: [Sink; 4] = [
        Sink::Console,
        Sink::LogStore,
        Sink::EmergencySink,
        Sink::OutboundResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sink::Console => "console",
            Sink::LogStore => "log_store",
            Sink::EmergencySink => "emergency_sink",
            Sink::OutboundResponse => "outbound_response",
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifications a sink accepts.
///
/// The log store is the protected audit store and accepts everything. The
/// emergency sink also accepts everything: critical alerts whose persistence
/// failed are escalated with their raw message (see `EventRouter::emit`).
pub fn clearance_of(sink: Sink) -> &'static [Classification] {
    use Classification::*;

    match sink {
        Sink::Console => &[Plaintext, SystemInternal],
        Sink::LogStore => &Classification::ALL,
        Sink::EmergencySink => &Classification::ALL,
        Sink::OutboundResponse => &[Plaintext, Credential, PersonallyIdentifiable],
    }
}

/// Whether `classification` may be written to `sink`.
pub fn classification_cleared(classification: Classification, sink: Sink) -> bool {
    clearance_of(sink).contains(&classification)
}

/// Whether `value` may be written to `sink`.
pub fn is_cleared<T>(value: &ClassifiedValue<T>, sink: Sink) -> bool {
    classification_cleared(value.classification(), sink)
}

/// Gate consulted by every sink write.
///
/// A violation is a contract breach: it is reported as an error and the value
/// is never written, neither as-is nor demoted.
pub fn check_clearance<T>(value: &ClassifiedValue<T>, sink: Sink) -> Result<(), PipelineError> {
    if is_cleared(value, sink) {
        Ok(())
    } else {
        log::error!(
            "CLEARANCE_VIOLATION sink={} classification={}",
            sink,
            value.classification()
        );
        Err(PipelineError::NotCleared {
            classification: value.classification(),
            sink,
        })
    }
}
