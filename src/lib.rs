//! sinkguard - Classification-aware user data pipeline
//!
//! Processes one user's request end to end: loads server configuration,
//! retrieves card, profile and instrument data, sanitizes and localizes it,
//! and submits the result to an outbound endpoint. The implementation
//! prioritizes:
//!
//! 1. **Clearance** - Every value carries a classification, and every sink
//!    write is checked against that sink's clearance
//! 2. **Containment** - A stage failure becomes one classified log event,
//!    never raw exposure
//! 3. **Logging** - Every stage logged with run context
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `classification` - Classified values, sinks and the clearance gate
//! - `validation` - Format and presence rules
//! - `security` - Display escaping, PII scrubbing, collaborator sanitizers
//! - `events` - Log events and the sink router
//! - `pipeline` - Retrieval, transform and submission stages, orchestrator
//! - `collaborators` - External service interfaces and a file-backed one
//! - `config` - Environment configuration
//! - `logging` - Structured logging with run context

pub mod classification;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod security;
pub mod validation;

pub use classification::{Classification, ClassifiedValue, Sink};
pub use error::{CollaboratorError, PipelineError};
pub use pipeline::{Pipeline, PipelineSettings, RunReport};
