//! User-processing pipeline.
//!
//! Stages, leaf first:
//! - Retrieval (configuration, card, profile, instruments, identity)
//! - Transform (display sanitization, localization)
//! - Submission
//! - Orchestration of one run over all of the above

pub mod context;
pub mod orchestrator;
pub mod retrieval;
pub mod submission;
pub mod transform;

pub use context::*;
pub use orchestrator::*;
pub use retrieval::*;
pub use submission::*;
pub use transform::*;
