//! Security module.
//!
//! Provides the sanitizers that lower a value's classification for a given
//! sink, plus the regex scrubbing used by the local collaborator.

pub mod pii;
pub mod sanitizer;
pub mod scrub;

pub use pii::*;
pub use sanitizer::*;
pub use scrub::*;
