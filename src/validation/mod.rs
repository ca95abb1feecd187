//! Validation module.
//!
//! Presence and format rules applied to every retrieved value before it may
//! proceed through the pipeline.

pub mod rules;

pub use rules::*;
