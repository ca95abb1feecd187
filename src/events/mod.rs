//! Log events and the router that delivers them to their sinks.

pub mod router;
pub mod types;

pub use router::*;
pub use types::*;
