//! Classification module.
//!
//! Defines the sensitivity tags, the sinks values may reach, and the clearance
//! table that gates every sink write.

pub mod model;
pub mod value;

pub use model::*;
pub use value::*;
