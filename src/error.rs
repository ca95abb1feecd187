//! Error types.
//!
//! `PipelineError` is raised and absorbed inside a single stage; it never
//! crosses a stage boundary. `CollaboratorError` is what an external
//! collaborator reports when a call fails outright.

use thiserror::Error;

use crate::classification::{Classification, Sink};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("userID invalid")]
    InvalidUserId,

    #[error("Configuration file corrupt")]
    ConfigCorrupt,

    #[error("user profile data incomplete")]
    ProfileIncomplete,

    #[error("invalid card data")]
    InvalidCardData,

    #[error("{name} data invalid")]
    EmptyCollection { name: &'static str },

    #[error("{name}[{index}] null")]
    NullElement { name: &'static str, index: usize },

    #[error("host information for submission invalid")]
    HostInfoInvalid,

    #[error("unexpected host")]
    UnexpectedHost,

    #[error("userid not included in submission")]
    MissingUserId,

    #[error("user password not included in submission")]
    MissingCredential,

    #[error("user password does not conform to policy")]
    CredentialPolicy,

    #[error("credit card data not included in submission")]
    MissingCardData,

    #[error("{classification} value not cleared for {sink}")]
    NotCleared {
        classification: Classification,
        sink: Sink,
    },

    #[error("invalid command line argument passed to application")]
    InvalidArguments,

    #[error("Unexpected post failure, error code: {0}")]
    UnexpectedPostFailure(i32),

    #[error("external call failed: {0}")]
    Collaborator(#[from] CollaboratorError),
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
