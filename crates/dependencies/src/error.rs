//! Error types for dependency clients and probes

use std::time::Duration;
use thiserror::Error;

/// Failure talking to an external dependency.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    InvalidAddress(String),

    #[error("{0}")]
    Protocol(String),
}

/// A probe that could not produce a status at all.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Probe failed: {0}")]
    Failed(String),

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Client(#[from] ClientError),
}
