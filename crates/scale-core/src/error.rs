//! Error types for the Scale scheduler core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScaleError>;

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Node not found: {hostname}")]
    NodeNotFound { hostname: String },

    #[error("Persistence operation failed: {reason}")]
    Persistence { reason: String },

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Reconciliation conflict: {reason}")]
    ReconciliationConflict { reason: String },

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

impl ScaleError {
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
