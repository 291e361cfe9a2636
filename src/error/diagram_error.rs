//! Diagram-level error types.

use thiserror::Error;

/// Errors raised while loading a workflow or building its diagram.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("Workflow source parse error: {0}")]
    SourceParse(String),
    #[error("Config parse error: {0}")]
    ConfigParse(String),
    #[error("Unknown instance status: {0}")]
    UnknownStatus(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for DiagramError {
    fn from(e: serde_json::Error) -> Self {
        DiagramError::Serialize(e.to_string())
    }
}
