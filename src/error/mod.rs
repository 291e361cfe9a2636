//! Error types for the diagram builder.
//!
//! Building a diagram never fails because of the workflow's *shape*: missing
//! states or dangling transitions produce an empty or partial diagram. The
//! errors here cover what cannot be recovered locally: unreadable input,
//! unparseable source text, and bad configuration.

pub mod diagram_error;

pub use diagram_error::DiagramError;

/// Convenience alias for diagram-level results.
pub type DiagramResult<T> = Result<T, DiagramError>;
