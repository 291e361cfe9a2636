//! Diagram graph construction and layout.
//!
//! [`assemble_graph`] turns a [`WorkflowSource`](crate::dsl::WorkflowSource)
//! into a [`DiagramGraph`], [`highlight_trace`] marks the path an instance
//! took, and [`LayoutEngine`] assigns node positions.

pub mod builder;
pub mod highlight;
pub mod layout;
pub mod traversal;
pub mod types;
pub mod validator;

pub use builder::*;
pub use highlight::highlight_trace;
pub use layout::LayoutEngine;
pub use types::*;
pub use validator::{validate_graph, Diagnostic, DiagnosticLevel};
