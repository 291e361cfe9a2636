//! # flowgraph — workflow diagrams from workflow definitions
//!
//! `flowgraph` turns a workflow definition (a list of states and the
//! transitions between them) into a positioned node/edge diagram, ready to
//! hand to any directed-graph renderer:
//!
//! - **Assembly**: every state becomes a node; events, conditions, catch
//!   entries, transitions and default transitions become edges. Synthetic
//!   start and end nodes frame the diagram.
//! - **Trace highlighting**: given the ordered list of states an instance
//!   visited and its status, the travelled edges are marked.
//! - **Layout**: a layered left-to-right (or top-to-bottom) layout assigns
//!   node positions.
//! - **Diagnostics**: dangling transitions, unreachable states and
//!   duplicate ids are reported without altering the diagram.
//! - **Log viewport**: a virtualized list model for instance logs with a
//!   row-height cache and auto-follow.
//!
//! # Quick Start
//!
//! ```rust
//! use flowgraph::{parse_workflow, build_diagram, DslFormat, InstanceStatus, LayoutEngine};
//!
//! let yaml = r#"
//! states:
//!   - id: hello
//!     type: noop
//!     transition: bye
//!   - id: bye
//!     type: noop
//! "#;
//! let source = parse_workflow(yaml, DslFormat::Yaml).unwrap();
//! let trace = vec!["hello".to_string(), "bye".to_string()];
//! let diagram = build_diagram(
//!     &source,
//!     &trace,
//!     Some(InstanceStatus::Complete),
//!     &LayoutEngine::default(),
//! )
//! .unwrap();
//! assert_eq!(diagram.highlighted_edges().count(), 3);
//! ```

pub mod config;
pub mod diagram;
pub mod dsl;
pub mod error;
pub mod graph;
pub mod viewport;

pub use crate::config::{DiagramConfig, LayoutConfig, RankDir, ViewportConfig};
pub use crate::diagram::{build_diagram, DiagramState, WorkflowDiagram};
pub use crate::dsl::{
    parse_workflow, DslFormat, InstanceStatus, StateDefinition, StateKind, WorkflowSource,
};
pub use crate::error::{DiagramError, DiagramResult};
pub use crate::graph::{
    assemble_graph, highlight_trace, validate_graph, Diagnostic, DiagnosticLevel, DiagramGraph,
    EdgeKind, GraphEdge, GraphNode, LayoutEngine, NodeKind, Position,
};
pub use crate::viewport::{LogViewport, RowHeightCache};
