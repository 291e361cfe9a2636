//! The workflow diagram component.
//!
//! [`WorkflowDiagram`] owns one diagram and rebuilds it whenever its inputs
//! (source text, trace, instance status) change. A consumer redraws when
//! [`WorkflowDiagram::take_dirty`] says so.

use crate::config::LayoutConfig;
use crate::dsl::{parse_workflow, DslFormat, InstanceStatus, WorkflowSource};
use crate::error::DiagramResult;
use crate::graph::{
    assemble_graph, highlight_trace, validate_graph, Diagnostic, DiagramGraph, LayoutEngine,
};

/// Assemble, highlight and lay out a parsed workflow in one go.
///
/// Returns `None` when the workflow has no states.
pub fn build_diagram(
    source: &WorkflowSource,
    trace: &[String],
    status: Option<InstanceStatus>,
    layout: &LayoutEngine,
) -> Option<DiagramGraph> {
    let mut graph = assemble_graph(source)?;
    highlight_trace(&mut graph, trace, status);
    layout.apply(&mut graph);
    Some(graph)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramState {
    NotLoaded,
    Loaded,
}

/// Inputs the current diagram was built from.
#[derive(Debug, Clone, PartialEq)]
struct BuildInputs {
    source: String,
    trace: Vec<String>,
    status: Option<InstanceStatus>,
}

#[derive(Debug)]
pub struct WorkflowDiagram {
    format: DslFormat,
    layout: LayoutEngine,
    state: DiagramState,
    inputs: Option<BuildInputs>,
    graph: Option<DiagramGraph>,
    dirty: bool,
}

impl Default for WorkflowDiagram {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl WorkflowDiagram {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            format: DslFormat::Yaml,
            layout: LayoutEngine::new(layout),
            state: DiagramState::NotLoaded,
            inputs: None,
            graph: None,
            dirty: false,
        }
    }

    /// Source format for [`update`](Self::update); YAML by default.
    pub fn with_format(mut self, format: DslFormat) -> Self {
        self.format = format;
        self
    }

    pub fn state(&self) -> DiagramState {
        self.state
    }

    /// The current diagram; `None` before the first load and for workflows
    /// without states.
    pub fn graph(&self) -> Option<&DiagramGraph> {
        self.graph.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Feed the component its inputs. Returns whether the diagram was rebuilt.
    ///
    /// Unchanged inputs are a no-op once loaded. Any change (source, trace
    /// or status) rebuilds the whole node/edge list. Source text that fails
    /// to parse leaves the current diagram untouched.
    pub fn update(
        &mut self,
        source: &str,
        trace: &[String],
        status: Option<InstanceStatus>,
    ) -> DiagramResult<bool> {
        let inputs = BuildInputs {
            source: source.to_string(),
            trace: trace.to_vec(),
            status,
        };
        if self.state == DiagramState::Loaded && self.inputs.as_ref() == Some(&inputs) {
            return Ok(false);
        }

        let parsed = parse_workflow(source, self.format).inspect_err(|e| {
            tracing::warn!(error = %e, "workflow source rejected; keeping previous diagram");
        })?;

        self.graph = build_diagram(&parsed, trace, status, &self.layout);
        if self.graph.is_none() {
            tracing::info!("workflow has no states; diagram is empty");
        }
        self.inputs = Some(inputs);
        self.state = DiagramState::Loaded;
        self.dirty = true;
        Ok(true)
    }

    /// Ask the consumer to redraw without touching the diagram.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Recompute node positions for the current diagram.
    pub fn relayout(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            self.layout.apply(graph);
        }
        self.dirty = true;
    }

    /// Return the dirty flag and clear it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Diagnostics for the current diagram.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.graph.as_ref().map(validate_graph).unwrap_or_default()
    }
}
