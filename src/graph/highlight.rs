//! Execution-trace highlighting.
//!
//! Marks the edges an instance actually travelled. Only
//! [`GraphEdge::highlighted`] is touched; the graph structure never changes.

use crate::dsl::InstanceStatus;

use super::types::{DiagramGraph, END_NODE_ID, START_NODE_ID};

/// Highlight the edges along `trace`, an ordered list of visited state ids.
///
/// Every call starts from a clean slate, so running the pass twice with the
/// same inputs gives the same result.
pub fn highlight_trace(graph: &mut DiagramGraph, trace: &[String], status: Option<InstanceStatus>) {
    for edge in &mut graph.edges {
        edge.highlighted = false;
    }

    let terminal = status.is_some_and(InstanceStatus::highlights_end_edges);

    for (i, current) in trace.iter().enumerate() {
        let previous = if i == 0 {
            START_NODE_ID
        } else {
            trace[i - 1].as_str()
        };
        mark(graph, previous, current);

        let Some(state) = graph.node(current).and_then(|n| n.state.as_ref()) else {
            tracing::debug!(state = %current, "trace entry has no matching state");
            continue;
        };

        // Literal `||`: a state counts as having no forward transition unless
        // both `transition` and `defaultTransition` are set.
        let last = i + 1 == trace.len();
        let mut no_transition = state.transition.is_none() || state.default_transition.is_none();
        if no_transition && state.has_catch_transition() {
            no_transition = last && terminal;
        }

        // Only the final entry can have left through the end node.
        if last && no_transition && terminal {
            mark(graph, current, END_NODE_ID);
        }
    }
}

fn mark(graph: &mut DiagramGraph, source: &str, target: &str) {
    for edge in graph
        .edges
        .iter_mut()
        .filter(|e| e.source == source && e.target == target)
    {
        edge.highlighted = true;
    }
}
