//! Non-fatal diagram diagnostics.
//!
//! Nothing here changes the graph: dangling transitions and unreachable
//! states are drawn as they are and only reported.

use std::collections::HashSet;

use serde::Serialize;

use super::traversal::reachable_from;
use super::types::{DiagramGraph, NodeKind, START_NODE_ID};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
}

/// 检查图并返回诊断信息
pub fn validate_graph(graph: &DiagramGraph) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    // 1. 悬空边
    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                diags.push(warn(
                    "W201",
                    format!("Edge {} points at unknown state: {}", edge.id, endpoint),
                    None,
                    Some(edge.id.clone()),
                ));
            }
        }
    }

    // 2. 不可达状态
    let reachable = reachable_from(graph, START_NODE_ID);
    for node in graph.nodes.iter().filter(|n| n.kind == NodeKind::State) {
        if !reachable.contains(node.id.as_str()) {
            diags.push(warn(
                "W202",
                format!("Unreachable state: {}", node.id),
                Some(node.id.clone()),
                None,
            ));
        }
    }

    // 3. 重复的边 ID
    let mut seen_edges = HashSet::new();
    for edge in &graph.edges {
        if !seen_edges.insert(edge.id.as_str()) {
            diags.push(warn(
                "W203",
                format!("Duplicate edge id: {}", edge.id),
                None,
                Some(edge.id.clone()),
            ));
        }
    }

    // 4. 重复的状态 ID
    let mut seen_nodes = HashSet::new();
    for node in &graph.nodes {
        if !seen_nodes.insert(node.id.as_str()) {
            diags.push(warn(
                "W204",
                format!("Duplicate state id: {}", node.id),
                Some(node.id.clone()),
                None,
            ));
        }
    }

    diags
}

fn warn(code: &str, message: String, node_id: Option<String>, edge_id: Option<String>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Warning,
        code: code.to_string(),
        message,
        node_id,
        edge_id,
    }
}
