use serde::Serialize;

use crate::dsl::StateDefinition;

/// Id of the synthetic start node.
pub const START_NODE_ID: &str = "startNode";
/// Id of the synthetic end node.
pub const END_NODE_ID: &str = "endNode";

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    End,
    State,
}

/// Top-left corner of a node in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Diagram node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// State id, or one of [`START_NODE_ID`] / [`END_NODE_ID`]
    pub id: String,

    pub kind: NodeKind,

    pub label: String,

    /// Secondary label (function name, delay duration...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Assigned by the layout engine
    pub position: Position,

    /// Source definition; `None` for the synthetic nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateDefinition>,
}

impl GraphNode {
    pub fn start() -> Self {
        Self::synthetic(START_NODE_ID, NodeKind::Start)
    }

    pub fn end() -> Self {
        Self::synthetic(END_NODE_ID, NodeKind::End)
    }

    fn synthetic(id: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: String::new(),
            detail: None,
            position: Position::default(),
            state: None,
        }
    }

    pub fn from_state(state: &StateDefinition) -> Self {
        Self {
            id: state.id.clone(),
            kind: NodeKind::State,
            label: state.id.clone(),
            detail: state.kind.detail(),
            position: Position::default(),
            state: Some(state.clone()),
        }
    }

    /// Logical box size `(width, height)` used by the layout.
    pub fn size(&self) -> (f64, f64) {
        match self.kind {
            NodeKind::Start | NodeKind::End => (40.0, 40.0),
            NodeKind::State => (80.0, 30.0),
        }
    }
}

/// What produced an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// From the synthetic start node
    Start,
    Event,
    Condition,
    Catch,
    Transition,
    DefaultTransition,
    /// Into the synthetic end node for a state without a forward transition
    End,
}

/// Diagram edge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// `"{source}-{target}"`; not unique when a state has parallel edges
    pub id: String,

    pub source: String,

    pub target: String,

    pub kind: EdgeKind,

    /// Set by the trace highlighting pass
    pub highlighted: bool,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, kind: EdgeKind) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            highlighted: false,
        }
    }

    /// Composite key that stays unique where `id` does not.
    pub fn key(&self) -> (&str, &str, EdgeKind) {
        (&self.source, &self.target, self.kind)
    }

    /// Spacing hint `(width, height)` used only to spread ranks apart.
    pub fn spacing_hint(&self) -> (f64, f64) {
        if self.source == START_NODE_ID {
            (0.0, 20.0)
        } else if self.target == END_NODE_ID {
            (30.0, 20.0)
        } else {
            (60.0, 60.0)
        }
    }
}

/// Assembled diagram: nodes and edges in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl DiagramGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All edges between `source` and `target`, in emission order.
    pub fn edges_between<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == source && e.target == target)
    }

    pub fn outgoing<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    pub fn highlighted_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.highlighted)
    }

    /// Node and edge ids with positions stripped, for comparing rebuilds.
    pub fn topology(&self) -> (Vec<String>, Vec<(String, String, EdgeKind, bool)>) {
        (
            self.nodes.iter().map(|n| n.id.clone()).collect(),
            self.edges
                .iter()
                .map(|e| (e.source.clone(), e.target.clone(), e.kind, e.highlighted))
                .collect(),
        )
    }
}
