use crate::dsl::{BranchDefinition, StateDefinition, WorkflowSource};

use super::types::*;

/// Build the diagram graph for a workflow source.
///
/// Returns `None` when the source declares no states; callers render
/// nothing in that case. Edges are appended in emission order without
/// deduplication, and transitions to unknown state ids are kept as-is.
pub fn assemble_graph(source: &WorkflowSource) -> Option<DiagramGraph> {
    let states = source.states();
    if states.is_empty() {
        tracing::debug!("workflow has no states; skipping graph assembly");
        return None;
    }

    let mut graph = DiagramGraph::default();

    for (i, state) in states.iter().enumerate() {
        // 1. 开始节点连到声明的起始状态或第一个状态
        if i == 0 {
            let target = source.start_state().unwrap_or(state.id.as_str());
            graph
                .edges
                .push(GraphEdge::new(START_NODE_ID, target, EdgeKind::Start));
        }

        // 2. 状态节点
        graph.nodes.push(GraphNode::from_state(state));

        // 3. 分支边（事件、条件、异常捕获）
        push_branch_edges(&mut graph, state, &state.events, EdgeKind::Event);
        push_branch_edges(&mut graph, state, &state.conditions, EdgeKind::Condition);
        push_branch_edges(&mut graph, state, &state.catch, EdgeKind::Catch);

        // 4. 前向转移；没有则连到结束节点
        let (target, kind) = match (&state.transition, &state.default_transition) {
            (Some(t), _) => (t.as_str(), EdgeKind::Transition),
            (None, Some(t)) => (t.as_str(), EdgeKind::DefaultTransition),
            (None, None) => (END_NODE_ID, EdgeKind::End),
        };
        graph.edges.push(GraphEdge::new(&state.id, target, kind));
    }

    // 5. 合成的开始/结束节点放在最后
    graph.nodes.push(GraphNode::start());
    graph.nodes.push(GraphNode::end());

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "assembled workflow graph"
    );

    Some(graph)
}

fn push_branch_edges(
    graph: &mut DiagramGraph,
    state: &StateDefinition,
    branches: &[BranchDefinition],
    kind: EdgeKind,
) {
    graph.edges.extend(
        branches
            .iter()
            .filter_map(|b| b.transition.as_deref())
            .map(|target| GraphEdge::new(&state.id, target, kind)),
    );
}
