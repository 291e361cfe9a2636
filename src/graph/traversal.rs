use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;

use super::types::DiagramGraph;

/// 以节点 ID 为键的邻接视图（悬空边的目标也会成为节点）
pub fn adjacency(graph: &DiagramGraph) -> DiGraphMap<&str, ()> {
    let mut map = DiGraphMap::new();
    for node in &graph.nodes {
        map.add_node(node.id.as_str());
    }
    for edge in &graph.edges {
        map.add_edge(edge.source.as_str(), edge.target.as_str(), ());
    }
    map
}

/// 从 root 出发可达的所有节点 ID（含 root 本身）
pub fn reachable_from<'a>(graph: &'a DiagramGraph, root: &str) -> HashSet<&'a str> {
    let map = adjacency(graph);
    let mut reachable = HashSet::new();

    let Some(start) = graph.nodes.iter().map(|n| n.id.as_str()).find(|id| *id == root) else {
        return reachable;
    };

    let mut bfs = Bfs::new(&map, start);
    while let Some(id) = bfs.next(&map) {
        reachable.insert(id);
    }
    reachable
}
