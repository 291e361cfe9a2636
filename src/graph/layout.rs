//! Layered layout for assembled diagrams.
//!
//! A compact Sugiyama-style pipeline over `petgraph`: cycle removal through
//! a greedy feedback arc set, longest-path ranking, barycenter ordering and
//! coordinate assignment. Only node positions are written; edges are left
//! for the renderer to route.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use petgraph::algo::{greedy_feedback_arc_set, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::config::{LayoutConfig, RankDir};

use super::types::{DiagramGraph, Position};

/// Upper bound (exclusive) of the random x offset applied when jitter is on.
const JITTER: f64 = 0.01;

/// An edge between node-list indices, oriented so the layout graph is acyclic.
#[derive(Debug, Clone, Copy)]
struct LayoutEdge {
    source: usize,
    target: usize,
    hint: (f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Assign a position to every node of `graph`.
    pub fn apply(&self, graph: &mut DiagramGraph) {
        if graph.nodes.is_empty() {
            return;
        }

        let edges = oriented_edges(graph);
        let ranks = rank_nodes(graph.nodes.len(), &edges);
        let layers = self.order_layers(&ranks, &edges);
        let centers = self.centers(graph, &ranks, &layers, &edges);

        let corners: Vec<(f64, f64)> = graph
            .nodes
            .iter()
            .zip(&centers)
            .map(|(node, &(cx, cy))| {
                let (w, h) = node.size();
                (cx - w / 2.0, cy - h / 2.0)
            })
            .collect();
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);

        for (node, (x, y)) in graph.nodes.iter_mut().zip(corners) {
            let jitter = if self.config.jitter {
                rand::random::<f64>() * JITTER
            } else {
                0.0
            };
            node.position = Position::new(x - min_x + jitter, y - min_y);
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            ranks = layers.len(),
            "laid out workflow graph"
        );
    }

    /// Group nodes by rank, then reorder each rank by the barycenter of its
    /// neighbours in alternating downward/upward sweeps.
    fn order_layers(&self, ranks: &[usize], edges: &[LayoutEdge]) -> Vec<Vec<usize>> {
        let depth = ranks.iter().max().map_or(0, |r| r + 1);
        let mut layers = vec![Vec::new(); depth];
        for (node, &rank) in ranks.iter().enumerate() {
            layers[rank].push(node);
        }

        let mut preds = vec![Vec::new(); ranks.len()];
        let mut succs = vec![Vec::new(); ranks.len()];
        for e in edges {
            succs[e.source].push(e.target);
            preds[e.target].push(e.source);
        }

        let mut slot = vec![0usize; ranks.len()];
        for layer in &layers {
            for (i, &n) in layer.iter().enumerate() {
                slot[n] = i;
            }
        }

        for sweep in 0..self.config.order_sweeps {
            let downward = sweep % 2 == 0;
            let (sweep_ranks, neighbours): (Vec<usize>, _) = if downward {
                ((1..depth).collect(), &preds)
            } else {
                ((0..depth.saturating_sub(1)).rev().collect(), &succs)
            };

            for rank in sweep_ranks {
                let mut keyed: Vec<(f64, usize)> = layers[rank]
                    .iter()
                    .map(|&n| {
                        let adjacent: &Vec<usize> = &neighbours[n];
                        let center = if adjacent.is_empty() {
                            slot[n] as f64
                        } else {
                            adjacent.iter().map(|&m| slot[m] as f64).sum::<f64>()
                                / adjacent.len() as f64
                        };
                        (center, n)
                    })
                    .collect();
                keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

                layers[rank] = keyed.into_iter().map(|(_, n)| n).collect();
                for (i, &n) in layers[rank].iter().enumerate() {
                    slot[n] = i;
                }
            }
        }

        layers
    }

    /// Node centres. Ranks are stacked along the rank axis, spaced by
    /// `rank_sep` plus the widest spacing hint leaving that rank; each rank is
    /// centred on the cross axis.
    fn centers(
        &self,
        graph: &DiagramGraph,
        ranks: &[usize],
        layers: &[Vec<usize>],
        edges: &[LayoutEdge],
    ) -> Vec<(f64, f64)> {
        let left_right = self.config.rank_dir == RankDir::LeftRight;
        // (along rank axis, across rank axis)
        let extent = |n: usize| {
            let (w, h) = graph.nodes[n].size();
            if left_right {
                (w, h)
            } else {
                (h, w)
            }
        };

        let mut gaps = vec![self.config.rank_sep; layers.len()];
        for e in edges {
            let hint = if left_right { e.hint.0 } else { e.hint.1 };
            let gap = &mut gaps[ranks[e.source]];
            *gap = gap.max(self.config.rank_sep + hint);
        }

        let mut along = vec![0.0; layers.len()];
        let mut cursor = 0.0;
        for (rank, layer) in layers.iter().enumerate() {
            let thickness = layer.iter().map(|&n| extent(n).0).fold(0.0, f64::max);
            along[rank] = cursor + thickness / 2.0;
            cursor += thickness + gaps[rank];
        }

        let mut centers = vec![(0.0, 0.0); graph.nodes.len()];
        for (rank, layer) in layers.iter().enumerate() {
            let span = layer.iter().map(|&n| extent(n).1).sum::<f64>()
                + self.config.node_sep * layer.len().saturating_sub(1) as f64;
            let mut cursor = -span / 2.0;
            for &n in layer {
                let size = extent(n).1;
                let across = cursor + size / 2.0;
                cursor += size + self.config.node_sep;
                centers[n] = if left_right {
                    (along[rank], across)
                } else {
                    (across, along[rank])
                };
            }
        }

        centers
    }
}

/// Resolve edges to node indices (first node wins on duplicate ids), drop
/// dangling edges and self-loops, and reverse a feedback arc set so the
/// result is acyclic.
fn oriented_edges(graph: &DiagramGraph) -> Vec<LayoutEdge> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, node) in graph.nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(i);
    }

    let mut dag = DiGraph::<(), (f64, f64)>::with_capacity(graph.nodes.len(), graph.edges.len());
    for _ in &graph.nodes {
        dag.add_node(());
    }
    for edge in &graph.edges {
        let (Some(&s), Some(&t)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            tracing::debug!(edge = %edge.id, "dangling edge left out of layout");
            continue;
        };
        if s != t {
            dag.add_edge(NodeIndex::new(s), NodeIndex::new(t), edge.spacing_hint());
        }
    }

    let reversed: HashSet<_> = greedy_feedback_arc_set(&dag).map(|e| e.id()).collect();

    dag.edge_references()
        .map(|e| {
            let (s, t) = (e.source().index(), e.target().index());
            let (source, target) = if reversed.contains(&e.id()) { (t, s) } else { (s, t) };
            LayoutEdge {
                source,
                target,
                hint: *e.weight(),
            }
        })
        .collect()
}

/// Longest-path ranking: every node sits one rank after its furthest predecessor.
fn rank_nodes(count: usize, edges: &[LayoutEdge]) -> Vec<usize> {
    let mut dag = DiGraph::<(), ()>::with_capacity(count, edges.len());
    for _ in 0..count {
        dag.add_node(());
    }
    for e in edges {
        dag.add_edge(NodeIndex::new(e.source), NodeIndex::new(e.target), ());
    }

    let order: Vec<NodeIndex> = match toposort(&dag, None) {
        Ok(order) => order,
        Err(cycle) => {
            tracing::warn!(
                node = cycle.node_id().index(),
                "cycle survived feedback arc removal; ranking in insertion order"
            );
            dag.node_indices().collect()
        }
    };

    let mut ranks = vec![0usize; count];
    for n in order {
        let next = ranks[n.index()] + 1;
        for succ in dag.neighbors(n) {
            ranks[succ.index()] = ranks[succ.index()].max(next);
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{StateDefinition, StateKind, WorkflowSource};
    use crate::graph::types::{END_NODE_ID, START_NODE_ID};
    use crate::graph::{assemble_graph, GraphEdge, EdgeKind};

    fn graph(states: Vec<StateDefinition>) -> DiagramGraph {
        assemble_graph(&WorkflowSource {
            states: Some(states),
            ..Default::default()
        })
        .unwrap()
    }

    fn chain() -> DiagramGraph {
        graph(vec![
            StateDefinition::new("A", StateKind::Noop).with_transition("B"),
            StateDefinition::new("B", StateKind::Noop),
        ])
    }

    fn pos(graph: &DiagramGraph, id: &str) -> Position {
        graph.node(id).unwrap().position
    }

    #[test]
    fn test_chain_left_to_right() {
        let mut g = chain();
        LayoutEngine::default().apply(&mut g);

        let xs: Vec<f64> = [START_NODE_ID, "A", "B", END_NODE_ID]
            .iter()
            .map(|id| pos(&g, id).x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");

        // start is 40 wide and its edge hint is 0 wide
        assert_eq!(pos(&g, START_NODE_ID).x, 0.0);
        assert_eq!(pos(&g, "A").x, 90.0);
        // A -> B carries the 60-wide hint
        assert_eq!(pos(&g, "B").x, 90.0 + 80.0 + 50.0 + 60.0);
        // centred on one axis: 40-high start/end sit 5 above 30-high states
        assert_eq!(pos(&g, START_NODE_ID).y, 0.0);
        assert_eq!(pos(&g, "A").y, 5.0);
    }

    #[test]
    fn test_top_bottom() {
        let mut g = chain();
        let engine = LayoutEngine::new(LayoutConfig {
            rank_dir: RankDir::TopBottom,
            ..Default::default()
        });
        engine.apply(&mut g);

        assert!(pos(&g, START_NODE_ID).y < pos(&g, "A").y);
        assert!(pos(&g, "A").y < pos(&g, "B").y);
        assert!(pos(&g, "B").y < pos(&g, END_NODE_ID).y);
    }

    #[test]
    fn test_branches_share_rank_without_overlap() {
        let mut g = graph(vec![
            StateDefinition::new("s", StateKind::Switch)
                .with_condition("x")
                .with_default_transition("y"),
            StateDefinition::new("x", StateKind::Noop),
            StateDefinition::new("y", StateKind::Noop),
        ]);
        LayoutEngine::default().apply(&mut g);

        let (x, y) = (pos(&g, "x"), pos(&g, "y"));
        assert_eq!(x.x, y.x);
        assert!((x.y - y.y).abs() >= 30.0 + 50.0);
    }

    #[test]
    fn test_deterministic_without_jitter() {
        let mut a = chain();
        let mut b = chain();
        LayoutEngine::default().apply(&mut a);
        LayoutEngine::default().apply(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_jitter_is_sub_pixel() {
        let mut plain = chain();
        let mut jittered = chain();
        LayoutEngine::default().apply(&mut plain);
        LayoutEngine::new(LayoutConfig {
            jitter: true,
            ..Default::default()
        })
        .apply(&mut jittered);

        for (p, j) in plain.nodes.iter().zip(&jittered.nodes) {
            let dx = j.position.x - p.position.x;
            assert!((0.0..JITTER).contains(&dx), "dx = {dx}");
            assert_eq!(j.position.y, p.position.y);
        }
    }

    #[test]
    fn test_cycle_and_dangling_edges() {
        let mut g = graph(vec![
            StateDefinition::new("a", StateKind::Noop).with_transition("b"),
            StateDefinition::new("b", StateKind::Noop)
                .with_transition("a")
                .with_catch("ghost"),
        ]);
        g.edges.push(GraphEdge::new("a", "a", EdgeKind::Event));
        LayoutEngine::default().apply(&mut g);

        for node in &g.nodes {
            assert!(node.position.x.is_finite() && node.position.y.is_finite());
            assert!(node.position.x >= 0.0 && node.position.y >= 0.0);
        }
        assert_ne!(pos(&g, "a").x, pos(&g, "b").x);
    }

    #[test]
    fn test_empty_graph() {
        let mut g = DiagramGraph::default();
        LayoutEngine::default().apply(&mut g);
        assert!(g.nodes.is_empty());
    }
}
