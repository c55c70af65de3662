use std::collections::HashSet;

use crate::types::{Edge, Graph, Node};

/// Accumulates nodes and edges for one strategy pass.
///
/// Node ids are unique (first wins) and an edge is only accepted when both
/// endpoints are already present, so a finished graph never holds a dangling
/// edge.
#[derive(Default)]
pub(crate) struct GraphBuilder {
    graph: Graph,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub(crate) fn add_node(&mut self, node: Node) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            log::debug!("Skipping duplicate node {}", node.id);
            return false;
        }
        self.graph.nodes.push(node);
        true
    }

    pub(crate) fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if source == target || !self.contains(source) || !self.contains(target) {
            log::debug!("Skipping edge {source}->{target}: endpoint missing");
            return false;
        }
        let edge = Edge::new(source, target);
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.graph.edges.push(edge);
        true
    }

    pub(crate) fn finish(self, strategy: &str) -> Graph {
        log::info!(
            "Composed {} graph: {} nodes, {} edges",
            strategy,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.graph
    }
}
