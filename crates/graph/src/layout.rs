//! Deterministic grid layout: depth bands top to bottom, siblings centered
//! on x = 0 inside each band.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, VecDeque};

use crate::config::LayoutConfig;
use crate::types::Graph;

/// `x` of sibling `index` out of `count`, centered on zero
pub fn sibling_x(index: usize, count: usize, spacing: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    -((count - 1) as f64 * spacing) / 2.0 + index as f64 * spacing
}

/// Breadth-first depth of every node, measured from the nodes without an
/// inbound edge. Nodes reachable only through a cycle start a new band at 0.
pub fn node_depths(graph: &Graph) -> Vec<usize> {
    let positions = graph.positions();
    let mut index: DiGraph<usize, ()> =
        DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let nodes = (0..graph.node_count())
        .map(|idx| index.add_node(idx))
        .collect::<Vec<NodeIndex>>();

    for edge in &graph.edges {
        if let (Some(&source), Some(&target)) = (
            positions.get(edge.source_id.as_str()),
            positions.get(edge.target_id.as_str()),
        ) {
            index.add_edge(nodes[source], nodes[target], ());
        }
    }

    let mut depths = vec![0usize; graph.node_count()];
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::new();

    let sources = nodes
        .iter()
        .filter(|&&node| {
            index
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none()
        })
        .map(|&node| index[node])
        .collect::<Vec<_>>();
    let leftovers = 0..graph.node_count();

    for start in sources.into_iter().chain(leftovers) {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        depths[start] = 0;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for next in index.neighbors_directed(nodes[current], Direction::Outgoing) {
                let next = index[next];
                if !visited[next] {
                    visited[next] = true;
                    depths[next] = depths[current] + 1;
                    queue.push_back(next);
                }
            }
        }
    }

    depths
}

/// Stamp `x`/`y` on every node
pub fn assign_layout(graph: &mut Graph, config: &LayoutConfig) {
    let depths = node_depths(graph);

    let mut bands: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &depth) in depths.iter().enumerate() {
        bands.entry(depth).or_default().push(idx);
    }

    for (depth, members) in bands {
        let count = members.len();
        for (position, idx) in members.into_iter().enumerate() {
            let node = &mut graph.nodes[idx];
            node.x = sibling_x(position, count, config.spacing);
            node.y = depth as f64 * config.row_height;
        }
    }
}
