use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{Graph, NodeRefs};

/// Caller-owned search and field filter state.
///
/// Blank values are ignored; all active filters must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_term: Option<String>,
    pub location_id: Option<String>,
    pub business_unit_id: Option<String>,
    pub geo_unit_id: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn location(mut self, id: impl Into<String>) -> Self {
        self.location_id = Some(id.into());
        self
    }

    pub fn business_unit(mut self, id: impl Into<String>) -> Self {
        self.business_unit_id = Some(id.into());
        self
    }

    pub fn geo_unit(mut self, id: impl Into<String>) -> Self {
        self.geo_unit_id = Some(id.into());
        self
    }

    /// True when no filter would remove anything
    pub fn is_empty(&self) -> bool {
        active(&self.search_term).is_none()
            && active(&self.location_id).is_none()
            && active(&self.business_unit_id).is_none()
            && active(&self.geo_unit_id).is_none()
    }

    /// Case-insensitive substring match against label or description
    pub fn matches_text(&self, label: &str, description: Option<&str>) -> bool {
        let Some(term) = active(&self.search_term) else {
            return true;
        };
        let term = term.to_lowercase();
        label.to_lowercase().contains(&term)
            || description.is_some_and(|text| text.to_lowercase().contains(&term))
    }

    pub fn matches_refs(&self, refs: &NodeRefs) -> bool {
        let checks = [
            (active(&self.location_id), &refs.location_ids),
            (active(&self.business_unit_id), &refs.business_unit_ids),
            (active(&self.geo_unit_id), &refs.geo_unit_ids),
        ];
        checks
            .into_iter()
            .all(|(wanted, ids)| wanted.map_or(true, |id| ids.contains(id)))
    }
}

/// Keep the nodes matching `filters`, then drop every edge that lost an endpoint
pub fn filter_graph(graph: Graph, filters: &FilterState) -> Graph {
    if filters.is_empty() {
        return graph;
    }

    let before = graph.node_count();
    let nodes = graph
        .nodes
        .into_iter()
        .filter(|node| {
            filters.matches_text(&node.label, node.description.as_deref())
                && filters.matches_refs(&node.refs)
        })
        .collect::<Vec<_>>();

    let kept = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();
    let edges = graph
        .edges
        .into_iter()
        .filter(|edge| {
            kept.contains(edge.source_id.as_str()) && kept.contains(edge.target_id.as_str())
        })
        .collect::<Vec<_>>();

    log::debug!("Filter kept {} of {} nodes", nodes.len(), before);
    Graph { nodes, edges }
}
