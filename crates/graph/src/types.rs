use orgview_model::Collection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// What a node stands for on the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Organization,
    Geographical,
    Location,
    Business,
    Structure,
    Employee,
}

/// Back-reference to the record a node was derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub collection: Collection,
    pub id: String,
}

impl SourceRef {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

/// Roll-up figures carried by every node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePayload {
    pub headcount: usize,
    pub budget: f64,
    pub max_capacity: u64,
    pub capacity_percent: u32,
    pub is_active: bool,
    pub source: Option<SourceRef>,
}

impl Default for AggregatePayload {
    fn default() -> Self {
        Self {
            headcount: 0,
            budget: 0.0,
            max_capacity: 0,
            capacity_percent: 0,
            is_active: true,
            source: None,
        }
    }
}

/// Foreign keys of the entity a node represents, or of every entity it
/// aggregates. Field filters match against these sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRefs {
    pub location_ids: BTreeSet<String>,
    pub business_unit_ids: BTreeSet<String>,
    pub geo_unit_ids: BTreeSet<String>,
}

impl NodeRefs {
    pub fn merge(&mut self, other: &NodeRefs) {
        self.location_ids.extend(other.location_ids.iter().cloned());
        self.business_unit_ids
            .extend(other.business_unit_ids.iter().cloned());
        self.geo_unit_ids.extend(other.geo_unit_ids.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.location_ids.is_empty()
            && self.business_unit_ids.is_empty()
            && self.geo_unit_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,

    /// Entity description, or job title for employee leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    #[serde(rename = "aggregatePayload")]
    pub payload: AggregatePayload,

    #[serde(default, skip_serializing_if = "NodeRefs::is_empty")]
    pub refs: NodeRefs,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: None,
            x: 0.0,
            y: 0.0,
            payload: AggregatePayload::default(),
            refs: NodeRefs::default(),
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    pub fn with_payload(mut self, payload: AggregatePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_refs(mut self, refs: NodeRefs) -> Self {
        self.refs = refs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: format!("{source_id}->{target_id}"),
            source_id,
            target_id,
        }
    }
}

/// Plain node/edge lists handed to the rendering surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the direct children of `id`, in edge order
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.source_id == id)
            .map(|edge| edge.target_id.as_str())
            .collect()
    }

    /// Nodes without any inbound edge
    pub fn orphans(&self) -> Vec<&Node> {
        let targets = self
            .edges
            .iter()
            .map(|edge| edge.target_id.as_str())
            .collect::<BTreeSet<_>>();
        self.nodes
            .iter()
            .filter(|node| !targets.contains(node.id.as_str()))
            .collect()
    }

    /// Node id -> position in `nodes`
    pub(crate) fn positions(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect()
    }
}

/// Namespaced node ids
pub mod node_id {
    pub const ORGANIZATION: &str = "organization";
    pub const VIRTUAL_ROOT: &str = "virtual-root";

    pub fn geo(id: &str) -> String {
        format!("geo:{id}")
    }

    pub fn location(id: &str) -> String {
        format!("location:{id}")
    }

    pub fn business(id: &str) -> String {
        format!("business:{id}")
    }

    pub fn unit(id: &str) -> String {
        format!("unit:{id}")
    }

    pub fn group(label: &str) -> String {
        format!("group:{label}")
    }

    pub fn assignment(id: &str) -> String {
        format!("assignment:{id}")
    }
}
