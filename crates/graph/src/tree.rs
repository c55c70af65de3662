//! Arena view of the org unit `parentId` tree.
//!
//! Nodes live in a petgraph arena indexed like `Snapshot::org_units`; parent
//! links are edges. Traversal is guarded by a visited set, so cycles and
//! dangling parents are cut rather than followed.

use orgview_model::OrgUnit;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::VecDeque;

use crate::lookup::LookupIndex;

/// Where the tree hangs from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRoot {
    /// First unit with `level == 1`
    Unit(usize),
    /// No level-1 unit exists
    Virtual,
}

pub struct OrgTree {
    root: TreeRoot,
    /// Tree parent per unit; `None` means attached to the root (or is the root)
    parents: Vec<Option<usize>>,
}

impl OrgTree {
    pub fn build(units: &[OrgUnit], lookup: &LookupIndex<'_>) -> Self {
        let root = units
            .iter()
            .position(OrgUnit::is_root)
            .map_or(TreeRoot::Virtual, TreeRoot::Unit);
        let root_idx = match root {
            TreeRoot::Unit(idx) => Some(idx),
            TreeRoot::Virtual => None,
        };

        let mut arena: DiGraph<usize, ()> = DiGraph::with_capacity(units.len(), units.len());
        let nodes = (0..units.len())
            .map(|idx| arena.add_node(idx))
            .collect::<Vec<NodeIndex>>();

        let mut declared = vec![false; units.len()];
        for (idx, unit) in units.iter().enumerate() {
            if Some(idx) == root_idx {
                continue;
            }
            let Some(parent_ref) = &unit.parent_id else {
                continue;
            };
            match lookup.org_unit_position(parent_ref.as_str()) {
                Some(parent) if parent != idx => {
                    arena.add_edge(nodes[parent], nodes[idx], ());
                    declared[idx] = true;
                }
                Some(_) => log::debug!("Org unit {} is its own parent", unit.id),
                None => log::debug!(
                    "Org unit {} has dangling parent {}; attaching to root",
                    unit.id,
                    parent_ref
                ),
            }
        }

        let mut tree = Self {
            root,
            parents: vec![None; units.len()],
        };
        let mut visited = vec![false; units.len()];

        if let Some(idx) = root_idx {
            tree.descend(&arena, &nodes, idx, &mut visited);
        }

        // Units without a usable parent hang from the root.
        for idx in 0..units.len() {
            if !visited[idx] && !declared[idx] {
                tree.descend(&arena, &nodes, idx, &mut visited);
            }
        }

        // Whatever is left sits on a parent cycle; cut it at the first unit in input order.
        for idx in 0..units.len() {
            if !visited[idx] {
                log::debug!(
                    "Org unit {} is on a parent cycle; attaching to root",
                    units[idx].id
                );
                tree.descend(&arena, &nodes, idx, &mut visited);
            }
        }

        tree
    }

    fn descend(
        &mut self,
        arena: &DiGraph<usize, ()>,
        nodes: &[NodeIndex],
        start: usize,
        visited: &mut [bool],
    ) {
        let mut queue = VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let mut children = arena
                .neighbors_directed(nodes[current], Direction::Outgoing)
                .map(|child| arena[child])
                .collect::<Vec<_>>();
            children.sort_unstable();

            for child in children {
                if visited[child] {
                    continue;
                }
                visited[child] = true;
                self.parents[child] = Some(current);
                queue.push_back(child);
            }
        }
    }

    pub fn root(&self) -> TreeRoot {
        self.root
    }

    /// Tree parent of a unit. `None` for the root unit and for units
    /// attached directly to the root.
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    pub fn is_root(&self, idx: usize) -> bool {
        self.root == TreeRoot::Unit(idx)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
