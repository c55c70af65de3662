//! # Org View Graph
//!
//! Composes hierarchical graphs and grouped tables from a snapshot of the
//! organization collections.
//!
//! ## Architecture
//!
//! ```text
//! Snapshot
//!     │
//!     ├──> Lookup Index (id -> record, name / raw id / sentinel)
//!     ├──> Aggregator (headcount from assignments, budget, capacity)
//!     │
//!     ├──> View Strategy
//!     │      ├─ general:        org -> geo -> location -> business -> unit
//!     │      ├─ geographical:   org -> geo -> location
//!     │      ├─ business:       org -> business
//!     │      ├─ organizational: parentId tree
//!     │      └─ employees:      unit name -> assignment
//!     │
//!     ├──> Filter Pipeline (search + field filters, edge pruning)
//!     ├──> Layout (depth bands, centered siblings)
//!     │
//!     └──> Table Projector (grouped rows, same aggregates as the graph)
//! ```

mod aggregate;
mod builder;
mod config;
mod engine;
mod error;
mod filter;
mod grouping;
mod layout;
mod lookup;
mod strategy;
mod table;
mod tree;
mod types;

pub use aggregate::{aggregate, capacity_percent, Aggregate, Aggregator};
pub use config::{EngineConfig, LabelConfig, LayoutConfig};
pub use engine::{ViewEngine, ViewRequest};
pub use error::{GraphError, Result};
pub use filter::{filter_graph, FilterState};
pub use grouping::{employee_groups, EmployeeGroup};
pub use layout::{assign_layout, node_depths, sibling_x};
pub use lookup::{LookupIndex, Resolution, UNASSIGNED, UNKNOWN};
pub use strategy::{StrategyContext, ViewStrategy};
pub use table::{project_table, visible_rows, ExpansionState, Row, RowKind, TableGrouping};
pub use tree::{OrgTree, TreeRoot};
pub use types::{node_id, AggregatePayload, Edge, Graph, Node, NodeKind, NodeRefs, SourceRef};
