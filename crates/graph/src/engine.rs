use orgview_model::Snapshot;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregator;
use crate::config::EngineConfig;
use crate::filter::{filter_graph, FilterState};
use crate::layout::assign_layout;
use crate::lookup::LookupIndex;
use crate::strategy::{StrategyContext, ViewStrategy};
use crate::table::{project_table, Row, TableGrouping};
use crate::types::Graph;

/// Caller-supplied view state for one composition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub strategy: ViewStrategy,
    #[serde(default)]
    pub filters: FilterState,
}

impl ViewRequest {
    pub fn new(strategy: ViewStrategy) -> Self {
        Self {
            strategy,
            filters: FilterState::default(),
        }
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }
}

/// Composition facade over one snapshot.
///
/// The lookup index and aggregator are built once per snapshot and shared
/// by every strategy and by the table projector.
pub struct ViewEngine<'a> {
    snapshot: &'a Snapshot,
    lookup: LookupIndex<'a>,
    aggregator: Aggregator<'a>,
    config: EngineConfig,
}

impl<'a> ViewEngine<'a> {
    pub fn new(snapshot: &'a Snapshot, config: EngineConfig) -> Self {
        Self {
            snapshot,
            lookup: LookupIndex::new(snapshot),
            aggregator: Aggregator::from_snapshot(snapshot),
            config,
        }
    }

    pub fn lookup(&self) -> &LookupIndex<'a> {
        &self.lookup
    }

    pub fn aggregator(&self) -> &Aggregator<'a> {
        &self.aggregator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn context<'s>(&'s self, filters: &'s FilterState) -> StrategyContext<'s, 'a> {
        StrategyContext {
            snapshot: self.snapshot,
            lookup: &self.lookup,
            aggregator: &self.aggregator,
            labels: &self.config.labels,
            filters,
        }
    }

    /// Raw strategy output: no filtering, no coordinates
    pub fn resolve(&self, strategy: ViewStrategy) -> Graph {
        strategy.resolve(&self.context(&FilterState::default()))
    }

    /// strategy -> filter -> layout. Group nodes surviving the filter carry
    /// the aggregates of their surviving members.
    pub fn compose(&self, request: &ViewRequest) -> Graph {
        let graph = request.strategy.resolve(&self.context(&request.filters));
        let mut graph = filter_graph(graph, &request.filters);
        assign_layout(&mut graph, &self.config.layout);
        graph
    }

    pub fn project_table(&self, grouping: TableGrouping, filters: &FilterState) -> Vec<Row> {
        project_table(&self.context(filters), grouping)
    }

    /// Table grouped the way `request.strategy` groups its graph
    pub fn project_for(&self, request: &ViewRequest) -> Vec<Row> {
        self.project_table(TableGrouping::for_strategy(request.strategy), &request.filters)
    }
}
