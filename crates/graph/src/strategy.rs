//! The five view strategies.
//!
//! Every strategy reads the same snapshot through the same [`LookupIndex`]
//! and [`Aggregator`], and emits siblings in the input order of their source
//! collection. Dangling references never fail a pass: they degrade to orphan
//! nodes or to the "Unassigned" bucket.

use orgview_model::{
    Assignment, BusinessUnit, Collection, GeographicalUnit, Location, OrgUnit, Snapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{capacity_percent, Aggregate, Aggregator};
use crate::builder::GraphBuilder;
use crate::config::LabelConfig;
use crate::filter::FilterState;
use crate::grouping::{
    assignment_refs, distinct_units, employee_groups, merged_unit_refs, unit_matches, unit_refs,
    units_by_business_unit, units_by_location, EmployeeGroup,
};
use crate::lookup::LookupIndex;
use crate::tree::{OrgTree, TreeRoot};
use crate::types::{node_id, AggregatePayload, Graph, Node, NodeKind, NodeRefs, SourceRef};

/// Which graph to derive from a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStrategy {
    /// organization -> geo unit -> location -> business unit -> org unit
    #[default]
    General,

    /// organization -> geo unit -> location
    Geographical,

    /// organization -> business unit
    Business,

    /// The `parentId` tree itself
    Organizational,

    /// Assignments grouped by org unit name
    Employees,
}

impl ViewStrategy {
    pub const ALL: [ViewStrategy; 5] = [
        ViewStrategy::General,
        ViewStrategy::Geographical,
        ViewStrategy::Business,
        ViewStrategy::Organizational,
        ViewStrategy::Employees,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Geographical => "geographical",
            Self::Business => "business",
            Self::Organizational => "organizational",
            Self::Employees => "employees",
        }
    }

    pub fn resolve(self, ctx: &StrategyContext<'_, '_>) -> Graph {
        let builder = match self {
            Self::General => general(ctx),
            Self::Geographical => geographical(ctx),
            Self::Business => business(ctx),
            Self::Organizational => organizational(ctx),
            Self::Employees => employees(ctx),
        };
        builder.finish(self.as_str())
    }
}

impl fmt::Display for ViewStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| format!("unknown view strategy: {s}"))
    }
}

/// Shared read-only inputs of a strategy pass.
///
/// Group nodes aggregate only the members passing `filters`, so their
/// figures equal the table headers of the same filtered view.
pub struct StrategyContext<'c, 'a> {
    pub snapshot: &'a Snapshot,
    pub lookup: &'c LookupIndex<'a>,
    pub aggregator: &'c Aggregator<'a>,
    pub labels: &'c LabelConfig,
    pub filters: &'c FilterState,
}

impl<'c, 'a> StrategyContext<'c, 'a> {
    fn member_aggregate<'u, I>(&self, units: I) -> Aggregate
    where
        I: IntoIterator<Item = &'u OrgUnit>,
    {
        self.aggregator.aggregate(
            units
                .into_iter()
                .filter(|unit| unit_matches(unit, self.filters, self.lookup)),
        )
    }

    fn payload(
        &self,
        aggregate: Aggregate,
        is_active: bool,
        source: Option<SourceRef>,
    ) -> AggregatePayload {
        AggregatePayload {
            headcount: aggregate.headcount,
            budget: aggregate.total_budget,
            max_capacity: aggregate.total_max_capacity,
            capacity_percent: aggregate.capacity_percent(),
            is_active,
            source,
        }
    }

    fn root_node(&self) -> Node {
        let units = &self.snapshot.org_units;
        let aggregate = self.member_aggregate(distinct_units(units));
        Node::new(node_id::ORGANIZATION, NodeKind::Organization, &self.labels.root)
            .with_payload(self.payload(aggregate, true, None))
            .with_refs(merged_unit_refs(units, self.lookup))
    }

    fn geo_node(
        &self,
        geo: &GeographicalUnit,
        locations: &[&Location],
        units: &[&OrgUnit],
    ) -> Node {
        let aggregate = self.member_aggregate(units.iter().copied());
        let mut refs = merged_unit_refs(units.iter().copied(), self.lookup);
        refs.geo_unit_ids.insert(geo.id.clone());
        refs.location_ids
            .extend(locations.iter().map(|location| location.id.clone()));

        Node::new(
            node_id::geo(&geo.id),
            NodeKind::Geographical,
            self.label(Collection::GeoUnits, &geo.id),
        )
        .with_description(geo.description.as_deref())
        .with_payload(self.payload(
            aggregate,
            geo.is_active,
            Some(SourceRef::new(Collection::GeoUnits, &geo.id)),
        ))
        .with_refs(refs)
    }

    fn location_node(&self, location: &Location, units: &[&OrgUnit]) -> Node {
        let aggregate = self.member_aggregate(units.iter().copied());
        let mut refs = merged_unit_refs(units.iter().copied(), self.lookup);
        refs.location_ids.insert(location.id.clone());
        if let Some(geo) = &location.geo_unit_id {
            refs.geo_unit_ids.insert(geo.as_str().to_string());
        }

        let place = location.place();
        Node::new(
            node_id::location(&location.id),
            NodeKind::Location,
            self.label(Collection::Locations, &location.id),
        )
        .with_description((!place.is_empty()).then_some(place.as_str()))
        .with_payload(self.payload(
            aggregate,
            location.is_active,
            Some(SourceRef::new(Collection::Locations, &location.id)),
        ))
        .with_refs(refs)
    }

    fn business_node(&self, business_unit: &BusinessUnit, units: &[&OrgUnit]) -> Node {
        let aggregate = self.member_aggregate(units.iter().copied());
        let mut refs = merged_unit_refs(units.iter().copied(), self.lookup);
        refs.business_unit_ids.insert(business_unit.id.clone());

        Node::new(
            node_id::business(&business_unit.id),
            NodeKind::Business,
            self.label(Collection::BusinessUnits, &business_unit.id),
        )
        .with_description(business_unit.description.as_deref())
        .with_payload(self.payload(
            aggregate,
            business_unit.is_active,
            Some(SourceRef::new(Collection::BusinessUnits, &business_unit.id)),
        ))
        .with_refs(refs)
    }

    fn structure_node(&self, unit: &OrgUnit) -> Node {
        let headcount = self.aggregator.unit_headcount(&unit.id);
        Node::new(
            node_id::unit(&unit.id),
            NodeKind::Structure,
            self.label(Collection::OrgUnits, &unit.id),
        )
        .with_description(unit.description.as_deref())
        .with_payload(AggregatePayload {
            headcount,
            budget: self.aggregator.aggregate([unit]).total_budget,
            max_capacity: u64::from(unit.max_employees),
            capacity_percent: capacity_percent(headcount, u64::from(unit.max_employees)),
            is_active: unit.is_active,
            source: Some(SourceRef::new(Collection::OrgUnits, &unit.id)),
        })
        .with_refs(unit_refs(unit, self.lookup))
    }

    fn group_node(&self, group: &EmployeeGroup<'_>) -> Node {
        let first_unit = group.units.first();
        let mut refs = NodeRefs::default();
        for assignment in &group.assignments {
            refs.merge(&assignment_refs(assignment, self.lookup));
        }
        Node::new(node_id::group(&group.label), NodeKind::Structure, &group.label)
            .with_description(first_unit.and_then(|unit| unit.description.as_deref()))
            .with_payload(self.payload(
                group
                    .matching(self.filters, self.lookup)
                    .aggregate(self.aggregator),
                first_unit.map_or(true, |unit| unit.is_active),
                first_unit.map(|unit| SourceRef::new(Collection::OrgUnits, &unit.id)),
            ))
            .with_refs(refs)
    }

    fn employee_node(&self, assignment: &Assignment) -> Node {
        Node::new(
            node_id::assignment(&assignment.id),
            NodeKind::Employee,
            assignment.display_name(),
        )
        .with_description(
            (!assignment.job_title.is_empty()).then_some(assignment.job_title.as_str()),
        )
        .with_payload(AggregatePayload {
            headcount: 1,
            is_active: assignment.is_active,
            source: Some(SourceRef::new(Collection::Assignments, &assignment.id)),
            ..AggregatePayload::default()
        })
        .with_refs(assignment_refs(assignment, self.lookup))
    }

    fn label(&self, collection: Collection, id: &str) -> String {
        self.lookup.resolve_name(collection, Some(id))
    }

    fn locations_by_geo(&self) -> HashMap<&'a str, Vec<&'a Location>> {
        let mut map: HashMap<&'a str, Vec<&'a Location>> = HashMap::new();
        for location in &self.snapshot.locations {
            if let Some(geo) = &location.geo_unit_id {
                map.entry(geo.as_str()).or_default().push(location);
            }
        }
        map
    }
}

/// Emit root -> geo unit -> location, returning the builder for further tiers
fn geo_tiers(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    let snapshot = ctx.snapshot;
    let units_by_location = units_by_location(&snapshot.org_units);
    let locations_by_geo = ctx.locations_by_geo();

    let mut builder = GraphBuilder::new();
    builder.add_node(ctx.root_node());

    for geo in &snapshot.geo_units {
        let locations = locations_by_geo
            .get(geo.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let units = locations
            .iter()
            .flat_map(|location| {
                units_by_location
                    .get(location.id.as_str())
                    .into_iter()
                    .flatten()
                    .copied()
            })
            .collect::<Vec<_>>();
        let node = ctx.geo_node(geo, locations, &units);
        let id = node.id.clone();
        builder.add_node(node);
        builder.add_edge(node_id::ORGANIZATION, &id);
    }

    for location in &snapshot.locations {
        let units = units_by_location
            .get(location.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        builder.add_node(ctx.location_node(location, units));

        match ctx.lookup.geo_unit_ref(location.geo_unit_id.as_ref()) {
            Some(geo) => {
                builder.add_edge(&node_id::geo(&geo.id), &node_id::location(&location.id));
            }
            None => log::debug!("Location {} has no geo unit; left unattached", location.id),
        }
    }

    builder
}

fn general(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    let snapshot = ctx.snapshot;
    let lookup = ctx.lookup;
    let mut builder = geo_tiers(ctx);
    let units_by_business = units_by_business_unit(&snapshot.org_units);

    for business_unit in &snapshot.business_units {
        let units = units_by_business
            .get(business_unit.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let business_id = node_id::business(&business_unit.id);
        if !builder.add_node(ctx.business_node(business_unit, units)) {
            continue;
        }

        // location -> business unit exists only where some unit carries both keys
        for unit in units {
            if let Some(location) = lookup.location_ref(unit.location_id.as_ref()) {
                builder.add_edge(&node_id::location(&location.id), &business_id);
            }
        }
    }

    for unit in &snapshot.org_units {
        let unit_id = node_id::unit(&unit.id);
        builder.add_node(ctx.structure_node(unit));

        if let Some(business_unit) = lookup.business_unit_ref(unit.business_unit_id.as_ref()) {
            builder.add_edge(&node_id::business(&business_unit.id), &unit_id);
        } else if let Some(location) = lookup.location_ref(unit.location_id.as_ref()) {
            builder.add_edge(&node_id::location(&location.id), &unit_id);
        } else {
            log::debug!("Org unit {} has no resolvable business unit or location", unit.id);
        }
    }

    builder
}

fn geographical(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    geo_tiers(ctx)
}

fn business(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    let snapshot = ctx.snapshot;
    let units_by_business = units_by_business_unit(&snapshot.org_units);

    let mut builder = GraphBuilder::new();
    builder.add_node(ctx.root_node());

    for business_unit in &snapshot.business_units {
        let units = units_by_business
            .get(business_unit.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        builder.add_node(ctx.business_node(business_unit, units));
        builder.add_edge(node_id::ORGANIZATION, &node_id::business(&business_unit.id));
    }

    builder
}

fn organizational(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    let units = &ctx.snapshot.org_units;
    let tree = OrgTree::build(units, ctx.lookup);
    let mut builder = GraphBuilder::new();

    let root_id = match tree.root() {
        TreeRoot::Unit(idx) => node_id::unit(&units[idx].id),
        TreeRoot::Virtual => {
            let aggregate = ctx.member_aggregate(distinct_units(units));
            builder.add_node(
                Node::new(node_id::VIRTUAL_ROOT, NodeKind::Organization, &ctx.labels.virtual_root)
                    .with_payload(ctx.payload(aggregate, true, None))
                    .with_refs(merged_unit_refs(units, ctx.lookup)),
            );
            node_id::VIRTUAL_ROOT.to_string()
        }
    };

    for unit in units {
        builder.add_node(ctx.structure_node(unit));
    }

    for (idx, unit) in units.iter().enumerate() {
        if tree.is_root(idx) {
            continue;
        }
        // without a level-1 unit every unit hangs off the virtual root
        let parent_id = match (tree.root(), tree.parent(idx)) {
            (TreeRoot::Unit(_), Some(parent)) => node_id::unit(&units[parent].id),
            _ => root_id.clone(),
        };
        builder.add_edge(&parent_id, &node_id::unit(&unit.id));
    }

    builder
}

fn employees(ctx: &StrategyContext<'_, '_>) -> GraphBuilder {
    let mut builder = GraphBuilder::new();

    for group in employee_groups(&ctx.snapshot.assignments, ctx.lookup) {
        let group_id = node_id::group(&group.label);
        builder.add_node(ctx.group_node(&group));

        for assignment in &group.assignments {
            let leaf = ctx.employee_node(assignment);
            let leaf_id = leaf.id.clone();
            builder.add_node(leaf);
            builder.add_edge(&group_id, &leaf_id);
        }
    }

    builder
}
