//! Grouped, aggregate-bearing rows for the table presentation.
//!
//! The projector is pure: expansion is caller state passed to
//! [`visible_rows`], never part of the projected rows.

use orgview_model::{Assignment, Collection, EntityRef, OrgUnit};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{capacity_percent, Aggregate};
use crate::grouping::{
    assignment_matches, assignment_refs, distinct_units, employee_groups, unit_matches,
};
use crate::lookup::{Resolution, UNASSIGNED};
use crate::strategy::{StrategyContext, ViewStrategy};
use crate::types::SourceRef;

/// Grouping key of the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableGrouping {
    #[default]
    Location,
    BusinessUnit,
    GeoUnit,
    /// Flat list per `level`
    Level,
    /// Assignments per org unit name
    OrgUnit,
}

impl TableGrouping {
    pub const ALL: [TableGrouping; 5] = [
        TableGrouping::Location,
        TableGrouping::BusinessUnit,
        TableGrouping::GeoUnit,
        TableGrouping::Level,
        TableGrouping::OrgUnit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::BusinessUnit => "business_unit",
            Self::GeoUnit => "geo_unit",
            Self::Level => "level",
            Self::OrgUnit => "org_unit",
        }
    }

    /// Grouping whose headers line up with the strategy's group nodes
    pub fn for_strategy(strategy: ViewStrategy) -> Self {
        match strategy {
            ViewStrategy::General => Self::Location,
            ViewStrategy::Geographical => Self::GeoUnit,
            ViewStrategy::Business => Self::BusinessUnit,
            ViewStrategy::Organizational => Self::Level,
            ViewStrategy::Employees => Self::OrgUnit,
        }
    }
}

impl fmt::Display for TableGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|grouping| grouping.as_str() == wanted)
            .ok_or_else(|| format!("unknown table grouping: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Header,
    Unit,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    pub kind: RowKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_unit: Option<String>,
    pub headcount: usize,
    pub budget: f64,
    pub max_capacity: u64,
    pub capacity_percent: u32,
    pub is_active: bool,
    /// Group roll-up; present on header rows only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expanded_data: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

impl Row {
    fn blank(id: String, kind: RowKind, label: String) -> Self {
        Self {
            id,
            kind,
            label,
            description: None,
            level: None,
            org_unit: None,
            location: None,
            business_unit: None,
            geo_unit: None,
            headcount: 0,
            budget: 0.0,
            max_capacity: 0,
            capacity_percent: 0,
            is_active: true,
            aggregate: None,
            is_primary: false,
            expanded_data: Vec::new(),
            source: None,
        }
    }

    pub fn is_header(&self) -> bool {
        self.kind == RowKind::Header
    }
}

/// Which header rows are expanded. Owned by the caller, keyed by row id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.expanded.contains(row_id)
    }

    pub fn expand(&mut self, row_id: impl Into<String>) {
        self.expanded.insert(row_id.into());
    }

    pub fn collapse(&mut self, row_id: &str) {
        self.expanded.remove(row_id);
    }

    /// Flip one header; returns the new state
    pub fn toggle(&mut self, row_id: &str) -> bool {
        if self.expanded.remove(row_id) {
            false
        } else {
            self.expanded.insert(row_id.to_string());
            true
        }
    }

    pub fn expand_all(&mut self, rows: &[Row]) {
        self.expanded.extend(
            rows.iter()
                .filter(|row| row.is_header())
                .map(|row| row.id.clone()),
        );
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

/// Flatten headers and the members of expanded headers, in display order
pub fn visible_rows<'r>(rows: &'r [Row], state: &ExpansionState) -> Vec<&'r Row> {
    let mut visible = Vec::new();
    for row in rows {
        visible.push(row);
        if state.is_expanded(&row.id) {
            visible.extend(row.expanded_data.iter());
        }
    }
    visible
}

struct UnitGroup<'a> {
    key: Option<String>,
    label: String,
    level: Option<u32>,
    source: Option<SourceRef>,
    is_active: bool,
    units: Vec<&'a OrgUnit>,
}

fn header_id(grouping: TableGrouping, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("header:{}:{key}", grouping.as_str()),
        None => format!("header:{}", grouping.as_str()),
    }
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Group the units (or, for [`TableGrouping::OrgUnit`], the assignments)
/// passing `ctx.filters` into header rows
pub fn project_table(ctx: &StrategyContext<'_, '_>, grouping: TableGrouping) -> Vec<Row> {
    let rows = match grouping {
        TableGrouping::OrgUnit => project_assignments(ctx),
        _ => project_units(ctx, grouping),
    };
    log::debug!("Projected {} {} groups", rows.len(), grouping);
    rows
}

fn project_units(ctx: &StrategyContext<'_, '_>, grouping: TableGrouping) -> Vec<Row> {
    let lookup = ctx.lookup;
    let units = distinct_units(&ctx.snapshot.org_units)
        .filter(|unit| unit_matches(unit, ctx.filters, lookup))
        .collect::<Vec<_>>();

    let mut groups: Vec<UnitGroup<'_>> = Vec::new();
    let mut by_key: HashMap<Option<String>, usize> = HashMap::new();
    let mut primary: Option<usize> = None;

    for unit in units {
        let (resolution, collection) = match grouping {
            TableGrouping::Location => (
                lookup.resolve_ref(Collection::Locations, unit.location_id.as_ref()),
                Some(Collection::Locations),
            ),
            TableGrouping::BusinessUnit => (
                lookup.resolve_ref(Collection::BusinessUnits, unit.business_unit_id.as_ref()),
                Some(Collection::BusinessUnits),
            ),
            TableGrouping::GeoUnit => (
                lookup.resolve_ref(Collection::GeoUnits, lookup.unit_geo_ref(unit)),
                Some(Collection::GeoUnits),
            ),
            TableGrouping::Level | TableGrouping::OrgUnit => (Resolution::Missing, None),
        };

        let key = match collection {
            Some(_) => resolution.raw_id().map(str::to_string),
            None => Some(unit.level.to_string()),
        };

        let idx = match by_key.get(&key) {
            Some(&idx) => idx,
            None => {
                let group = match collection {
                    Some(collection) => UnitGroup {
                        key: key.clone(),
                        label: resolution.display().to_string(),
                        level: None,
                        source: match resolution {
                            Resolution::Found { id, .. } => Some(SourceRef::new(collection, id)),
                            _ => None,
                        },
                        is_active: group_active(ctx, collection, resolution),
                        units: Vec::new(),
                    },
                    None => UnitGroup {
                        key: key.clone(),
                        label: format!("Level {}", unit.level),
                        level: Some(unit.level),
                        source: None,
                        is_active: true,
                        units: Vec::new(),
                    },
                };
                groups.push(group);
                by_key.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        if primary.is_none() && grouping == TableGrouping::Location && unit.is_root() {
            primary = Some(idx);
        }
        groups[idx].units.push(unit);
    }

    let mut rows = groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| unit_header(ctx, grouping, group, primary == Some(idx)))
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| {
        b.is_primary.cmp(&a.is_primary).then_with(|| match grouping {
            TableGrouping::Level => a.level.cmp(&b.level),
            _ => compare_labels(&a.label, &b.label),
        })
    });
    rows
}

fn group_active(
    ctx: &StrategyContext<'_, '_>,
    collection: Collection,
    resolution: Resolution<'_>,
) -> bool {
    let Resolution::Found { id, .. } = resolution else {
        return true;
    };
    let lookup = ctx.lookup;
    match collection {
        Collection::Locations => lookup.location(id).map_or(true, |l| l.is_active),
        Collection::BusinessUnits => lookup.business_unit(id).map_or(true, |b| b.is_active),
        Collection::GeoUnits => lookup.geo_unit(id).map_or(true, |g| g.is_active),
        _ => true,
    }
}

fn unit_header(
    ctx: &StrategyContext<'_, '_>,
    grouping: TableGrouping,
    group: UnitGroup<'_>,
    is_primary: bool,
) -> Row {
    let aggregate = ctx.aggregator.aggregate(group.units.iter().copied());
    let members = group
        .units
        .iter()
        .map(|unit| unit_row(ctx, unit))
        .collect::<Vec<_>>();

    let mut header = Row::blank(
        header_id(grouping, group.key.as_deref()),
        RowKind::Header,
        group.label,
    );
    header.level = group.level;
    header.headcount = aggregate.headcount;
    header.budget = aggregate.total_budget;
    header.max_capacity = aggregate.total_max_capacity;
    header.capacity_percent = aggregate.capacity_percent();
    header.is_active = group.is_active;
    header.aggregate = Some(aggregate);
    header.is_primary = is_primary;
    header.expanded_data = members;
    header.source = group.source;
    header
}

fn display(
    ctx: &StrategyContext<'_, '_>,
    collection: Collection,
    reference: Option<&EntityRef>,
) -> String {
    ctx.lookup.resolve_ref(collection, reference).display().to_string()
}

fn unit_row(ctx: &StrategyContext<'_, '_>, unit: &OrgUnit) -> Row {
    let lookup = ctx.lookup;
    let headcount = ctx.aggregator.unit_headcount(&unit.id);
    let geo_unit = match lookup.location_ref(unit.location_id.as_ref()) {
        Some(location) => display(ctx, Collection::GeoUnits, location.geo_unit_id.as_ref()),
        None => UNASSIGNED.to_string(),
    };

    let mut row = Row::blank(
        format!("unit:{}", unit.id),
        RowKind::Unit,
        lookup.resolve_name(Collection::OrgUnits, Some(unit.id.as_str())),
    );
    row.description = unit.description.clone();
    row.level = Some(unit.level);
    row.location = Some(display(ctx, Collection::Locations, unit.location_id.as_ref()));
    row.business_unit = Some(display(
        ctx,
        Collection::BusinessUnits,
        unit.business_unit_id.as_ref(),
    ));
    row.geo_unit = Some(geo_unit);
    row.headcount = headcount;
    row.budget = ctx.aggregator.aggregate([unit]).total_budget;
    row.max_capacity = u64::from(unit.max_employees);
    row.capacity_percent = capacity_percent(headcount, u64::from(unit.max_employees));
    row.is_active = unit.is_active;
    row.source = Some(SourceRef::new(Collection::OrgUnits, &unit.id));
    row
}

fn project_assignments(ctx: &StrategyContext<'_, '_>) -> Vec<Row> {
    let lookup = ctx.lookup;
    let assignments = ctx
        .snapshot
        .assignments
        .iter()
        .filter(|assignment| assignment_matches(assignment, ctx.filters, lookup));

    let mut rows = employee_groups(assignments, lookup)
        .into_iter()
        .map(|group| {
            let aggregate = group.aggregate(ctx.aggregator);
            let first_unit = group.units.first().copied();

            let mut header = Row::blank(
                header_id(TableGrouping::OrgUnit, Some(group.label.as_str())),
                RowKind::Header,
                group.label.clone(),
            );
            header.headcount = aggregate.headcount;
            header.budget = aggregate.total_budget;
            header.max_capacity = aggregate.total_max_capacity;
            header.capacity_percent = aggregate.capacity_percent();
            header.is_active = first_unit.map_or(true, |unit| unit.is_active);
            header.aggregate = Some(aggregate);
            header.source = first_unit.map(|unit| SourceRef::new(Collection::OrgUnits, &unit.id));
            header.expanded_data = group
                .assignments
                .iter()
                .map(|assignment| assignment_row(ctx, assignment))
                .collect();
            header
        })
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| compare_labels(&a.label, &b.label));
    rows
}

fn assignment_row(ctx: &StrategyContext<'_, '_>, assignment: &Assignment) -> Row {
    let lookup = ctx.lookup;
    let refs = assignment_refs(assignment, lookup);
    let first = |ids: &BTreeSet<String>| {
        ids.iter().next().and_then(|id| EntityRef::new(id.clone()))
    };

    let mut row = Row::blank(
        format!("assignment:{}", assignment.id),
        RowKind::Assignment,
        assignment.display_name().to_string(),
    );
    row.description = (!assignment.job_title.is_empty()).then(|| assignment.job_title.clone());
    row.org_unit = Some(display(ctx, Collection::OrgUnits, assignment.org_unit_id.as_ref()));
    row.location = Some(display(ctx, Collection::Locations, first(&refs.location_ids).as_ref()));
    row.business_unit = Some(display(
        ctx,
        Collection::BusinessUnits,
        first(&refs.business_unit_ids).as_ref(),
    ));
    row.geo_unit = Some(display(ctx, Collection::GeoUnits, first(&refs.geo_unit_ids).as_ref()));
    row.level = lookup
        .org_unit_ref(assignment.org_unit_id.as_ref())
        .map(|unit| unit.level);
    row.headcount = 1;
    row.is_active = assignment.is_active;
    row.source = Some(SourceRef::new(Collection::Assignments, &assignment.id));
    row
}
