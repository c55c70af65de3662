//! Membership rules shared by the graph strategies and the table projector,
//! so both projections bucket records the same way.

use orgview_model::{Assignment, Collection, EntityRef, OrgUnit};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::aggregate::{Aggregate, Aggregator};
use crate::filter::FilterState;
use crate::lookup::LookupIndex;
use crate::types::NodeRefs;

fn insert(set: &mut BTreeSet<String>, reference: Option<&EntityRef>) {
    if let Some(reference) = reference {
        set.insert(reference.as_str().to_string());
    }
}

pub(crate) fn unit_refs(unit: &OrgUnit, lookup: &LookupIndex<'_>) -> NodeRefs {
    let mut refs = NodeRefs::default();
    insert(&mut refs.location_ids, unit.location_id.as_ref());
    insert(&mut refs.business_unit_ids, unit.business_unit_id.as_ref());
    insert(&mut refs.geo_unit_ids, lookup.unit_geo_ref(unit));
    refs
}

/// Assignment keys win; missing ones are inherited from the assigned unit
pub(crate) fn assignment_refs(assignment: &Assignment, lookup: &LookupIndex<'_>) -> NodeRefs {
    let unit = lookup.org_unit_ref(assignment.org_unit_id.as_ref());
    let location = assignment
        .location_id
        .as_ref()
        .or_else(|| unit.and_then(|u| u.location_id.as_ref()));
    let business_unit = assignment
        .business_unit_id
        .as_ref()
        .or_else(|| unit.and_then(|u| u.business_unit_id.as_ref()));
    let geo_unit = assignment
        .geo_unit_id
        .as_ref()
        .or_else(|| {
            lookup
                .location_ref(location)
                .and_then(|l| l.geo_unit_id.as_ref())
        })
        .or_else(|| unit.and_then(|u| lookup.unit_geo_ref(u)));

    let mut refs = NodeRefs::default();
    insert(&mut refs.location_ids, location);
    insert(&mut refs.business_unit_ids, business_unit);
    insert(&mut refs.geo_unit_ids, geo_unit);
    refs
}

pub(crate) fn merged_unit_refs<'u, I>(units: I, lookup: &LookupIndex<'_>) -> NodeRefs
where
    I: IntoIterator<Item = &'u OrgUnit>,
{
    let mut refs = NodeRefs::default();
    for unit in units {
        refs.merge(&unit_refs(unit, lookup));
    }
    refs
}

/// Whether a unit survives `filters`: its display label or description
/// matches the search term and its keys match every field filter
pub(crate) fn unit_matches(
    unit: &OrgUnit,
    filters: &FilterState,
    lookup: &LookupIndex<'_>,
) -> bool {
    if filters.is_empty() {
        return true;
    }
    let label = lookup.resolve_name(Collection::OrgUnits, Some(unit.id.as_str()));
    filters.matches_text(&label, unit.description.as_deref())
        && filters.matches_refs(&unit_refs(unit, lookup))
}

pub(crate) fn assignment_matches(
    assignment: &Assignment,
    filters: &FilterState,
    lookup: &LookupIndex<'_>,
) -> bool {
    if filters.is_empty() {
        return true;
    }
    let title = (!assignment.job_title.is_empty()).then_some(assignment.job_title.as_str());
    filters.matches_text(assignment.display_name(), title)
        && filters.matches_refs(&assignment_refs(assignment, lookup))
}

/// Units in input order, skipping any unit whose id was already seen
pub(crate) fn distinct_units(units: &[OrgUnit]) -> impl Iterator<Item = &OrgUnit> {
    let mut seen = HashSet::new();
    units.iter().filter(move |&unit| seen.insert(unit.id.as_str()))
}

/// Distinct units per raw `locationId`, in input order
pub(crate) fn units_by_location(units: &[OrgUnit]) -> HashMap<&str, Vec<&OrgUnit>> {
    let mut map: HashMap<&str, Vec<&OrgUnit>> = HashMap::new();
    for unit in distinct_units(units) {
        if let Some(location) = &unit.location_id {
            map.entry(location.as_str()).or_default().push(unit);
        }
    }
    map
}

/// Distinct units per raw `businessUnitId`, in input order
pub(crate) fn units_by_business_unit(units: &[OrgUnit]) -> HashMap<&str, Vec<&OrgUnit>> {
    let mut map: HashMap<&str, Vec<&OrgUnit>> = HashMap::new();
    for unit in distinct_units(units) {
        if let Some(business_unit) = &unit.business_unit_id {
            map.entry(business_unit.as_str()).or_default().push(unit);
        }
    }
    map
}

/// Assignments sharing the name of their org unit
pub struct EmployeeGroup<'a> {
    pub label: String,
    /// Distinct resolved units behind the group, in first-seen order
    pub units: Vec<&'a OrgUnit>,
    pub assignments: Vec<&'a Assignment>,
}

impl<'a> EmployeeGroup<'a> {
    fn new(label: String) -> Self {
        Self {
            label,
            units: Vec::new(),
            assignments: Vec::new(),
        }
    }

    fn push(&mut self, assignment: &'a Assignment, unit: Option<&'a OrgUnit>) {
        if let Some(unit) = unit {
            if !self.units.iter().any(|known| known.id == unit.id) {
                self.units.push(unit);
            }
        }
        self.assignments.push(assignment);
    }

    /// Headcount is the member count; budget and capacity come from the units
    pub fn aggregate(&self, aggregator: &Aggregator<'_>) -> Aggregate {
        Aggregate {
            headcount: self.assignments.len(),
            ..aggregator.aggregate(self.units.iter().copied())
        }
    }

    /// The same group narrowed to the assignments passing `filters`
    pub fn matching(&self, filters: &FilterState, lookup: &LookupIndex<'_>) -> EmployeeGroup<'a> {
        let mut narrowed = EmployeeGroup::new(self.label.clone());
        for &assignment in &self.assignments {
            if !assignment_matches(assignment, filters, lookup) {
                continue;
            }
            let unit = assignment.org_unit_id.as_ref().and_then(|id| {
                self.units
                    .iter()
                    .copied()
                    .find(|unit| unit.id == id.as_str())
            });
            narrowed.push(assignment, unit);
        }
        narrowed
    }
}

/// Group assignments by org unit name; unresolvable units share the
/// "Unassigned" bucket. Groups keep first-appearance order.
pub fn employee_groups<'a, I>(assignments: I, lookup: &LookupIndex<'a>) -> Vec<EmployeeGroup<'a>>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut groups: Vec<EmployeeGroup<'a>> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for assignment in assignments {
        let label = lookup
            .resolve_ref(Collection::OrgUnits, assignment.org_unit_id.as_ref())
            .bucket()
            .to_string();
        let unit = lookup.org_unit_ref(assignment.org_unit_id.as_ref());

        let idx = *by_label.entry(label.clone()).or_insert_with(|| {
            groups.push(EmployeeGroup::new(label));
            groups.len() - 1
        });
        groups[idx].push(assignment, unit);
    }

    groups
}
