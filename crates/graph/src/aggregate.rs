use orgview_model::{Assignment, OrgUnit, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Roll-up over a set of org units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    /// Assignments pointing at any unit of the set
    pub headcount: usize,
    pub total_budget: f64,
    pub total_max_capacity: u64,
}

impl Aggregate {
    pub fn capacity_percent(&self) -> u32 {
        capacity_percent(self.headcount, self.total_max_capacity)
    }
}

/// `round(headcount / max * 100)`, zero when `max` is zero
pub fn capacity_percent(headcount: usize, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }
    let ratio = headcount as f64 / max as f64 * 100.0;
    ratio.round().min(u32::MAX as f64) as u32
}

fn budget_of(unit: &OrgUnit) -> f64 {
    if unit.budget.is_finite() {
        unit.budget.max(0.0)
    } else {
        0.0
    }
}

/// Headcount per org unit, counted from assignments rather than the
/// denormalized `currentEmployees` field
pub struct Aggregator<'a> {
    headcount_by_unit: HashMap<&'a str, usize>,
}

impl<'a> Aggregator<'a> {
    pub fn new(assignments: &'a [Assignment]) -> Self {
        let mut headcount_by_unit: HashMap<&'a str, usize> = HashMap::new();
        for assignment in assignments {
            if let Some(unit_id) = &assignment.org_unit_id {
                *headcount_by_unit.entry(unit_id.as_str()).or_default() += 1;
            }
        }
        Self { headcount_by_unit }
    }

    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        Self::new(&snapshot.assignments)
    }

    pub fn unit_headcount(&self, unit_id: &str) -> usize {
        self.headcount_by_unit.get(unit_id).copied().unwrap_or(0)
    }

    pub fn unit_capacity_percent(&self, unit: &OrgUnit) -> u32 {
        capacity_percent(self.unit_headcount(&unit.id), u64::from(unit.max_employees))
    }

    /// Aggregate over `units`. Only the first unit carrying a given id counts,
    /// as in [`LookupIndex`](crate::LookupIndex).
    pub fn aggregate<'u, I>(&self, units: I) -> Aggregate
    where
        I: IntoIterator<Item = &'u OrgUnit>,
    {
        let mut seen = HashSet::new();
        let mut total = Aggregate::default();
        for unit in units {
            if !seen.insert(unit.id.as_str()) {
                continue;
            }
            total.headcount += self.unit_headcount(&unit.id);
            total.total_budget += budget_of(unit);
            total.total_max_capacity += u64::from(unit.max_employees);
        }
        total
    }
}

/// One-shot aggregation without keeping an [`Aggregator`] around
pub fn aggregate(units: &[OrgUnit], assignments: &[Assignment]) -> Aggregate {
    Aggregator::new(assignments).aggregate(units)
}
