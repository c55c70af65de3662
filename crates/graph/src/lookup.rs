//! O(1) id -> record maps over one snapshot, and the single place where a
//! raw reference becomes display text.

use orgview_model::{
    Assignment, BusinessUnit, Collection, EntityRef, GeographicalUnit, Location, OrgUnit, Record,
    Snapshot,
};
use std::collections::HashMap;

/// Shown when a reference is absent
pub const UNASSIGNED: &str = "Unassigned";

/// Shown when a reference points into a collection that was never loaded
pub const UNKNOWN: &str = "Unknown";

/// Outcome of resolving one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Target exists
    Found { id: &'a str, name: &'a str },
    /// Collection has records, none with this id
    Dangling(&'a str),
    /// Collection is empty
    Unloaded(&'a str),
    /// No id given
    Missing,
}

impl<'a> Resolution<'a> {
    /// Raw id when one was given
    pub fn raw_id(&self) -> Option<&'a str> {
        match *self {
            Self::Found { id, .. } | Self::Dangling(id) | Self::Unloaded(id) => Some(id),
            Self::Missing => None,
        }
    }

    /// Display text: name, raw id, or a sentinel
    pub fn display(&self) -> &'a str {
        match *self {
            Self::Found { id, name } => {
                if name.trim().is_empty() {
                    id
                } else {
                    name
                }
            }
            Self::Dangling(id) => id,
            Self::Unloaded(_) => UNKNOWN,
            Self::Missing => UNASSIGNED,
        }
    }

    /// Grouping label: unresolved references all share the sentinel bucket
    pub fn bucket(&self) -> &'a str {
        match self {
            Self::Found { .. } => self.display(),
            _ => UNASSIGNED,
        }
    }
}

struct IdMap<'a, T> {
    records: &'a [T],
    by_id: HashMap<&'a str, usize>,
}

impl<'a, T: Record> IdMap<'a, T> {
    fn build(records: &'a [T]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_id.contains_key(record.id()) {
                log::debug!(
                    "Duplicate id {} in {}; keeping first occurrence",
                    record.id(),
                    T::COLLECTION
                );
                continue;
            }
            by_id.insert(record.id(), idx);
        }
        Self { records, by_id }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    fn get(&self, id: &str) -> Option<&'a T> {
        self.position(id).map(|idx| &self.records[idx])
    }

    fn resolve<'s>(&self, id: Option<&'s str>) -> Resolution<'s>
    where
        'a: 's,
    {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Resolution::Missing;
        };
        match self.get(id) {
            Some(record) => Resolution::Found {
                id: record.id(),
                name: record.name(),
            },
            None if self.records.is_empty() => Resolution::Unloaded(id),
            None => Resolution::Dangling(id),
        }
    }
}

/// Id maps for all five collections of one snapshot
pub struct LookupIndex<'a> {
    org_units: IdMap<'a, OrgUnit>,
    locations: IdMap<'a, Location>,
    geo_units: IdMap<'a, GeographicalUnit>,
    business_units: IdMap<'a, BusinessUnit>,
    assignments: IdMap<'a, Assignment>,
}

impl<'a> LookupIndex<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            org_units: IdMap::build(&snapshot.org_units),
            locations: IdMap::build(&snapshot.locations),
            geo_units: IdMap::build(&snapshot.geo_units),
            business_units: IdMap::build(&snapshot.business_units),
            assignments: IdMap::build(&snapshot.assignments),
        }
    }

    pub fn org_unit(&self, id: &str) -> Option<&'a OrgUnit> {
        self.org_units.get(id)
    }

    /// Position of an org unit in the snapshot's `org_units`
    pub fn org_unit_position(&self, id: &str) -> Option<usize> {
        self.org_units.position(id)
    }

    pub fn location(&self, id: &str) -> Option<&'a Location> {
        self.locations.get(id)
    }

    pub fn geo_unit(&self, id: &str) -> Option<&'a GeographicalUnit> {
        self.geo_units.get(id)
    }

    pub fn business_unit(&self, id: &str) -> Option<&'a BusinessUnit> {
        self.business_units.get(id)
    }

    pub fn org_unit_ref(&self, reference: Option<&EntityRef>) -> Option<&'a OrgUnit> {
        reference.and_then(|r| self.org_unit(r.as_str()))
    }

    pub fn location_ref(&self, reference: Option<&EntityRef>) -> Option<&'a Location> {
        reference.and_then(|r| self.location(r.as_str()))
    }

    pub fn geo_unit_ref(&self, reference: Option<&EntityRef>) -> Option<&'a GeographicalUnit> {
        reference.and_then(|r| self.geo_unit(r.as_str()))
    }

    pub fn business_unit_ref(&self, reference: Option<&EntityRef>) -> Option<&'a BusinessUnit> {
        reference.and_then(|r| self.business_unit(r.as_str()))
    }

    /// Geo unit reference of the unit's location, when the location exists
    pub fn unit_geo_ref(&self, unit: &OrgUnit) -> Option<&'a EntityRef> {
        self.location_ref(unit.location_id.as_ref())
            .and_then(|location| location.geo_unit_id.as_ref())
    }

    pub fn resolve<'s>(&'s self, collection: Collection, id: Option<&'s str>) -> Resolution<'s> {
        match collection {
            Collection::OrgUnits => self.org_units.resolve(id),
            Collection::Locations => self.locations.resolve(id),
            Collection::GeoUnits => self.geo_units.resolve(id),
            Collection::BusinessUnits => self.business_units.resolve(id),
            Collection::Assignments => self.assignments.resolve(id),
        }
    }

    pub fn resolve_ref<'s>(
        &'s self,
        collection: Collection,
        reference: Option<&'s EntityRef>,
    ) -> Resolution<'s> {
        self.resolve(collection, reference.map(EntityRef::as_str))
    }

    /// Display name for any id: name if found, raw id if dangling,
    /// "Unknown" if the collection is empty, "Unassigned" if no id was given.
    pub fn resolve_name(&self, collection: Collection, id: Option<&str>) -> String {
        self.resolve(collection, id).display().to_string()
    }
}
