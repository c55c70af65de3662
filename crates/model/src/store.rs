use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::collection::Collection;
use crate::decode::decode_collection;
use crate::error::Result;
use crate::types::{Assignment, BusinessUnit, GeographicalUnit, Location, OrgUnit};

/// Immutable view of all five collections taken at one refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub org_units: Vec<OrgUnit>,
    pub locations: Vec<Location>,
    pub geo_units: Vec<GeographicalUnit>,
    pub business_units: Vec<BusinessUnit>,
    pub assignments: Vec<Assignment>,
}

impl Snapshot {
    /// Decode five raw payloads. Fails as a whole if any collection fails.
    pub fn from_payloads(
        org_units: Value,
        locations: Value,
        geo_units: Value,
        business_units: Value,
        assignments: Value,
    ) -> Result<Self> {
        Ok(Self {
            org_units: decode_collection(org_units)?,
            locations: decode_collection(locations)?,
            geo_units: decode_collection(geo_units)?,
            business_units: decode_collection(business_units)?,
            assignments: decode_collection(assignments)?,
        })
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::OrgUnits => self.org_units.len(),
            Collection::Locations => self.locations.len(),
            Collection::GeoUnits => self.geo_units.len(),
            Collection::BusinessUnits => self.business_units.len(),
            Collection::Assignments => self.assignments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|&c| self.len(c) == 0)
    }
}

/// Backing service delivering one raw payload per collection
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, collection: Collection) -> Result<Value>;
}

/// Holds the last fully formed snapshot.
///
/// A refresh fetches all five collections concurrently and publishes the new
/// snapshot only when every fetch and every decode succeeded.
#[derive(Debug, Default)]
pub struct EntityStore {
    current: Arc<Snapshot>,
    generation: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Number of snapshots published so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.current = Arc::new(snapshot);
        self.generation += 1;
        self.snapshot()
    }

    pub async fn refresh<S>(&mut self, source: &S) -> Result<Arc<Snapshot>>
    where
        S: SnapshotSource + ?Sized,
    {
        let fetched = tokio::try_join!(
            source.fetch(Collection::OrgUnits),
            source.fetch(Collection::Locations),
            source.fetch(Collection::GeoUnits),
            source.fetch(Collection::BusinessUnits),
            source.fetch(Collection::Assignments),
        );

        let decoded = fetched.and_then(
            |(org_units, locations, geo_units, business_units, assignments)| {
                Snapshot::from_payloads(
                    org_units,
                    locations,
                    geo_units,
                    business_units,
                    assignments,
                )
            },
        );

        match decoded {
            Ok(snapshot) => {
                log::info!(
                    "Published snapshot #{}: {} org units, {} locations, {} geo units, \
                     {} business units, {} assignments",
                    self.generation + 1,
                    snapshot.org_units.len(),
                    snapshot.locations.len(),
                    snapshot.geo_units.len(),
                    snapshot.business_units.len(),
                    snapshot.assignments.len()
                );
                Ok(self.replace(snapshot))
            }
            Err(err) => {
                log::warn!(
                    "Refresh failed, keeping snapshot #{}: {err}",
                    self.generation
                );
                Err(err)
            }
        }
    }
}
