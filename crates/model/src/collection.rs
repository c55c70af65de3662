use serde::{Deserialize, Serialize};
use std::fmt;

/// The five raw collections that make up one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    OrgUnits,
    Locations,
    GeoUnits,
    BusinessUnits,
    Assignments,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::OrgUnits,
        Collection::Locations,
        Collection::GeoUnits,
        Collection::BusinessUnits,
        Collection::Assignments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrgUnits => "org_units",
            Self::Locations => "locations",
            Self::GeoUnits => "geo_units",
            Self::BusinessUnits => "business_units",
            Self::Assignments => "assignments",
        }
    }

    /// File name used when a snapshot is stored as one JSON file per collection
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
