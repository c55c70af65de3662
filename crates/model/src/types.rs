use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::reference::{
    active_default, lenient_amount, lenient_f64, lenient_flag, lenient_u32, optional_ref,
    optional_text, record_id, EntityRef,
};

/// Common surface of every record in a snapshot
pub trait Record {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Display name used by lookups
    fn name(&self) -> &str;
}

/// Node of the organizational structure tree (department, division, team...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    #[serde(deserialize_with = "record_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,

    /// Free-form type tag ("DEPARTMENT", "DIVISION", ...)
    #[serde(default, rename = "type", deserialize_with = "optional_text")]
    pub unit_type: Option<String>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub parent_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub location_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub business_unit_id: Option<EntityRef>,

    /// Tree depth, 1 = root
    #[serde(default, deserialize_with = "lenient_u32")]
    pub level: u32,

    /// Denormalized counter kept by the backing service. May be stale.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_employees: u32,

    #[serde(default, deserialize_with = "lenient_u32")]
    pub max_employees: u32,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub budget: f64,

    #[serde(default = "active_default", deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

impl OrgUnit {
    pub fn is_root(&self) -> bool {
        self.level == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(deserialize_with = "record_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub postal_code: Option<String>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub geo_unit_id: Option<EntityRef>,

    #[serde(default = "active_default", deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

impl Location {
    /// "city, country" style summary, empty when no address part is known
    pub fn place(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicalUnit {
    #[serde(deserialize_with = "record_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub parent_geo_unit_id: Option<EntityRef>,

    #[serde(default = "active_default", deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    #[serde(deserialize_with = "record_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub parent_business_unit_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "lenient_u32")]
    pub employee_count: u32,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub revenue: f64,

    #[serde(default = "active_default", deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentType {
    #[default]
    Primary,
    Secondary,
    Temporary,
    Consultant,
}

/// Links a person to an org unit (and optionally a location, geo unit and
/// business unit) with a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(deserialize_with = "record_id")]
    pub id: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub user_name: Option<String>,

    #[serde(
        default,
        alias = "organizationalStructureId",
        deserialize_with = "optional_ref"
    )]
    pub org_unit_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub location_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub geo_unit_id: Option<EntityRef>,

    #[serde(default, deserialize_with = "optional_ref")]
    pub business_unit_id: Option<EntityRef>,

    #[serde(default)]
    pub job_title: String,

    #[serde(default)]
    pub assignment_type: AssignmentType,

    #[serde(default = "active_default", deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

impl Assignment {
    /// Person label: user name when known, raw user id otherwise
    pub fn display_name(&self) -> &str {
        match &self.user_name {
            Some(name) => name,
            None if !self.user_id.is_empty() => &self.user_id,
            None => &self.id,
        }
    }
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr, |$this:ident| $name:expr) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                let $this = self;
                $name
            }
        }
    };
}

impl_record!(OrgUnit, Collection::OrgUnits, |unit| &unit.name);
impl_record!(Location, Collection::Locations, |location| &location.name);
impl_record!(GeographicalUnit, Collection::GeoUnits, |geo| &geo.name);
impl_record!(BusinessUnit, Collection::BusinessUnits, |unit| &unit.name);
impl_record!(Assignment, Collection::Assignments, |assignment| assignment
    .display_name());
