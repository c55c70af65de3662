#![allow(dead_code)]

use orgview_model::Snapshot;
use serde_json::{json, Value};

pub fn snapshot(
    org_units: Value,
    locations: Value,
    geo_units: Value,
    business_units: Value,
    assignments: Value,
) -> Snapshot {
    Snapshot::from_payloads(org_units, locations, geo_units, business_units, assignments)
        .expect("valid snapshot")
}

/// Two regions, four sites (one without region), two business units, six
/// org units (one pointing at a deleted parent and location) and eight
/// assignments (one dangling, one unassigned).
pub fn company() -> Snapshot {
    snapshot(
        json!([
            {"id": "u1", "name": "Headquarters", "level": 1, "locationId": "l1",
             "budget": 1000, "maxEmployees": 10},
            {"id": "u2", "name": "Platform", "level": 2, "parentId": "u1", "locationId": "l1",
             "businessUnitId": "b1", "budget": 500, "maxEmployees": 5,
             "description": "Core services"},
            {"id": "u3", "name": "Field Sales", "level": 2, "parentId": "u1", "locationId": "l3",
             "businessUnitId": "b2", "budget": 300, "maxEmployees": 4},
            {"id": "u4", "name": "Support", "level": 3, "parentId": "u2", "locationId": "l2",
             "businessUnitId": "b1", "budget": 200, "maxEmployees": 0},
            {"id": "u5", "name": "Nomads", "level": 2, "locationId": "l4",
             "budget": 50, "maxEmployees": 2},
            {"id": "u6", "name": "Lost", "level": 2, "parentId": "ghost", "locationId": "l-gone",
             "budget": "oops"}
        ]),
        json!({"data": [
            {"id": "l1", "name": "Berlin", "city": "Berlin", "country": "DE", "geoUnitId": "g1"},
            {"id": "l2", "name": "London", "geoUnitId": "g1"},
            {"id": "l3", "name": "New York", "geoUnitId": "g2"},
            {"id": "l4", "name": "Remote"}
        ]}),
        json!([
            {"id": "g1", "name": "EMEA", "description": "Europe, Middle East and Africa"},
            {"id": "g2", "name": "Americas"}
        ]),
        json!([
            {"id": "b1", "name": "Engineering"},
            {"id": "b2", "name": "Sales"}
        ]),
        json!([
            {"id": "a1", "userId": "p1", "userName": "Alice", "orgUnitId": "u1", "jobTitle": "CEO"},
            {
                "id": "a2", "userId": "p2", "userName": "Bob",
                "orgUnitId": "u2", "jobTitle": "Engineer"
            },
            {
                "id": "a3", "userId": "p3", "userName": "Carol",
                "orgUnitId": "u2", "jobTitle": "Engineer"
            },
            {
                "id": "a4", "userId": "p4", "userName": "Dan",
                "orgUnitId": "u3", "jobTitle": "Account Executive"
            },
            {
                "id": "a5", "userId": "p5", "userName": "Eve",
                "orgUnitId": "u4", "jobTitle": "Support Engineer"
            },
            {"id": "a6", "userId": "p6", "userName": "Mallory", "orgUnitId": "ghost"},
            {"id": "a7", "userId": "p7", "userName": "Trent"},
            {"id": "a8", "userId": "p8", "userName": "Peggy", "orgUnitId": "u5", "locationId": "l2"}
        ]),
    )
}

pub fn ids<T, F>(items: &[T], f: F) -> Vec<String>
where
    F: Fn(&T) -> &str,
{
    items.iter().map(|item| f(item).to_string()).collect()
}
