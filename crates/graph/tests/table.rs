mod common;

use common::company;
use orgview_graph::{
    node_id, visible_rows, EngineConfig, ExpansionState, FilterState, Row, RowKind,
    TableGrouping, ViewEngine, ViewRequest, ViewStrategy, UNASSIGNED,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn labels(rows: &[Row]) -> Vec<&str> {
    rows.iter().map(|row| row.label.as_str()).collect()
}

fn headcounts(rows: &[Row]) -> Vec<usize> {
    rows.iter().map(|row| row.headcount).collect()
}

#[test]
fn location_groups_put_primary_first() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::Location, &FilterState::default());

    assert_eq!(
        labels(&rows),
        vec!["Berlin", "l-gone", "London", "New York", "Remote"]
    );
    assert_eq!(headcounts(&rows), vec![3, 0, 1, 1, 1]);
    assert!(rows[0].is_primary);
    assert!(rows[1..].iter().all(|row| !row.is_primary));
    assert!(rows.iter().all(Row::is_header));
    assert_eq!(rows[0].id, "header:location:l1");

    let berlin = &rows[0];
    assert_eq!(berlin.budget, 1500.0);
    assert_eq!(berlin.max_capacity, 15);
    assert_eq!(berlin.capacity_percent, 20);
    let members = berlin
        .expanded_data
        .iter()
        .map(|row| (row.id.as_str(), row.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        members,
        vec![("unit:u1", RowKind::Unit), ("unit:u2", RowKind::Unit)]
    );
}

#[test]
fn unit_rows_carry_resolved_names() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::Location, &FilterState::default());

    let platform = &rows[0].expanded_data[1];
    assert_eq!(platform.label, "Platform");
    assert_eq!(platform.location.as_deref(), Some("Berlin"));
    assert_eq!(platform.business_unit.as_deref(), Some("Engineering"));
    assert_eq!(platform.geo_unit.as_deref(), Some("EMEA"));
    assert_eq!(platform.headcount, 2);
    assert_eq!(platform.capacity_percent, 40);

    let headquarters = &rows[0].expanded_data[0];
    assert_eq!(headquarters.business_unit.as_deref(), Some(UNASSIGNED));

    let lost = &rows[1].expanded_data[0];
    assert_eq!(lost.location.as_deref(), Some("l-gone"));
    assert_eq!(lost.geo_unit.as_deref(), Some(UNASSIGNED));
}

#[test]
fn geo_groups_collect_unresolved_units() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::GeoUnit, &FilterState::default());

    assert_eq!(labels(&rows), vec!["Americas", "EMEA", UNASSIGNED]);
    assert_eq!(headcounts(&rows), vec![1, 4, 1]);
    assert_eq!(rows[2].id, "header:geo_unit");
    assert_eq!(rows[2].expanded_data.len(), 2);
}

#[test]
fn level_groups_sort_numerically() {
    let snapshot = common::snapshot(
        json!([
            {"id": "a", "name": "A", "level": 10},
            {"id": "b", "name": "B", "level": 2},
            {"id": "c", "name": "C", "level": 1},
            {"id": "d", "name": "D", "level": 2}
        ]),
        json!([]),
        json!([]),
        json!([]),
        json!([]),
    );
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::Level, &FilterState::default());

    assert_eq!(labels(&rows), vec!["Level 1", "Level 2", "Level 10"]);
    assert_eq!(rows[1].expanded_data.len(), 2);
}

#[test]
fn org_unit_grouping_lists_assignments() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::OrgUnit, &FilterState::default());

    assert_eq!(
        labels(&rows),
        vec![
            "Field Sales",
            "Headquarters",
            "Nomads",
            "Platform",
            "Support",
            UNASSIGNED
        ]
    );
    assert_eq!(headcounts(&rows).iter().sum::<usize>(), 8);

    let nomads = &rows[2].expanded_data[0];
    assert_eq!(nomads.kind, RowKind::Assignment);
    assert_eq!(nomads.label, "Peggy");
    // the assignment's own location wins over its unit's
    assert_eq!(nomads.location.as_deref(), Some("London"));
    assert_eq!(nomads.geo_unit.as_deref(), Some("EMEA"));
    assert_eq!(nomads.org_unit.as_deref(), Some("Nomads"));

    let unassigned = &rows[5].expanded_data;
    assert_eq!(unassigned[0].org_unit.as_deref(), Some("ghost"));
    assert_eq!(unassigned[1].org_unit.as_deref(), Some(UNASSIGNED));
    assert_eq!(unassigned[1].level, None);
}

#[test]
fn filters_recompute_group_aggregates() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let filters = FilterState::new().business_unit("b1");
    let rows = engine.project_table(TableGrouping::GeoUnit, &filters);

    assert_eq!(labels(&rows), vec!["EMEA"]);
    assert_eq!(rows[0].headcount, 3);
    assert_eq!(rows[0].budget, 700.0);
}

/// Compare every header with a surviving group node of the same filtered
/// view; returns how many pairs were compared.
fn assert_headers_match(engine: &ViewEngine<'_>, request: &ViewRequest, prefix: &str) -> usize {
    let graph = engine.compose(request);
    let rows = engine.project_for(request);

    let mut compared = 0;
    for row in &rows {
        let Some(source) = &row.source else {
            continue;
        };
        let Some(node) = graph.node(&format!("{prefix}:{}", source.id)) else {
            assert!(!request.filters.is_empty(), "no node for {}", row.id);
            continue;
        };
        assert_eq!(node.payload.headcount, row.headcount, "{}", row.id);
        assert_eq!(node.payload.budget, row.budget, "{}", row.id);
        assert_eq!(node.payload.max_capacity, row.max_capacity, "{}", row.id);
        assert_eq!(node.payload.capacity_percent, row.capacity_percent, "{}", row.id);
        compared += 1;
    }

    if let Some(root) = graph.node(node_id::ORGANIZATION) {
        let total = rows.iter().map(|row| row.headcount).sum::<usize>();
        assert_eq!(root.payload.headcount, total, "{} root", request.strategy);
    }
    compared
}

#[test]
fn headers_match_graph_group_nodes() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());

    let filter_sets = [
        FilterState::default(),
        FilterState::new().business_unit("b1"),
        FilterState::new().search("e"),
    ];
    for filters in filter_sets {
        for (strategy, prefix) in [
            (ViewStrategy::General, "location"),
            (ViewStrategy::Geographical, "geo"),
            (ViewStrategy::Business, "business"),
        ] {
            let request = ViewRequest::new(strategy).with_filters(filters.clone());
            let compared = assert_headers_match(&engine, &request, prefix);
            assert!(compared > 0, "{strategy} compared nothing under {filters:?}");
        }
    }
}

#[test]
fn business_unit_filter_narrows_location_nodes() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let request = ViewRequest::new(ViewStrategy::General)
        .with_filters(FilterState::new().business_unit("b1"));
    let graph = engine.compose(&request);
    let rows = engine.project_for(&request);

    let berlin = graph.node("location:l1").expect("berlin survives");
    assert_eq!((berlin.payload.headcount, berlin.payload.budget), (2, 500.0));
    let london = graph.node("location:l2").expect("london survives");
    assert_eq!((london.payload.headcount, london.payload.budget), (1, 200.0));

    let root = graph.node(node_id::ORGANIZATION).expect("root survives");
    assert_eq!(root.payload.headcount, 3);
    assert_eq!(headcounts(&rows), vec![2, 1]);
}

#[test]
fn repeated_unit_ids_count_once() {
    let snapshot = common::snapshot(
        json!([
            {"id": "u1", "name": "Platform", "level": 2, "locationId": "l1",
             "budget": 100, "maxEmployees": 4},
            {"id": "u1", "name": "Platform copy", "level": 2, "locationId": "l2",
             "budget": 900, "maxEmployees": 9}
        ]),
        json!([
            {"id": "l1", "name": "Berlin"},
            {"id": "l2", "name": "Munich"}
        ]),
        json!([]),
        json!([]),
        json!([{"id": "a1", "userId": "p1", "orgUnitId": "u1"}]),
    );
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());

    let rows = engine.project_table(TableGrouping::Location, &FilterState::default());
    assert_eq!(labels(&rows), vec!["Berlin"]);
    assert_eq!(headcounts(&rows), vec![1]);
    assert_eq!(rows[0].budget, 100.0);
    assert_eq!(rows[0].expanded_data.len(), 1);

    let graph = engine.resolve(ViewStrategy::General);
    let root = graph.node(node_id::ORGANIZATION).expect("root");
    assert_eq!(root.payload.headcount, 1);
    assert_eq!(root.payload.budget, 100.0);
    let munich = graph.node("location:l2").expect("munich node");
    assert_eq!(munich.payload.headcount, 0);
    assert_eq!(munich.payload.budget, 0.0);
}

#[test]
fn search_falls_back_to_unit_id_for_blank_names() {
    let snapshot = common::snapshot(
        json!([
            {"id": "ops-7", "name": "  ", "level": 2, "locationId": "l1"},
            {"id": "u2", "name": "Platform", "level": 2, "locationId": "l1"}
        ]),
        json!([{"id": "l1", "name": "Berlin"}]),
        json!([]),
        json!([]),
        json!([{"id": "a1", "userId": "p1", "orgUnitId": "ops-7"}]),
    );
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let request = ViewRequest::new(ViewStrategy::General)
        .with_filters(FilterState::new().search("ops-7"));

    let rows = engine.project_for(&request);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].headcount, 1);
    let members = labels(&rows[0].expanded_data);
    assert_eq!(members, vec!["ops-7"]);

    let graph = engine.compose(&request);
    assert!(graph.node("unit:ops-7").is_some());
    assert!(graph.node("unit:u2").is_none());
}

#[test]
fn employee_groups_match_table_headers() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let graph = engine.resolve(ViewStrategy::Employees);
    let rows = engine.project_for(&ViewRequest::new(ViewStrategy::Employees));

    for row in &rows {
        let node = graph
            .node(&format!("group:{}", row.label))
            .unwrap_or_else(|| panic!("no group for {}", row.label));
        assert_eq!(node.payload.headcount, row.headcount);
        assert_eq!(graph.children(&node.id).len(), row.expanded_data.len());
    }
}

#[test]
fn expansion_is_caller_state() {
    let snapshot = company();
    let engine = ViewEngine::new(&snapshot, EngineConfig::default());
    let rows = engine.project_table(TableGrouping::Location, &FilterState::default());

    let mut state = ExpansionState::new();
    assert_eq!(visible_rows(&rows, &state).len(), 5);

    assert!(state.toggle("header:location:l1"));
    let visible = visible_rows(&rows, &state)
        .into_iter()
        .map(|row| row.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        visible,
        vec![
            "header:location:l1",
            "unit:u1",
            "unit:u2",
            "header:location:l-gone",
            "header:location:l2",
            "header:location:l3",
            "header:location:l4",
        ]
    );

    state.expand_all(&rows);
    assert_eq!(visible_rows(&rows, &state).len(), 11);

    // re-projecting leaves the caller's state untouched
    let again = engine.project_table(TableGrouping::Location, &FilterState::default());
    assert_eq!(again, rows);
    assert!(state.is_expanded("header:location:l4"));

    assert!(!state.toggle("header:location:l1"));
    state.collapse("header:location:l2");
    assert_eq!(visible_rows(&rows, &state).len(), 8);

    state.collapse_all();
    assert_eq!(visible_rows(&rows, &state).len(), 5);
}

#[test]
fn groupings_parse_from_cli_names() {
    assert_eq!("business-unit".parse::<TableGrouping>(), Ok(TableGrouping::BusinessUnit));
    assert_eq!("GEO_UNIT".parse::<TableGrouping>(), Ok(TableGrouping::GeoUnit));
    assert!("team".parse::<TableGrouping>().is_err());
    assert_eq!(
        TableGrouping::for_strategy(ViewStrategy::Organizational),
        TableGrouping::Level
    );
}
