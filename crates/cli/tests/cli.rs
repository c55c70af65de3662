use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli_raw(data: &Path, args: &[&str]) -> (bool, Value, String) {
    let output = Command::cargo_bin("orgview")
        .expect("binary")
        .arg("--quiet")
        .arg("--data")
        .arg(data)
        .args(args)
        .output()
        .expect("command run");

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let body = serde_json::from_slice(&output.stdout).unwrap_or(Value::Null);
    (output.status.success(), body, stderr)
}

fn run_cli(data: &Path, args: &[&str]) -> Value {
    let (ok, body, stderr) = run_cli_raw(data, args);
    assert!(ok, "args: {args:?}\nstderr: {stderr}");
    body
}

fn write(dir: &Path, name: &str, value: Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn setup_data() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(
        root,
        "org_units.json",
        json!([
            {"id": "u1", "name": "HQ", "level": 1, "locationId": "l1", "maxEmployees": 4},
            {"id": "u2", "name": "Lab", "level": 2, "parentId": "u1", "locationId": "l2",
             "businessUnitId": "b1", "maxEmployees": 2}
        ]),
    );
    write(
        root,
        "locations.json",
        json!({"data": [
            {"id": "l1", "name": "Berlin", "geoUnitId": "g1"},
            {"id": "l2", "name": "Munich", "geoUnitId": "g1"}
        ]}),
    );
    write(root, "geo_units.json", json!([{"id": "g1", "name": "Europe"}]));
    write(
        root,
        "business_units.json",
        json!([{"id": "b1", "name": "Research"}]),
    );
    write(
        root,
        "assignments.json",
        json!([
            {"id": "a1", "userId": "p1", "userName": "Ada", "orgUnitId": "u2"},
            {"id": "a2", "userId": "p2", "userName": "Grace", "orgUnitId": "u1"}
        ]),
    );
    temp
}

fn node_ids(body: &Value) -> Vec<&str> {
    body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect()
}

#[test]
fn graph_prints_general_view() {
    let temp = setup_data();
    let body = run_cli(temp.path(), &["graph"]);

    assert_eq!(
        node_ids(&body),
        vec![
            "organization",
            "geo:g1",
            "location:l1",
            "location:l2",
            "business:b1",
            "unit:u1",
            "unit:u2"
        ]
    );
    assert_eq!(body["edges"].as_array().unwrap().len(), 6);
    assert_eq!(body["nodes"][0]["aggregatePayload"]["headcount"], 2);
    assert_eq!(body["nodes"][0]["x"], 0.0);
}

#[test]
fn graph_applies_strategy_and_filters() {
    let temp = setup_data();
    let body = run_cli(
        temp.path(),
        &["graph", "--strategy", "organizational", "--search", "lab"],
    );

    assert_eq!(node_ids(&body), vec!["unit:u2"]);
    assert!(body["edges"].as_array().unwrap().is_empty());
}

#[test]
fn table_expands_requested_headers() {
    let temp = setup_data();
    let body = run_cli(
        temp.path(),
        &["table", "--grouping", "location", "--expand", "header:location:l1"],
    );

    assert_eq!(body["grouping"], "location");
    let rows = body["rows"].as_array().unwrap();
    let ids = rows
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec!["header:location:l1", "unit:u1", "header:location:l2"]
    );
    assert_eq!(rows[0]["isPrimary"], true);
    assert_eq!(rows[0]["expanded"], true);
    assert_eq!(rows[2]["expanded"], false);
    assert!(rows[1].get("expanded").is_none());
}

#[test]
fn table_follows_strategy_grouping() {
    let temp = setup_data();
    let body = run_cli(temp.path(), &["table", "--strategy", "employees", "--expand-all"]);

    assert_eq!(body["grouping"], "org_unit");
    let labels = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["label"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["HQ", "Grace", "Lab", "Ada"]);
}

#[test]
fn missing_files_are_empty_collections() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "org_units.json",
        json!([{"id": "u1", "name": "Solo", "level": 3}]),
    );
    let body = run_cli(temp.path(), &["graph", "--strategy", "organizational"]);

    assert_eq!(node_ids(&body), vec!["virtual-root", "unit:u1"]);
    assert_eq!(body["edges"][0]["id"], "virtual-root->unit:u1");
}

#[test]
fn malformed_collection_fails_the_load() {
    let temp = setup_data();
    write(temp.path(), "assignments.json", json!({"items": []}));

    let (ok, _, stderr) = run_cli_raw(temp.path(), &["graph"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to load snapshot"), "stderr: {stderr}");
}

#[test]
fn config_changes_layout() {
    let temp = setup_data();
    let config = temp.path().join("orgview.toml");
    fs::write(
        &config,
        "[layout]\nrow_height = 100.0\n\n[labels]\nroot = \"Acme\"\n",
    )
    .unwrap();

    let body = run_cli(
        temp.path(),
        &["graph", "--strategy", "business", "--config", config.to_str().unwrap()],
    );
    assert_eq!(body["nodes"][0]["label"], "Acme");
    assert_eq!(body["nodes"][1]["y"], 100.0);
}

#[test]
fn invalid_config_is_rejected() {
    let temp = setup_data();
    let config = temp.path().join("orgview.toml");
    fs::write(&config, "[layout]\nspacing = 0.0\n").unwrap();

    let (ok, _, stderr) = run_cli_raw(
        temp.path(),
        &["graph", "--config", config.to_str().unwrap()],
    );
    assert!(!ok);
    assert!(stderr.contains("Failed to load config"), "stderr: {stderr}");
}
