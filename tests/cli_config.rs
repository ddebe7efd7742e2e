//! CLI configuration and snapshot loading tests
//!
//! Exercise the path from a config file on disk to JSON responses, using
//! temporary directories for snapshots.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use insightql::cli::{datasets_with, query_with, validate_with, CliErrorCode, Config};

fn room_rows() -> Value {
    json!([
        {
            "fullname": "Hugh Dempster Pavilion", "shortname": "DMP", "number": "110",
            "name": "DMP_110", "address": "6245 Agronomy Road V6T 1Z4",
            "lat": 49.26125, "lon": -123.24807, "seats": 120,
            "type": "Tiered Large Group", "furniture": "Classroom-Fixed Tables/Movable Chairs",
            "href": "http://students.ubc.ca/campus/discover/buildings-and-classrooms/room/DMP-110"
        },
        {
            "fullname": "Hugh Dempster Pavilion", "shortname": "DMP", "number": "310",
            "name": "DMP_310", "address": "6245 Agronomy Road V6T 1Z4",
            "lat": 49.26125, "lon": -123.24807, "seats": 160,
            "type": "Tiered Large Group", "furniture": "Classroom-Fixed Tables/Movable Chairs",
            "href": "http://students.ubc.ca/campus/discover/buildings-and-classrooms/room/DMP-310"
        },
        {
            "fullname": "Henry Angus", "shortname": "ANGU", "number": "098",
            "name": "ANGU_098", "address": "2053 Main Mall",
            "lat": 49.26486, "lon": -123.25364, "seats": 260,
            "type": "Tiered Large Group", "furniture": "Classroom-Fixed Tables/Fixed Chairs",
            "href": "http://students.ubc.ca/campus/discover/buildings-and-classrooms/room/ANGU-098"
        }
    ])
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Creates a data dir with a rooms snapshot and a config pointing at it
fn setup(config_extra: Value) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    write_json(&dir.path().join("rooms.json"), &room_rows());

    let mut config = json!({
        "data_dir": dir.path().to_str().unwrap(),
        "datasets": [{"id": "rooms", "kind": "rooms", "file": "rooms.json"}]
    });
    if let (Some(target), Some(extra)) = (config.as_object_mut(), config_extra.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }

    let config_path = dir.path().join("insightql.json");
    write_json(&config_path, &config);
    (dir, config_path)
}

fn respond(config_path: &Path, query: &str) -> Value {
    let engine = Config::load(config_path).unwrap().build_engine().unwrap();
    let mut out = Vec::new();
    query_with(&engine, &mut query.as_bytes(), &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

/// Test: A config with one snapshot loads and answers queries.
#[test]
fn test_query_through_config() {
    let (_dir, config_path) = setup(json!({}));
    let response = respond(
        &config_path,
        r#"{
            "WHERE": {"IS": {"rooms_shortname": "DMP"}},
            "OPTIONS": {"COLUMNS": ["rooms_name", "rooms_seats"], "ORDER": {"dir": "DOWN", "keys": ["rooms_seats"]}}
        }"#,
    );
    assert_eq!(
        response,
        json!({
            "status": "ok",
            "result": [
                {"rooms_name": "DMP_310", "rooms_seats": 160},
                {"rooms_name": "DMP_110", "rooms_seats": 120}
            ]
        })
    );
}

/// Test: max_results in the config tightens the cap.
#[test]
fn test_configured_cap() {
    let (_dir, config_path) = setup(json!({"max_results": 2}));
    let response = respond(
        &config_path,
        r#"{"WHERE": {}, "OPTIONS": {"COLUMNS": ["rooms_name"]}}"#,
    );
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "INSIGHT_RESULT_TOO_LARGE");

    let grouped = respond(
        &config_path,
        r#"{
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["rooms_shortname", "seats"]},
            "TRANSFORMATIONS": {"GROUP": ["rooms_shortname"], "APPLY": [{"seats": {"SUM": "rooms_seats"}}]}
        }"#,
    );
    assert_eq!(
        grouped["result"],
        json!([
            {"rooms_shortname": "DMP", "seats": 280},
            {"rooms_shortname": "ANGU", "seats": 260}
        ])
    );
}

/// Test: Out-of-range max_results is a config error.
#[test]
fn test_cap_cannot_be_loosened() {
    let (_dir, config_path) = setup(json!({"max_results": 10000}));
    let err = Config::load(&config_path).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

/// Test: Missing config file is a config error.
#[test]
fn test_missing_config() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

// =============================================================================
// SNAPSHOT LOADING
// =============================================================================

/// Test: A snapshot whose rows do not match the kind fails to load.
#[test]
fn test_malformed_snapshot_fails_load() {
    let (dir, config_path) = setup(json!({}));
    write_json(&dir.path().join("rooms.json"), &json!([{"shortname": "DMP"}]));

    let err = Config::load(&config_path)
        .unwrap()
        .build_engine()
        .unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::LoadFailed);
    assert!(err.message().contains("INSIGHT_INVALID_DATASET"));
}

/// Test: A snapshot that is not a JSON array fails to load.
#[test]
fn test_non_array_snapshot_fails_load() {
    let (dir, config_path) = setup(json!({}));
    write_json(&dir.path().join("rooms.json"), &json!({"rows": []}));
    assert!(Config::load(&config_path).unwrap().build_engine().is_err());
}

/// Test: Missing snapshot file fails to load.
#[test]
fn test_missing_snapshot_fails_load() {
    let (dir, config_path) = setup(json!({}));
    fs::remove_file(dir.path().join("rooms.json")).unwrap();
    assert!(Config::load(&config_path).unwrap().build_engine().is_err());
}

// =============================================================================
// OTHER COMMANDS
// =============================================================================

/// Test: validate answers with a verdict, never an error response.
#[test]
fn test_validate_command() {
    let (_dir, config_path) = setup(json!({}));
    let engine = Config::load(&config_path).unwrap().build_engine().unwrap();

    let mut out = Vec::new();
    validate_with(
        &engine,
        &mut r#"{"WHERE": {}, "OPTIONS": {"COLUMNS": ["sections_avg"]}}"#.as_bytes(),
        &mut out,
    )
    .unwrap();
    let response: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(response, json!({"status": "ok", "valid": false}));
}

/// Test: datasets lists what the config loaded.
#[test]
fn test_datasets_command() {
    let (_dir, config_path) = setup(json!({}));
    let engine = Config::load(&config_path).unwrap().build_engine().unwrap();

    let mut out = Vec::new();
    datasets_with(&engine, &mut out).unwrap();
    let response: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        response,
        json!({"status": "ok", "result": [{"id": "rooms", "kind": "rooms", "numRows": 3}]})
    );
}

/// Test: Empty stdin is an I/O failure, not a query rejection.
#[test]
fn test_empty_input_is_cli_error() {
    let (_dir, config_path) = setup(json!({}));
    let engine = Config::load(&config_path).unwrap().build_engine().unwrap();
    let mut out = Vec::new();
    let err = query_with(&engine, &mut "".as_bytes(), &mut out).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::IoError);
    assert!(out.is_empty());
}
