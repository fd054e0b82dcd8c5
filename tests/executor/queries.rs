//! Query Tests
//!
//! Selector queries and index scans over a small fixed data set:
//!
//! | Entry | Facility | Person |
//! |-------|----------|--------|
//! | R1    | F1       | P1     |
//! | R2    | F1       | P2     |
//! | R3    | F2       | P1     |

use crate::common::*;
use entrylog_core::{Config, Error};
use entrylog_executor::{Executor, Output, TransientMap};
use entrylog_storage::MemoryStore;
use serde_json::Value;
use std::sync::Arc;

fn seeded() -> (Executor, Arc<MemoryStore>) {
    let (executor, store) = create_executor();
    create(&executor, "R1", "F1", "P1").unwrap();
    create(&executor, "R2", "F1", "P2").unwrap();
    create(&executor, "R3", "F2", "P1").unwrap();
    (executor, store)
}

fn run(executor: &Executor, function: &str, arg: &str) -> Output {
    executor
        .invoke(function, &[arg], &TransientMap::new())
        .unwrap()
}

fn keys(executor: &Executor, function: &str, arg: &str) -> Vec<String> {
    result_keys(&run(executor, function, arg))
}

// ============================================================================
// Facility
// ============================================================================

#[test]
fn query_by_facility_matches_exactly() {
    let (executor, _) = seeded();
    assert_eq!(keys(&executor, "queryByFacility", "F1"), vec!["R1", "R2"]);
    assert_eq!(keys(&executor, "queryByFacility", "F2"), vec!["R3"]);
    assert!(keys(&executor, "queryByFacility", "F3").is_empty());
}

#[test]
fn facility_index_scan_agrees_with_selector() {
    let (executor, _) = seeded();
    for facility in ["F1", "F2", "F3"] {
        assert_eq!(
            keys(&executor, "listByFacilityIndex", facility),
            keys(&executor, "queryByFacility", facility),
            "facility {}",
            facility
        );
    }
}

#[test]
fn facility_index_scan_returns_public_records() {
    let (executor, _) = seeded();
    let records = run(&executor, "listByFacilityIndex", "F2").records().unwrap();
    assert_eq!(records.len(), 1);
    let record: Value = serde_json::from_str(records[0].record_json()).unwrap();
    assert_eq!(record["docType"], "entryLog");
    assert_eq!(record["entryLogID"], "R3");
    assert!(record.get("personalID").is_none());
}

#[test]
fn facility_prefix_does_not_match_longer_ids() {
    let (executor, _) = seeded();
    create(&executor, "R4", "F10", "P4").unwrap();
    assert_eq!(keys(&executor, "listByFacilityIndex", "F1"), vec!["R1", "R2"]);
    assert_eq!(keys(&executor, "listByFacilityIndex", "F10"), vec!["R4"]);
}

#[test]
fn deleted_entry_leaves_scans() {
    let (executor, _) = seeded();
    delete(&executor, "R1").unwrap();
    assert_eq!(keys(&executor, "listByFacilityIndex", "F1"), vec!["R2"]);
    assert_eq!(keys(&executor, "queryByFacility", "F1"), vec!["R2"]);
    assert_eq!(keys(&executor, "listByPersonalIndex", "P1"), vec!["R3"]);
}

// ============================================================================
// Personal
// ============================================================================

#[test]
fn personal_queries_return_private_details() {
    let (executor, _) = seeded();
    assert_eq!(keys(&executor, "queryByPersonal", "P1"), vec!["R1", "R3"]);
    assert_eq!(keys(&executor, "listByPersonalIndex", "P1"), vec!["R1", "R3"]);

    let records = run(&executor, "listByPersonalIndex", "P2").records().unwrap();
    assert_eq!(records.len(), 1);
    let record: Value = serde_json::from_str(records[0].record_json()).unwrap();
    assert_eq!(record["docType"], "entryLogPrivateDetails");
    assert_eq!(record["entryLogID"], "R2");
    assert_eq!(record["personalID"], "P2");
    assert!(record.get("facilityID").is_none());
}

#[test]
fn personal_scan_sees_updated_address() {
    let (executor, _) = seeded();
    update_address(&executor, "R3", "4 Pine Rd").unwrap();
    let records = run(&executor, "listByPersonalIndex", "P1").records().unwrap();
    let r3 = records.iter().find(|r| r.key == "R3").unwrap();
    let record: Value = serde_json::from_str(r3.record_json()).unwrap();
    assert_eq!(record["address"], "4 Pine Rd");
}

#[test]
fn empty_attribute_is_missing_field() {
    let (executor, _) = seeded();
    let cases = [
        ("queryByFacility", "facilityID"),
        ("listByFacilityIndex", "facilityID"),
        ("queryByPersonal", "personalID"),
        ("listByPersonalIndex", "personalID"),
        ("queryRaw", "query"),
    ];
    for (function, field) in cases {
        let err = executor
            .invoke(function, &[""], &TransientMap::new())
            .unwrap_err();
        assert_eq!(err, Error::missing_field(field), "{}", function);
    }
}

// ============================================================================
// Raw selectors
// ============================================================================

#[test]
fn raw_selector_with_operators() {
    let (executor, _) = seeded();
    let query = r#"{"selector":{"docType":"entryLog","facilityID":{"$in":["F2","F9"]}}}"#;
    assert_eq!(keys(&executor, "queryEntryLogs", query), vec!["R3"]);

    let query = r#"{"selector":{"entryLogID":{"$gt":"R1"}}}"#;
    assert_eq!(keys(&executor, "queryRaw", query), vec!["R2", "R3"]);
}

#[test]
fn raw_selector_sort_and_limit() {
    let (executor, _) = seeded();
    let query = r#"{"selector":{"docType":"entryLog"},"sort":[{"entryLogID":"desc"}],"limit":2}"#;
    let records = run(&executor, "queryRaw", query).records().unwrap();
    let ordered: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(ordered, vec!["R3", "R2"]);
}

#[test]
fn raw_selector_projects_fields() {
    let (executor, _) = seeded();
    let query = r#"{"selector":{"entryLogID":"R2"},"fields":["entryLogID","facilityID"]}"#;
    let records = run(&executor, "queryRaw", query).records().unwrap();
    assert_eq!(records.len(), 1);
    let record: Value = serde_json::from_str(records[0].record_json()).unwrap();
    assert_eq!(
        record,
        serde_json::json!({"entryLogID": "R2", "facilityID": "F1"})
    );
}

#[test]
fn raw_selector_never_sees_private_details() {
    let (executor, _) = seeded();
    let query = r#"{"selector":{"personalID":"P1"}}"#;
    assert!(keys(&executor, "queryRaw", query).is_empty());
}

#[test]
fn raw_selector_rejects_bad_documents() {
    let (executor, _) = seeded();
    for query in ["not json", "[]", r#"{"limit":1}"#, r#"{"selector":{"a":{"$regex":"x"}}}"#] {
        let err = executor
            .invoke("queryRaw", &[query], &TransientMap::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "MalformedInput", "{}", query);
    }
}

// ============================================================================
// Result shape
// ============================================================================

#[test]
fn results_are_a_json_array_of_key_record_objects() {
    let (executor, _) = seeded();
    let output = run(&executor, "queryByFacility", "F1");
    let Output::Records { count, json } = &output else {
        panic!("Expected Records output, got {:?}", output);
    };
    assert_eq!(*count, 2);

    let value: Value = serde_json::from_slice(json).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        let object = item.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object["Key"].is_string());
        assert_eq!(object["Record"]["facilityID"], "F1");
    }
}

#[test]
fn selector_and_scan_return_identical_records() {
    let (executor, _) = seeded();
    let from_selector = run(&executor, "queryByFacility", "F2").records().unwrap();
    let from_scan = run(&executor, "listByFacilityIndex", "F2").records().unwrap();
    assert_eq!(from_selector, from_scan);

    let stored = run(&executor, "read", "R3");
    assert_eq!(from_selector[0].record_json().as_bytes(), stored.payload());
}

#[test]
fn empty_result_is_empty_array() {
    let (executor, _) = seeded();
    let output = run(&executor, "listByPersonalIndex", "P9");
    assert_eq!(output.payload(), b"[]");
}

#[test]
fn queries_release_their_cursors() {
    let (executor, store) = seeded();
    run(&executor, "queryByFacility", "F1");
    run(&executor, "listByFacilityIndex", "F1");
    run(&executor, "listByPersonalIndex", "P1");
    let _ = executor.invoke("queryRaw", &["not json"], &TransientMap::new());
    assert_eq!(store.open_cursors(), 0);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn snapshot_round_trip_preserves_queries() {
    let (executor, store) = seeded();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entrylog.json");
    store.save_snapshot(&path).unwrap();

    let reloaded = Arc::new(MemoryStore::load_snapshot(&path).unwrap());
    let executor2 = Executor::new(reloaded, Config::default()).unwrap();

    assert_eq!(
        keys(&executor2, "listByFacilityIndex", "F1"),
        keys(&executor, "listByFacilityIndex", "F1")
    );
    assert_eq!(
        read(&executor2, "readSensitive", "R2").unwrap(),
        read(&executor, "readSensitive", "R2").unwrap()
    );
}
