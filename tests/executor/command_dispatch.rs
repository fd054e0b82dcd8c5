//! Command Dispatch Tests
//!
//! Every function name reaches its command and returns the expected output
//! shape; invocation errors are reported before the store is touched.

use crate::common::*;
use entrylog_core::{AccessMode, Config, Error, Tier};
use entrylog_executor::{Command, Executor, Output, TransientMap};
use serde_json::json;
use std::sync::Arc;

use entrylog_storage::MemoryStore;

// ============================================================================
// Mutations
// ============================================================================

#[test]
fn create_returns_unit() {
    let (executor, store) = create_executor();
    let output = create(&executor, "E1", "F1", "P1").unwrap();
    assert_eq!(output, Output::Unit);
    assert_eq!(store.len(PUBLIC), 2);
    assert_eq!(store.len(SENSITIVE), 2);
}

#[test]
fn create_accepts_short_name() {
    let (executor, _) = create_executor();
    let map = transient("entryLog", &entry_payload("E1", "F1", "P1"));
    executor.invoke("create", NO_ARGS, &map).unwrap();
    assert_eq!(read(&executor, "read", "E1").unwrap()["facilityID"], "F1");
}

#[test]
fn update_address_and_delete_return_unit() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    assert_eq!(update_address(&executor, "E1", "2 Elm").unwrap(), Output::Unit);
    assert_eq!(delete(&executor, "E1").unwrap(), Output::Unit);
    assert!(store.is_empty());
}

#[test]
fn transient_operations_reject_positional_args() {
    let (executor, store) = create_executor();
    let map = transient("entryLog", &entry_payload("E1", "F1", "P1"));
    let err = executor.invoke("setEntryLog", &["E1"], &map).unwrap_err();
    assert_eq!(err.error_code(), "MalformedInput");
    assert!(store.is_empty());
}

#[test]
fn missing_transient_key_is_missing_field() {
    let (executor, _) = create_executor();
    let err = executor
        .invoke("delete", NO_ARGS, &TransientMap::new())
        .unwrap_err();
    assert_eq!(err, Error::missing_field("entryLog_delete"));
}

#[test]
fn non_object_payload_is_malformed() {
    let (executor, _) = create_executor();
    let map: TransientMap = [("entryLog", "[1,2,3]")].into_iter().collect();
    let err = executor.invoke("setEntryLog", NO_ARGS, &map).unwrap_err();
    assert_eq!(err.error_code(), "MalformedInput");
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn read_returns_public_record_only() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    let record = read(&executor, "getEntryLog", "E1").unwrap();
    assert_eq!(record["docType"], "entryLog");
    assert_eq!(record["entryLogID"], "E1");
    assert!(record.get("personalID").is_none());
    assert!(record.get("address").is_none());
}

#[test]
fn read_sensitive_returns_private_details() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    let record = read(&executor, "getEntryLogPrivateDetails", "E1").unwrap();
    assert_eq!(record["docType"], "entryLogPrivateDetails");
    assert_eq!(record["personalID"], "P1");
    assert_eq!(record["address"], "1 Main St");
    assert!(record.get("facilityID").is_none());
}

#[test]
fn read_requires_exactly_one_argument() {
    let (executor, _) = create_executor();
    let err = executor
        .invoke("getEntryLog", NO_ARGS, &TransientMap::new())
        .unwrap_err();
    assert_eq!(err.error_code(), "MalformedInput");
}

#[test]
fn read_missing_names_tier() {
    let (executor, _) = create_executor();
    let err = read(&executor, "read", "E9").unwrap_err();
    assert_eq!(err, Error::not_found(Tier::Public, "E9"));
    let err = read(&executor, "readSensitive", "E9").unwrap_err();
    assert_eq!(err, Error::not_found(Tier::Sensitive, "E9"));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn query_commands_return_records() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    let invocations: [(&str, &str); 7] = [
        ("queryByFacility", "F1"),
        ("queryEntryLogsByFacilityID", "F1"),
        ("queryByPersonal", "P1"),
        ("queryEntryLogsByPersonalID", "P1"),
        ("listByFacilityIndex", "F1"),
        ("listByPersonalIndex", "P1"),
        ("queryEntryLogs", r#"{"selector":{"docType":"entryLog"}}"#),
    ];
    for (function, arg) in invocations {
        let output = executor
            .invoke(function, &[arg], &TransientMap::new())
            .unwrap();
        match &output {
            Output::Records { count, .. } => assert_eq!(*count, 1, "{}", function),
            other => panic!("Expected Records output from {}, got {:?}", function, other),
        }
        assert_eq!(result_keys(&output), vec!["E1"], "{}", function);
    }
}

#[test]
fn unknown_function_is_rejected() {
    let (executor, store) = create_executor();
    let err = executor
        .invoke("transferEntryLog", NO_ARGS, &TransientMap::new())
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownOperation {
            name: "transferEntryLog".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "Received unknown function invocation: transferEntryLog"
    );
    assert!(store.is_empty());
}

// ============================================================================
// Access mode
// ============================================================================

#[test]
fn read_only_executor_serves_reads_only() {
    let store = Arc::new(MemoryStore::new());
    let writer = Executor::new(store.clone(), Config::default()).unwrap();
    create(&writer, "E1", "F1", "P1").unwrap();

    let reader = Executor::new(
        store.clone(),
        Config::new().access_mode(AccessMode::ReadOnly),
    )
    .unwrap();
    assert_eq!(read(&reader, "read", "E1").unwrap()["entryLogID"], "E1");

    let err = delete(&reader, "E1").unwrap_err();
    assert_eq!(err.error_code(), "ReadOnly");
    assert!(store.len(PUBLIC) > 0);
}

#[test]
fn execute_accepts_decoded_commands() {
    let (executor, _) = create_executor();
    let map = transient("entryLog", &entry_payload("E1", "F1", "P1"));
    let command =
        Command::from_invocation("setEntryLog", NO_ARGS, &map, executor.config()).unwrap();
    assert!(command.is_mutating());
    executor.execute(command).unwrap();

    let output = executor
        .execute(Command::Read {
            entry_id: "E1".to_string(),
        })
        .unwrap();
    let record: serde_json::Value = serde_json::from_slice(output.payload()).unwrap();
    assert_eq!(record, json!({
        "docType": "entryLog",
        "entryLogID": "E1",
        "facilityID": "F1",
        "year": "1990",
        "sex": "F",
        "entryTime": "2020-03-01T09:00:00Z"
    }));
}
