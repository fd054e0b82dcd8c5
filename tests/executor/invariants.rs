//! Record Lifecycle Invariants
//!
//! Every mutation leaves the two collections and both indexes consistent:
//! a record exists in both tiers with exactly one entry in each index, or
//! nothing for that id exists at all.

use crate::common::*;
use entrylog_core::{Error, Tier};
use entrylog_executor::TransientMap;
use serde_json::json;

// ============================================================================
// Creation
// ============================================================================

#[test]
fn create_writes_both_tiers_and_both_indexes() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    assert_eq!(index_entries(&store, "E1"), (1, 1));
    assert!(has_facility_entry(&store, "F1", "E1"));
    assert!(has_personal_entry(&store, "P1", "E1"));
    assert_eq!(store.keys(PUBLIC).iter().filter(|k| *k == "E1").count(), 1);
    assert_eq!(store.keys(SENSITIVE).iter().filter(|k| *k == "E1").count(), 1);
}

#[test]
fn duplicate_create_leaves_store_unchanged() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    let before_public = store.keys(PUBLIC);
    let before_sensitive = store.keys(SENSITIVE);

    let err = create(&executor, "E1", "F2", "P2").unwrap_err();
    assert_eq!(err.error_code(), "AlreadyExists");
    assert_eq!(err.to_string(), "This entry log already exists: E1");

    assert_eq!(store.keys(PUBLIC), before_public);
    assert_eq!(store.keys(SENSITIVE), before_sensitive);
    assert_eq!(read(&executor, "read", "E1").unwrap()["facilityID"], "F1");
    assert!(!has_facility_entry(&store, "F2", "E1"));
    assert!(!has_personal_entry(&store, "P2", "E1"));
}

#[test]
fn every_create_field_is_required() {
    let fields = [
        "entryLogID",
        "facilityID",
        "year",
        "sex",
        "entryTime",
        "personalID",
        "name",
        "phone",
        "address",
    ];

    for field in fields {
        let (executor, store) = create_executor();

        let mut payload = entry_payload("E1", "F1", "P1");
        payload.as_object_mut().unwrap().remove(field);
        let err = executor
            .invoke("setEntryLog", NO_ARGS, &transient("entryLog", &payload))
            .unwrap_err();
        assert_eq!(err, Error::missing_field(field), "absent {}", field);

        let mut payload = entry_payload("E1", "F1", "P1");
        payload[field] = json!("");
        let err = executor
            .invoke("setEntryLog", NO_ARGS, &transient("entryLog", &payload))
            .unwrap_err();
        assert_eq!(err, Error::missing_field(field), "empty {}", field);

        assert!(store.is_empty(), "partial write for {}", field);
    }
}

#[test]
fn non_string_field_is_malformed() {
    let (executor, store) = create_executor();
    let mut payload = entry_payload("E1", "F1", "P1");
    payload["year"] = json!(1990);

    let err = executor
        .invoke("setEntryLog", NO_ARGS, &transient("entryLog", &payload))
        .unwrap_err();
    assert_eq!(err.error_code(), "MalformedInput");
    assert!(store.is_empty());
}

#[test]
fn unparseable_payload_is_malformed() {
    let (executor, store) = create_executor();
    let map: TransientMap = [("entryLog", "{not json")].into_iter().collect();
    let err = executor.invoke("setEntryLog", NO_ARGS, &map).unwrap_err();
    assert_eq!(err.error_code(), "MalformedInput");
    assert!(store.is_empty());
}

#[test]
fn null_byte_in_indexed_attribute_writes_nothing() {
    let (executor, store) = create_executor();
    let err = create(&executor, "E1", "F\u{0}1", "P1").unwrap_err();
    assert_eq!(err.error_code(), "InvalidKeyPart");
    assert!(store.is_empty());
}

// ============================================================================
// Address Update
// ============================================================================

#[test]
fn update_address_changes_only_address() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    let public_before = read(&executor, "read", "E1").unwrap();
    let keys_before = store.keys(SENSITIVE);

    update_address(&executor, "E1", "9 Oak Ave").unwrap();

    let details = read(&executor, "readSensitive", "E1").unwrap();
    assert_eq!(details["address"], "9 Oak Ave");
    assert_eq!(details["personalID"], "P1");
    assert_eq!(details["name"], "Ann Lee");
    assert_eq!(details["phone"], "555-0100");
    assert_eq!(read(&executor, "read", "E1").unwrap(), public_before);
    assert_eq!(store.keys(SENSITIVE), keys_before);
}

#[test]
fn update_address_is_idempotent() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    update_address(&executor, "E1", "9 Oak Ave").unwrap();
    let once = read(&executor, "readSensitive", "E1").unwrap();
    update_address(&executor, "E1", "9 Oak Ave").unwrap();
    let twice = read(&executor, "readSensitive", "E1").unwrap();
    assert_eq!(once, twice);
}

#[test]
fn update_address_requires_both_fields() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();

    let map = transient("entryLog_address", &json!({"entryLogID": "E1"}));
    let err = executor.invoke("updateAddress", NO_ARGS, &map).unwrap_err();
    assert_eq!(err, Error::missing_field("address"));

    let map = transient("entryLog_address", &json!({"address": "x"}));
    let err = executor.invoke("updateAddress", NO_ARGS, &map).unwrap_err();
    assert_eq!(err, Error::missing_field("entryLogID"));

    assert_eq!(read(&executor, "readSensitive", "E1").unwrap()["address"], "1 Main St");
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn delete_removes_records_and_index_entries() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    create(&executor, "E2", "F1", "P1").unwrap();

    delete(&executor, "E1").unwrap();

    assert_eq!(index_entries(&store, "E1"), (0, 0));
    assert_eq!(index_entries(&store, "E2"), (1, 1));
    assert!(read(&executor, "read", "E1").unwrap_err().is_not_found());
    assert!(read(&executor, "readSensitive", "E1").unwrap_err().is_not_found());
    assert_eq!(read(&executor, "read", "E2").unwrap()["entryLogID"], "E2");
}

#[test]
fn missing_entry_is_not_found_everywhere() {
    let (executor, store) = create_executor();

    let public_missing = Error::not_found(Tier::Public, "E9");
    assert_eq!(read(&executor, "read", "E9").unwrap_err(), public_missing);
    assert_eq!(delete(&executor, "E9").unwrap_err(), public_missing);
    assert_eq!(
        update_address(&executor, "E9", "x").unwrap_err(),
        Error::not_found(Tier::Sensitive, "E9")
    );
    assert!(store.is_empty());
}

#[test]
fn delete_without_private_details_rolls_back() {
    use entrylog_storage::CollectionStore;

    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    store.delete(SENSITIVE, "E1").unwrap();
    let public_before = store.keys(PUBLIC);

    let err = delete(&executor, "E1").unwrap_err();
    assert_eq!(err, Error::not_found(Tier::Sensitive, "E1"));
    assert_eq!(store.keys(PUBLIC), public_before);
    assert!(has_facility_entry(&store, "F1", "E1"));
}

#[test]
fn entry_can_be_recreated_after_delete() {
    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    delete(&executor, "E1").unwrap();

    create(&executor, "E1", "F2", "P2").unwrap();

    assert_eq!(read(&executor, "read", "E1").unwrap()["facilityID"], "F2");
    assert_eq!(index_entries(&store, "E1"), (1, 1));
    assert!(has_facility_entry(&store, "F2", "E1"));
    assert!(!has_facility_entry(&store, "F1", "E1"));
}

#[test]
fn ids_are_case_sensitive() {
    let (executor, _) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    create(&executor, "e1", "F1", "P1").unwrap();

    assert_eq!(read(&executor, "read", "e1").unwrap()["entryLogID"], "e1");
    assert_eq!(read(&executor, "read", "E1").unwrap()["entryLogID"], "E1");
}

#[test]
fn index_keys_are_never_entry_ids() {
    use entrylog_primitives::{FACILITY_INDEX, PERSONAL_INDEX};

    let (executor, store) = create_executor();
    create(&executor, "E1", "F1", "P1").unwrap();
    let facility_key = FACILITY_INDEX.key_for("F1", "E1").unwrap();
    let personal_key = PERSONAL_INDEX.key_for("P1", "E1").unwrap();
    let public_before = store.keys(PUBLIC);
    let sensitive_before = store.keys(SENSITIVE);

    assert_eq!(
        read(&executor, "getEntryLog", &facility_key).unwrap_err(),
        Error::not_found(Tier::Public, facility_key.as_str())
    );
    assert_eq!(
        read(&executor, "getEntryLogPrivateDetails", &personal_key).unwrap_err(),
        Error::not_found(Tier::Sensitive, personal_key.as_str())
    );
    assert_eq!(
        delete(&executor, &facility_key).unwrap_err(),
        Error::not_found(Tier::Public, facility_key.as_str())
    );
    assert_eq!(
        update_address(&executor, &personal_key, "x").unwrap_err(),
        Error::not_found(Tier::Sensitive, personal_key.as_str())
    );

    assert_eq!(store.keys(PUBLIC), public_before);
    assert_eq!(store.keys(SENSITIVE), sensitive_before);
    assert_eq!(index_entries(&store, "E1"), (1, 1));
}
