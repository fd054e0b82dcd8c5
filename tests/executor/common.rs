//! Shared helpers for executor tests.

#![allow(dead_code)]

use std::sync::Arc;

use entrylog_core::Config;
use entrylog_executor::{Executor, Output, Result, TransientMap};
use entrylog_primitives::{FACILITY_INDEX, PERSONAL_INDEX};
use entrylog_storage::{CollectionStore, MemoryStore};
use serde_json::{json, Value};

pub const PUBLIC: &str = "collectionEntryLog";
pub const SENSITIVE: &str = "collectionEntryLogPrivateDetails";

pub const NO_ARGS: &[&str] = &[];

/// Executor over a fresh in-memory store, plus a handle on the store.
pub fn create_executor() -> (Executor, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let executor = Executor::new(store.clone(), Config::default()).unwrap();
    (executor, store)
}

/// A complete create payload.
pub fn entry_payload(id: &str, facility: &str, personal: &str) -> Value {
    json!({
        "entryLogID": id,
        "facilityID": facility,
        "year": "1990",
        "sex": "F",
        "entryTime": "2020-03-01T09:00:00Z",
        "personalID": personal,
        "name": "Ann Lee",
        "phone": "555-0100",
        "address": "1 Main St"
    })
}

pub fn transient(key: &str, payload: &Value) -> TransientMap {
    [(key, payload.to_string())].into_iter().collect()
}

pub fn create(executor: &Executor, id: &str, facility: &str, personal: &str) -> Result<Output> {
    let map = transient("entryLog", &entry_payload(id, facility, personal));
    executor.invoke("setEntryLog", NO_ARGS, &map)
}

pub fn update_address(executor: &Executor, id: &str, address: &str) -> Result<Output> {
    let map = transient(
        "entryLog_address",
        &json!({"entryLogID": id, "address": address}),
    );
    executor.invoke("updateAddress", NO_ARGS, &map)
}

pub fn delete(executor: &Executor, id: &str) -> Result<Output> {
    let map = transient("entryLog_delete", &json!({"entryLogID": id}));
    executor.invoke("delete", NO_ARGS, &map)
}

pub fn read(executor: &Executor, function: &str, id: &str) -> Result<Value> {
    let out = executor.invoke(function, &[id], &TransientMap::new())?;
    Ok(serde_json::from_slice(out.payload()).unwrap())
}

/// Keys of a query result, sorted.
pub fn result_keys(output: &Output) -> Vec<String> {
    let mut keys: Vec<String> = output
        .records()
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    keys.sort();
    keys
}

/// Number of index entries of `entry_id` in both indexes.
pub fn index_entries(store: &MemoryStore, entry_id: &str) -> (usize, usize) {
    let suffix = format!("\u{0}{}\u{0}", entry_id);
    let count = |collection: &str, name: &str| {
        store
            .keys(collection)
            .iter()
            .filter(|k| k.starts_with(&format!("\u{0}{}\u{0}", name)) && k.ends_with(&suffix))
            .count()
    };
    (
        count(PUBLIC, FACILITY_INDEX.name),
        count(SENSITIVE, PERSONAL_INDEX.name),
    )
}

/// Whether the exact index entry is present.
pub fn has_facility_entry(store: &MemoryStore, facility: &str, id: &str) -> bool {
    let key = FACILITY_INDEX.key_for(facility, id).unwrap();
    store.get(PUBLIC, &key).unwrap().is_some()
}

pub fn has_personal_entry(store: &MemoryStore, personal: &str, id: &str) -> bool {
    let key = PERSONAL_INDEX.key_for(personal, id).unwrap();
    store.get(SENSITIVE, &key).unwrap().is_some()
}
