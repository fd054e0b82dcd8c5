//! Queries
//!
//! Two ways to find records, both producing [`QueryResults`]: a lazy,
//! non-restartable sequence of `{Key, Record}` pairs.
//!
//! - **Selector query**: a JSON selector document handed to the store's
//!   document engine, scoped to one collection. Rows come back as the
//!   store returns them.
//! - **Index scan**: a range scan over one index's composite keys sharing a
//!   prefix. Each key is decoded to recover its entry id, then the record is
//!   fetched with a point lookup in the same collection. `Key` is the entry
//!   id, not the composite key.
//!
//! [`write_json_array`] serializes results incrementally as a JSON array
//! without buffering the sequence.
//!
//! ```text
//! [{"Key":"EntryLog1","Record":{...}},{"Key":"EntryLog2","Record":{...}}]
//! ```

use std::io;
use std::sync::Arc;

use entrylog_core::{
    Config, Error, Result, Tier, ENTRY_LOG_DOC_TYPE, PRIVATE_DETAILS_DOC_TYPE,
};
use entrylog_storage::{CollectionStore, Cursor};
use serde::de::DeserializeOwned;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::json;
use tracing::{debug, warn};

use crate::index::{Index, FACILITY_INDEX, PERSONAL_INDEX};

/// One query hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Entry id (or store key for selector hits)
    #[serde(rename = "Key")]
    pub key: String,
    /// Stored record, embedded as JSON
    #[serde(rename = "Record")]
    pub record: Box<RawValue>,
}

impl QueryRecord {
    /// Build from a stored value, which must be a JSON document
    pub fn from_stored(key: impl Into<String>, value: Vec<u8>) -> Result<Self> {
        let key = key.into();
        let text = String::from_utf8(value)
            .map_err(|_| Error::store(format!("record {} is not UTF-8", key)))?;
        let record = RawValue::from_string(text)
            .map_err(|e| Error::store(format!("record {} is not JSON: {}", key, e)))?;
        Ok(Self { key, record })
    }

    /// Record JSON text
    pub fn record_json(&self) -> &str {
        self.record.get()
    }

    /// Decode the record into a typed value
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(self.record.get()).map_err(|e| {
            Error::store(format!("failed to decode record {}: {}", self.key, e))
        })
    }
}

impl PartialEq for QueryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.record.get() == other.record.get()
    }
}

struct IndexLookup<'a> {
    index: Index,
    store: &'a dyn CollectionStore,
    collection: &'a str,
}

/// Lazy result sequence over an open store cursor
///
/// Dropping the sequence, exhausted or not, releases the cursor.
pub struct QueryResults<'a> {
    cursor: Cursor,
    lookup: Option<IndexLookup<'a>>,
}

impl<'a> QueryResults<'a> {
    fn selector(cursor: Cursor) -> Self {
        Self {
            cursor,
            lookup: None,
        }
    }

    fn index_scan(
        cursor: Cursor,
        index: Index,
        store: &'a dyn CollectionStore,
        collection: &'a str,
    ) -> Self {
        Self {
            cursor,
            lookup: Some(IndexLookup {
                index,
                store,
                collection,
            }),
        }
    }

    /// Drain into a vector, stopping at the first error
    pub fn into_vec(self) -> Result<Vec<QueryRecord>> {
        self.collect()
    }
}

impl Iterator for QueryResults<'_> {
    type Item = Result<QueryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.cursor.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            let Some(lookup) = &self.lookup else {
                return Some(QueryRecord::from_stored(row.key, row.value));
            };

            let entry = match lookup.index.parse(&row.key) {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            match lookup.store.get(lookup.collection, &entry.entry_id) {
                Ok(Some(value)) => return Some(QueryRecord::from_stored(entry.entry_id, value)),
                Ok(None) => {
                    warn!(
                        "Skipping dangling {} entry for {}",
                        lookup.index, entry.entry_id
                    );
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl std::fmt::Debug for QueryResults<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResults")
            .field("index", &self.lookup.as_ref().map(|l| l.index.name))
            .finish_non_exhaustive()
    }
}

/// Write `records` to `writer` as one JSON array
///
/// Elements are serialized as they are pulled. Returns the number written;
/// on error the output is truncated and must be discarded.
pub fn write_json_array<W, I>(writer: W, records: I) -> Result<usize>
where
    W: io::Write,
    I: IntoIterator<Item = Result<QueryRecord>>,
{
    let mut serializer = serde_json::Serializer::new(writer);
    let mut seq = serializer.serialize_seq(None).map_err(Error::store)?;
    let mut count = 0;
    for record in records {
        seq.serialize_element(&record?).map_err(Error::store)?;
        count += 1;
    }
    seq.end().map_err(Error::store)?;
    Ok(count)
}

/// Read-only query entry point over a collection store
pub struct QueryExecutor<S> {
    store: S,
    config: Arc<Config>,
}

impl<S: CollectionStore> QueryExecutor<S> {
    /// Wrap `store`, using the collections named in `config`
    pub fn new(store: S, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    /// Run a selector document against one tier's collection
    pub fn by_selector(&self, tier: Tier, query: &str) -> Result<QueryResults<'_>> {
        if query.trim().is_empty() {
            return Err(Error::missing_field("query"));
        }
        let collection = self.config.collection(tier);
        debug!("Selector query on {}", collection);
        Ok(QueryResults::selector(self.store.query(collection, query)?))
    }

    /// Public records logged at `facility_id`
    pub fn by_facility(&self, facility_id: &str) -> Result<QueryResults<'_>> {
        if facility_id.is_empty() {
            return Err(Error::missing_field("facilityID"));
        }
        let query = json!({
            "selector": {"docType": ENTRY_LOG_DOC_TYPE, "facilityID": facility_id}
        });
        self.by_selector(Tier::Public, &query.to_string())
    }

    /// Private details of `personal_id`
    pub fn by_personal(&self, personal_id: &str) -> Result<QueryResults<'_>> {
        if personal_id.is_empty() {
            return Err(Error::missing_field("personalID"));
        }
        let query = json!({
            "selector": {"docType": PRIVATE_DETAILS_DOC_TYPE, "personalID": personal_id}
        });
        self.by_selector(Tier::Sensitive, &query.to_string())
    }

    /// Caller-supplied selector over the public collection
    pub fn raw(&self, query: &str) -> Result<QueryResults<'_>> {
        self.by_selector(Tier::Public, query)
    }

    /// Every record whose `index` entry starts with `prefix`
    pub fn scan_index(&self, index: Index, prefix: &[&str]) -> Result<QueryResults<'_>> {
        let (start, end) = index.scan_range(prefix)?;
        let collection = self.config.collection(index.tier);
        debug!("Scanning {} in {}", index, collection);
        let cursor = self.store.range(collection, &start, &end)?;
        Ok(QueryResults::index_scan(cursor, index, &self.store, collection))
    }

    /// Public records at `facility_id`, via the facility index
    pub fn list_by_facility(&self, facility_id: &str) -> Result<QueryResults<'_>> {
        if facility_id.is_empty() {
            return Err(Error::missing_field("facilityID"));
        }
        self.scan_index(FACILITY_INDEX, &[facility_id])
    }

    /// Private details of `personal_id`, via the personal index
    pub fn list_by_personal(&self, personal_id: &str) -> Result<QueryResults<'_>> {
        if personal_id.is_empty() {
            return Err(Error::missing_field("personalID"));
        }
        self.scan_index(PERSONAL_INDEX, &[personal_id])
    }
}
