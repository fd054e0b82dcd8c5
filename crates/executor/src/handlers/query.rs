//! Query handlers
//!
//! Results are encoded straight from the open cursor into the output
//! buffer; the cursor is released before the handler returns.

use std::sync::Arc;

use entrylog_core::{Config, Result};
use entrylog_primitives::{write_json_array, QueryExecutor, QueryResults};
use entrylog_storage::CollectionStore;
use tracing::debug;

use crate::Output;

fn encode(operation: &str, results: QueryResults<'_>) -> Result<Output> {
    let mut json = Vec::new();
    let count = write_json_array(&mut json, results)?;
    debug!("{} returned {} records", operation, count);
    Ok(Output::Records { count, json })
}

/// Handle QueryByFacility command.
pub fn by_facility<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    facility_id: &str,
) -> Result<Output> {
    let queries = QueryExecutor::new(store, Arc::clone(config));
    let results = queries.by_facility(facility_id)?;
    encode("queryByFacility", results)
}

/// Handle QueryByPersonal command.
pub fn by_personal<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    personal_id: &str,
) -> Result<Output> {
    let queries = QueryExecutor::new(store, Arc::clone(config));
    let results = queries.by_personal(personal_id)?;
    encode("queryByPersonal", results)
}

/// Handle QueryRaw command.
pub fn raw<S: CollectionStore>(store: S, config: &Arc<Config>, query: &str) -> Result<Output> {
    let queries = QueryExecutor::new(store, Arc::clone(config));
    let results = queries.raw(query)?;
    encode("queryRaw", results)
}

/// Handle ListByFacilityIndex command.
pub fn list_by_facility<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    facility_id: &str,
) -> Result<Output> {
    let queries = QueryExecutor::new(store, Arc::clone(config));
    let results = queries.list_by_facility(facility_id)?;
    encode("listByFacilityIndex", results)
}

/// Handle ListByPersonalIndex command.
pub fn list_by_personal<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    personal_id: &str,
) -> Result<Output> {
    let queries = QueryExecutor::new(store, Arc::clone(config));
    let results = queries.list_by_personal(personal_id)?;
    encode("listByPersonalIndex", results)
}
