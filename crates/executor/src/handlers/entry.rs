//! Record lifecycle handlers: create, read, readSensitive, updateAddress, delete

use std::sync::Arc;

use entrylog_core::{Config, Result, Tier};
use entrylog_primitives::{AddressUpdateInput, CreateInput, EntryLogStore};
use entrylog_storage::CollectionStore;

use crate::Output;

fn logs<S: CollectionStore>(store: S, config: &Arc<Config>) -> EntryLogStore<S> {
    EntryLogStore::new(store, Arc::clone(config))
}

/// Handle Create command.
pub fn create<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    input: CreateInput,
) -> Result<Output> {
    logs(store, config).create(input)?;
    Ok(Output::Unit)
}

/// Handle Read command.
pub fn read<S: CollectionStore>(store: S, config: &Arc<Config>, entry_id: &str) -> Result<Output> {
    let bytes = logs(store, config).read(entry_id, Tier::Public)?;
    Ok(Output::Record(bytes))
}

/// Handle ReadSensitive command.
pub fn read_sensitive<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    entry_id: &str,
) -> Result<Output> {
    let bytes = logs(store, config).read(entry_id, Tier::Sensitive)?;
    Ok(Output::Record(bytes))
}

/// Handle UpdateAddress command.
pub fn update_address<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    input: AddressUpdateInput,
) -> Result<Output> {
    logs(store, config).update_address(input)?;
    Ok(Output::Unit)
}

/// Handle Delete command.
pub fn delete<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    entry_id: &str,
) -> Result<Output> {
    logs(store, config).delete(entry_id)?;
    Ok(Output::Unit)
}
