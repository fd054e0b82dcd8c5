//! Command handlers
//!
//! One function per command. Handlers run against the per-invocation
//! context handed to them by the executor and never commit themselves.

mod entry;
mod query;

use std::sync::Arc;

use entrylog_core::{Config, Result};
use entrylog_storage::CollectionStore;

use crate::{Command, Output};

/// Route `command` to its handler
pub(crate) fn dispatch<S: CollectionStore>(
    store: S,
    config: &Arc<Config>,
    command: Command,
) -> Result<Output> {
    match command {
        Command::Create(input) => entry::create(store, config, input),
        Command::Read { entry_id } => entry::read(store, config, &entry_id),
        Command::ReadSensitive { entry_id } => entry::read_sensitive(store, config, &entry_id),
        Command::UpdateAddress(input) => entry::update_address(store, config, input),
        Command::Delete(input) => entry::delete(store, config, &input.entry_id),
        Command::QueryByFacility { facility_id } => {
            query::by_facility(store, config, &facility_id)
        }
        Command::QueryByPersonal { personal_id } => {
            query::by_personal(store, config, &personal_id)
        }
        Command::QueryRaw { query } => query::raw(store, config, &query),
        Command::ListByFacilityIndex { facility_id } => {
            query::list_by_facility(store, config, &facility_id)
        }
        Command::ListByPersonalIndex { personal_id } => {
            query::list_by_personal(store, config, &personal_id)
        }
    }
}
