//! High-level typed wrapper for the Executor.
//!
//! [`EntryLedger`] wraps the [`Executor`] and the [`Command`]/[`Output`]
//! enums with one typed method per operation. Each method:
//!
//! 1. Creates the appropriate [`Command`]
//! 2. Executes it via the [`Executor`]
//! 3. Extracts and returns the typed result
//!
//! # Example
//!
//! ```
//! use entrylog_executor::EntryLedger;
//! use entrylog_primitives::CreateInput;
//!
//! let ledger = EntryLedger::in_memory();
//! ledger.create(CreateInput {
//!     entry_id: "EntryLog1".into(),
//!     facility_id: "Facility1".into(),
//!     year: "1990".into(),
//!     sex: "F".into(),
//!     entry_time: "2020-03-01T09:00:00Z".into(),
//!     personal_id: "Person1".into(),
//!     name: "Ann".into(),
//!     phone: "555-0100".into(),
//!     address: "1 Main St".into(),
//! })?;
//!
//! let hits = ledger.list_by_facility_index("Facility1")?;
//! assert_eq!(hits[0].key, "EntryLog1");
//! # Ok::<(), entrylog_core::Error>(())
//! ```

use entrylog_core::{EntryLog, EntryLogPrivateDetails, Error, Result};
use entrylog_primitives::{AddressUpdateInput, CreateInput, DeleteInput, QueryRecord};
use serde_json::Value;

use crate::{Command, Executor, Output};

/// Typed API over an [`Executor`]
#[derive(Debug)]
pub struct EntryLedger {
    executor: Executor,
}

impl EntryLedger {
    /// Wrap an executor
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Ledger over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Executor::in_memory())
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    // =========================================================================
    // Record Lifecycle
    // =========================================================================

    /// Create an entry log and its private details.
    pub fn create(&self, input: CreateInput) -> Result<()> {
        match self.executor.execute(Command::Create(input))? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("create")),
        }
    }

    /// Public record of `entry_id`.
    pub fn read(&self, entry_id: &str) -> Result<EntryLog> {
        match self.executor.execute(Command::Read {
            entry_id: entry_id.to_string(),
        })? {
            Output::Record(bytes) => EntryLog::from_bytes(&bytes),
            _ => Err(unexpected("read")),
        }
    }

    /// Private details of `entry_id`.
    pub fn read_sensitive(&self, entry_id: &str) -> Result<EntryLogPrivateDetails> {
        match self.executor.execute(Command::ReadSensitive {
            entry_id: entry_id.to_string(),
        })? {
            Output::Record(bytes) => EntryLogPrivateDetails::from_bytes(&bytes),
            _ => Err(unexpected("readSensitive")),
        }
    }

    /// Public record and private details merged into one JSON object.
    ///
    /// Carries every public field plus `personalID`, `name`, `phone` and
    /// `address`. Fails with `NotFound` if either record is missing.
    pub fn read_full(&self, entry_id: &str) -> Result<Value> {
        let public = self.read(entry_id)?;
        let details = self.read_sensitive(entry_id)?;

        let mut merged = match serde_json::to_value(&public).map_err(Error::store)? {
            Value::Object(map) => map,
            _ => return Err(unexpected("read")),
        };
        merged.insert("personalID".into(), Value::String(details.personal_id));
        merged.insert("name".into(), Value::String(details.name));
        merged.insert("phone".into(), Value::String(details.phone));
        merged.insert("address".into(), Value::String(details.address));
        Ok(Value::Object(merged))
    }

    /// Replace the address of `entry_id`.
    pub fn update_address(&self, entry_id: &str, address: &str) -> Result<()> {
        match self.executor.execute(Command::UpdateAddress(AddressUpdateInput {
            entry_id: entry_id.to_string(),
            address: address.to_string(),
        }))? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("updateAddress")),
        }
    }

    /// Delete `entry_id` from both collections.
    pub fn delete(&self, entry_id: &str) -> Result<()> {
        match self.executor.execute(Command::Delete(DeleteInput {
            entry_id: entry_id.to_string(),
        }))? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("delete")),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Selector query for public records at `facility_id`.
    pub fn query_by_facility(&self, facility_id: &str) -> Result<Vec<QueryRecord>> {
        self.records(Command::QueryByFacility {
            facility_id: facility_id.to_string(),
        })
    }

    /// Selector query for private details of `personal_id`.
    pub fn query_by_personal(&self, personal_id: &str) -> Result<Vec<QueryRecord>> {
        self.records(Command::QueryByPersonal {
            personal_id: personal_id.to_string(),
        })
    }

    /// Caller-supplied selector over the public collection.
    pub fn query_raw(&self, query: &str) -> Result<Vec<QueryRecord>> {
        self.records(Command::QueryRaw {
            query: query.to_string(),
        })
    }

    /// Facility index scan.
    pub fn list_by_facility_index(&self, facility_id: &str) -> Result<Vec<QueryRecord>> {
        self.records(Command::ListByFacilityIndex {
            facility_id: facility_id.to_string(),
        })
    }

    /// Personal index scan.
    pub fn list_by_personal_index(&self, personal_id: &str) -> Result<Vec<QueryRecord>> {
        self.records(Command::ListByPersonalIndex {
            personal_id: personal_id.to_string(),
        })
    }

    fn records(&self, command: Command) -> Result<Vec<QueryRecord>> {
        let name = command.name();
        match self.executor.execute(command)? {
            out @ Output::Records { .. } => out.records(),
            _ => Err(unexpected(name)),
        }
    }
}

fn unexpected(operation: &str) -> Error {
    Error::Internal {
        reason: format!("Unexpected output for {}", operation),
    }
}
