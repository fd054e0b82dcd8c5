//! # EntryLog
//!
//! Entry logs split across two collections: a public record per entry and
//! its private details, each reachable through a composite-key secondary
//! index.
//!
//! ## Quick Start
//!
//! ```
//! use entrylog::prelude::*;
//!
//! let ledger = EntryLedger::in_memory();
//! let mut transient = TransientMap::new();
//! transient.insert(
//!     "entryLog",
//!     json!({
//!         "entryLogID": "EntryLog1", "facilityID": "Facility1", "year": "1990",
//!         "sex": "F", "entryTime": "2020-03-01T09:00:00Z", "personalID": "Person1",
//!         "name": "Ann", "phone": "555-0100", "address": "1 Main St"
//!     })
//!     .to_string(),
//! );
//! ledger.executor().invoke("setEntryLog", &[] as &[&str], &transient)?;
//!
//! let hits = ledger.query_by_facility("Facility1")?;
//! assert_eq!(hits[0].key, "EntryLog1");
//! # Ok::<(), entrylog::Error>(())
//! ```
//!
//! ## Layers
//!
//! - `entrylog-core`: errors, configuration, record documents
//! - `entrylog-storage`: the collection store capability and its in-memory backend
//! - `entrylog-primitives`: input validation, indexes, record lifecycle, queries
//! - `entrylog-executor`: commands, the executor and the typed [`EntryLedger`]

#![warn(missing_docs)]

pub mod prelude;

// Re-export main entry points
pub use entrylog_core::{Config, Error, Result};
pub use entrylog_executor::{Command, EntryLedger, Executor, Output};
