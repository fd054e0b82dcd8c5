//! Convenient imports for EntryLog.
//!
//! ```
//! use entrylog::prelude::*;
//!
//! let ledger = EntryLedger::in_memory();
//! assert!(ledger.read("EntryLog1").unwrap_err().is_not_found());
//! ```

// Main entry points
pub use entrylog_executor::{Command, EntryLedger, Executor, Output, TransientMap};

// Error handling
pub use entrylog_core::{Error, Result};

// Configuration
pub use entrylog_core::{AccessMode, Config, TransientKeys};

// Records
pub use entrylog_core::{EntryLog, EntryLogPrivateDetails, Tier};
pub use entrylog_primitives::{CreateInput, QueryRecord};

// Storage
pub use entrylog_storage::{CollectionStore, MemoryStore};

// Re-export serde_json for convenience
pub use serde_json::json;
