//! Storage layer for EntryLog
//!
//! This crate implements the collection store the record layer writes to:
//! - [`CollectionStore`]: put/get/delete/range/query capability, partitioned by collection
//! - [`Cursor`]: scoped iterator over store rows, released on drop
//! - [`MemoryStore`]: DashMap of ordered partitions, with JSON snapshots
//! - [`TxContext`]: staged writes applied all-or-nothing on commit
//! - [`selector`]: document selector queries over JSON values

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod cursor;
pub mod memory;
pub mod selector;
pub mod traits;

pub use context::TxContext;
pub use cursor::{Cursor, CursorRegistry};
pub use memory::MemoryStore;
pub use selector::Query;
pub use traits::{CollectionStore, KeyValue, WriteOp};
