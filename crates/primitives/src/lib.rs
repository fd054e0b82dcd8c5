//! Record primitives for EntryLog
//!
//! - [`input`]: validation of untrusted payloads into typed inputs
//! - [`composite`]: composite key encoding for index entries
//! - [`index`]: the two secondary indexes and their entries
//! - [`lifecycle`]: create/read/update/delete keeping indexes consistent
//! - [`query`]: selector queries, index scans and streamed JSON results
//!
//! ## Write Path
//!
//! ```text
//! payload -> input -> EntryLogStore -> CollectionStore (records)
//!                                   -> composite/index (index entries)
//! ```
//!
//! Queries go through [`QueryExecutor`] and only ever read.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composite;
pub mod index;
pub mod input;
pub mod lifecycle;
pub mod query;

pub use composite::CompositeKey;
pub use index::{Index, IndexEntry, Indexed, FACILITY_INDEX, INDEX_SENTINEL, PERSONAL_INDEX};
pub use input::{AddressUpdateInput, CreateInput, DeleteInput, Payload, TransientMap};
pub use lifecycle::EntryLogStore;
pub use query::{write_json_array, QueryExecutor, QueryRecord, QueryResults};
