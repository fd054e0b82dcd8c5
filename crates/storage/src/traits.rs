//! The collection store capability
//!
//! Everything above this crate talks to storage through [`CollectionStore`].
//! Keys are addressed by `(collection, key)`; the same key string in two
//! collections names two unrelated entries.

use entrylog_core::{Error, Result};

use crate::cursor::Cursor;

/// One row produced by a range scan or selector query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Store key (plain entry id or composite index key)
    pub key: String,
    /// Stored bytes
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Create a row
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A single staged mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite
    Put {
        /// Target collection
        collection: String,
        /// Key to write
        key: String,
        /// Value to store
        value: Vec<u8>,
    },
    /// Remove a key (no-op if absent)
    Delete {
        /// Target collection
        collection: String,
        /// Key to remove
        key: String,
    },
}

/// Key-value store partitioned into named collections
///
/// ## Contract
///
/// - `get` returns `Ok(None)` for a missing key; `Err` only for store failures
/// - `range` yields keys in `[start, end)` in ascending byte order; an empty
///   `end` means unbounded
/// - every [`Cursor`] returned must be dropped to release it
/// - `query` is optional; stores without a document engine keep the default,
///   which fails with `StoreFailure`
pub trait CollectionStore {
    /// Read a value
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value
    fn put(&self, collection: &str, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a key
    fn delete(&self, collection: &str, key: &str) -> Result<()>;

    /// Iterate keys in `[start, end)`
    fn range(&self, collection: &str, start: &str, end: &str) -> Result<Cursor>;

    /// Run a document selector query against one collection
    fn query(&self, collection: &str, query: &str) -> Result<Cursor> {
        let _ = query;
        Err(Error::store(format!(
            "selector queries are not supported for collection {}",
            collection
        )))
    }

    /// Apply a batch of writes in order
    ///
    /// The default applies ops one by one and stops at the first failure,
    /// leaving earlier ops applied. Stores that can do better override it.
    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        for op in ops {
            match op {
                WriteOp::Put {
                    collection,
                    key,
                    value,
                } => self.put(&collection, &key, value)?,
                WriteOp::Delete { collection, key } => self.delete(&collection, &key)?,
            }
        }
        Ok(())
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for &S {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(collection, key)
    }

    fn put(&self, collection: &str, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(collection, key, value)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<()> {
        (**self).delete(collection, key)
    }

    fn range(&self, collection: &str, start: &str, end: &str) -> Result<Cursor> {
        (**self).range(collection, start, end)
    }

    fn query(&self, collection: &str, query: &str) -> Result<Cursor> {
        (**self).query(collection, query)
    }

    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        (**self).apply_batch(ops)
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for std::sync::Arc<S> {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(collection, key)
    }

    fn put(&self, collection: &str, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(collection, key, value)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<()> {
        (**self).delete(collection, key)
    }

    fn range(&self, collection: &str, start: &str, end: &str) -> Result<Cursor> {
        (**self).range(collection, start, end)
    }

    fn query(&self, collection: &str, query: &str) -> Result<Cursor> {
        (**self).query(collection, query)
    }

    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        (**self).apply_batch(ops)
    }
}
