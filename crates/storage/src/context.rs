//! Per-invocation execution context
//!
//! A [`TxContext`] wraps a committed store for the duration of one command.
//! Writes and deletes are staged in order and reach the store only through
//! [`TxContext::commit`], which hands them to
//! [`CollectionStore::apply_batch`] in one call. Dropping the context
//! without committing discards them.
//!
//! Reads (`get`, `range`, `query`) observe committed state only; a value put
//! earlier in the same context is not visible to a later `get`. This matches
//! the ledger runtime, where a transaction's writes become visible when the
//! block commits.

use entrylog_core::Result;
use parking_lot::Mutex;
use tracing::debug;

use crate::cursor::Cursor;
use crate::traits::{CollectionStore, WriteOp};

/// Staged write set over a committed store
pub struct TxContext<S: CollectionStore> {
    store: S,
    writes: Mutex<Vec<WriteOp>>,
}

impl<S: CollectionStore> TxContext<S> {
    /// Begin a context over `store`
    pub fn new(store: S) -> Self {
        Self {
            store,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Number of staged ops
    pub fn pending(&self) -> usize {
        self.writes.lock().len()
    }

    /// Snapshot of staged ops, in staging order
    pub fn staged(&self) -> Vec<WriteOp> {
        self.writes.lock().clone()
    }

    /// Apply every staged op to the store
    ///
    /// Returns the number of ops applied.
    pub fn commit(self) -> Result<usize> {
        let ops = self.writes.into_inner();
        let count = ops.len();
        if count > 0 {
            self.store.apply_batch(ops)?;
        }
        debug!("Committed {} staged writes", count);
        Ok(count)
    }

    /// Drop every staged op
    pub fn discard(self) {
        debug!("Discarded {} staged writes", self.writes.lock().len());
    }
}

impl<S: CollectionStore> CollectionStore for TxContext<S> {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(collection, key)
    }

    fn put(&self, collection: &str, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.lock().push(WriteOp::Put {
            collection: collection.to_string(),
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<()> {
        self.writes.lock().push(WriteOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn range(&self, collection: &str, start: &str, end: &str) -> Result<Cursor> {
        self.store.range(collection, start, end)
    }

    fn query(&self, collection: &str, query: &str) -> Result<Cursor> {
        self.store.query(collection, query)
    }
}
