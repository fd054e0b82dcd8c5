//! Scoped store cursors
//!
//! A [`Cursor`] is a lease on a store-side iterator. The lease is taken when
//! the store opens the cursor and released when the cursor is dropped, so
//! every exit path (exhaustion, early break, `?` on an error row) closes it.
//! [`CursorRegistry::open_count`] exposes the number of live leases.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use entrylog_core::Result;

use crate::traits::KeyValue;

type Rows = Box<dyn Iterator<Item = Result<KeyValue>> + Send>;

/// Tracks cursors opened by one store
#[derive(Debug, Clone, Default)]
pub struct CursorRegistry {
    open: Arc<AtomicUsize>,
}

impl CursorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cursor over `rows`, registering it until dropped
    pub fn open<I>(&self, rows: I) -> Cursor
    where
        I: IntoIterator<Item = Result<KeyValue>>,
        I::IntoIter: Send + 'static,
    {
        self.open.fetch_add(1, Ordering::AcqRel);
        Cursor {
            rows: Box::new(rows.into_iter()),
            lease: Lease {
                open: Arc::clone(&self.open),
            },
        }
    }

    /// Number of cursors not yet dropped
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::Acquire)
    }
}

struct Lease {
    open: Arc<AtomicUsize>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Finite, non-restartable sequence of store rows
pub struct Cursor {
    rows: Rows,
    lease: Lease,
}

impl Cursor {
    /// Close the cursor before it is exhausted
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for Cursor {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("open_cursors", &self.lease.open.load(Ordering::Relaxed))
            .finish()
    }
}
