//! Output enum
//!
//! What a successful command returns. Outputs own their data: query results
//! are encoded while the store cursor is open and returned as bytes, so no
//! cursor outlives the command that opened it.

use entrylog_core::{Error, Result};
use entrylog_primitives::QueryRecord;

/// Result of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Mutation applied, nothing to return
    Unit,
    /// Stored JSON of one record
    Record(Vec<u8>),
    /// JSON array of `{"Key","Record"}` objects
    Records {
        /// Number of array elements
        count: usize,
        /// Encoded array
        json: Vec<u8>,
    },
}

impl Output {
    /// Response payload bytes
    ///
    /// `Unit` has an empty payload.
    pub fn payload(&self) -> &[u8] {
        match self {
            Output::Unit => &[],
            Output::Record(bytes) => bytes,
            Output::Records { json, .. } => json,
        }
    }

    /// Consume into response payload bytes
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            Output::Unit => Vec::new(),
            Output::Record(bytes) => bytes,
            Output::Records { json, .. } => json,
        }
    }

    /// Decode `Records` back into individual hits
    pub fn records(&self) -> Result<Vec<QueryRecord>> {
        match self {
            Output::Records { json, .. } => serde_json::from_slice(json)
                .map_err(|e| Error::store(format!("failed to decode query results: {}", e))),
            other => Err(Error::Internal {
                reason: format!("expected query results, got {}", other.kind()),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Output::Unit => "unit",
            Output::Record(_) => "record",
            Output::Records { .. } => "records",
        }
    }
}
