//! Error types for EntryLog
//!
//! Every failure surfaced to a caller is one of the kinds below. Errors are
//! never recovered locally: the lifecycle and query layers propagate them
//! verbatim and the executor turns them into a structured [`WireError`].
//!
//! ## Wire Format
//!
//! ```json
//! {
//!   "code": "NotFound",
//!   "message": "entryLog does not exist: EntryLog4",
//!   "details": {"entryLogID": "EntryLog4", "tier": "public"}
//! }
//! ```
//!
//! ## Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | MissingField | Required input field absent or empty |
//! | MalformedInput | Payload not decodable as the expected shape |
//! | AlreadyExists | Record with this entry id already exists |
//! | NotFound | Record with this entry id does not exist |
//! | InvalidKeyPart | Composite key part is empty or contains a reserved byte |
//! | StoreFailure | Underlying store I/O or decode failure |
//! | UnknownOperation | Invocation named an operation that does not exist |
//! | ReadOnly | Mutation attempted on a read-only store |
//! | Internal | Command produced an output of the wrong shape |

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Tier;

/// All EntryLog errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A declared input field is missing or empty
    #[error("{field} field must be a non-empty string")]
    MissingField {
        /// Name of the offending field (or transient key)
        field: String,
    },

    /// Input could not be decoded as the expected shape
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the payload
        reason: String,
    },

    /// Creation attempted for an entry id that is live
    #[error("This entry log already exists: {entry_id}")]
    AlreadyExists {
        /// The duplicate entry id
        entry_id: String,
    },

    /// No record for this entry id in the requested tier
    #[error("{tier} does not exist: {entry_id}")]
    NotFound {
        /// Tier that was searched
        tier: Tier,
        /// The missing entry id
        entry_id: String,
    },

    /// A composite key part cannot be encoded
    #[error("invalid composite key part {part:?}: {reason}")]
    InvalidKeyPart {
        /// The rejected part
        part: String,
        /// Why it was rejected
        reason: String,
    },

    /// Underlying store failure (I/O, unsupported capability, corrupt value)
    #[error("store failure: {message}")]
    StoreFailure {
        /// Error message from the store
        message: String,
    },

    /// Invocation of an operation that does not exist
    #[error("Received unknown function invocation: {name}")]
    UnknownOperation {
        /// The function name that was requested
        name: String,
    },

    /// Mutation attempted while the store is opened read-only
    #[error("store is read-only, cannot execute {operation}")]
    ReadOnly {
        /// The rejected operation
        operation: String,
    },

    /// Internal error (bug or unexpected state)
    #[error("internal error: {reason}")]
    Internal {
        /// Error reason
        reason: String,
    },
}

/// Result type for EntryLog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::MissingField`].
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
        }
    }

    /// Shorthand for [`Error::MalformedInput`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::StoreFailure`].
    pub fn store(message: impl std::fmt::Display) -> Self {
        Error::StoreFailure {
            message: message.to_string(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(tier: Tier, entry_id: impl Into<String>) -> Self {
        Error::NotFound {
            tier,
            entry_id: entry_id.into(),
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error originated in the store rather than the caller's input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::StoreFailure { .. })
    }

    /// Get the canonical error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingField { .. } => "MissingField",
            Error::MalformedInput { .. } => "MalformedInput",
            Error::AlreadyExists { .. } => "AlreadyExists",
            Error::NotFound { .. } => "NotFound",
            Error::InvalidKeyPart { .. } => "InvalidKeyPart",
            Error::StoreFailure { .. } => "StoreFailure",
            Error::UnknownOperation { .. } => "UnknownOperation",
            Error::ReadOnly { .. } => "ReadOnly",
            Error::Internal { .. } => "Internal",
        }
    }

    /// Convert to wire error format
    pub fn to_wire_error(&self) -> WireError {
        WireError {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<Value> {
        let mut map = Map::new();
        match self {
            Error::MissingField { field } => {
                map.insert("field".into(), Value::String(field.clone()));
            }
            Error::MalformedInput { reason } => {
                map.insert("reason".into(), Value::String(reason.clone()));
            }
            Error::AlreadyExists { entry_id } => {
                map.insert("entryLogID".into(), Value::String(entry_id.clone()));
            }
            Error::NotFound { tier, entry_id } => {
                map.insert("entryLogID".into(), Value::String(entry_id.clone()));
                map.insert("tier".into(), Value::String(tier.as_str().to_string()));
            }
            Error::InvalidKeyPart { part, reason } => {
                map.insert("part".into(), Value::String(part.clone()));
                map.insert("reason".into(), Value::String(reason.clone()));
            }
            // store internals stay out of the wire body
            Error::StoreFailure { .. } | Error::Internal { .. } => return None,
            Error::UnknownOperation { name } => {
                map.insert("function".into(), Value::String(name.clone()));
            }
            Error::ReadOnly { operation } => {
                map.insert("operation".into(), Value::String(operation.clone()));
            }
        }
        Some(Value::Object(map))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::store(e)
    }
}

/// Wire error representation for JSON encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireError {
    /// The canonical error code (e.g., "NotFound", "MissingField")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details
    pub details: Option<Value>,
}
