//! Partition types
//!
//! Entry ids are plain strings; the same id keys both records of an entry.

use serde::{Deserialize, Serialize};

/// Confidentiality tier
///
/// Public records and their index live in one collection, private details
/// and their index in another. Which principals may read each collection
/// is decided by the store, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Collection holding [`crate::EntryLog`] records
    Public,
    /// Collection holding [`crate::EntryLogPrivateDetails`] records
    Sensitive,
}

impl Tier {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Sensitive => "sensitive",
        }
    }
}

impl std::fmt::Display for Tier {
    /// Human-readable record name used in error messages
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Public => f.write_str("entryLog"),
            Tier::Sensitive => f.write_str("entryLog private details"),
        }
    }
}
