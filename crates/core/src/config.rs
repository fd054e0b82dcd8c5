//! Store configuration
//!
//! [`Config`] names the two collections, the transient-map keys each
//! mutating operation reads its payload from, and whether writes are
//! permitted at all.
//!
//! ```
//! use entrylog_core::{AccessMode, Config};
//!
//! let config = Config::new()
//!     .public_collection("entries")
//!     .access_mode(AccessMode::ReadOnly);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Tier;

/// Default name of the public collection
pub const DEFAULT_PUBLIC_COLLECTION: &str = "collectionEntryLog";

/// Default name of the sensitive collection
pub const DEFAULT_SENSITIVE_COLLECTION: &str = "collectionEntryLogPrivateDetails";

/// Controls whether the store allows writes or is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Reads and writes
    #[default]
    ReadWrite,
    /// Mutating commands fail with [`Error::ReadOnly`]
    ReadOnly,
}

/// Transient-map keys carrying each mutating operation's payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransientKeys {
    /// Key holding the create payload
    pub create: String,
    /// Key holding the address-update payload
    pub update_address: String,
    /// Key holding the delete payload
    pub delete: String,
}

impl Default for TransientKeys {
    fn default() -> Self {
        Self {
            create: "entryLog".to_string(),
            update_address: "entryLog_address".to_string(),
            delete: "entryLog_delete".to_string(),
        }
    }
}

/// Options for opening an entry log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collection for public records and the facility index
    pub public_collection: String,
    /// Collection for private details and the personal index
    pub sensitive_collection: String,
    /// Transient payload keys
    pub transient: TransientKeys,
    /// Read/write permission
    pub access_mode: AccessMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_collection: DEFAULT_PUBLIC_COLLECTION.to_string(),
            sensitive_collection: DEFAULT_SENSITIVE_COLLECTION.to_string(),
            transient: TransientKeys::default(),
            access_mode: AccessMode::ReadWrite,
        }
    }
}

impl Config {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the public collection name
    pub fn public_collection(mut self, name: impl Into<String>) -> Self {
        self.public_collection = name.into();
        self
    }

    /// Set the sensitive collection name
    pub fn sensitive_collection(mut self, name: impl Into<String>) -> Self {
        self.sensitive_collection = name.into();
        self
    }

    /// Set the transient payload keys
    pub fn transient_keys(mut self, keys: TransientKeys) -> Self {
        self.transient = keys;
        self
    }

    /// Set the access mode
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Whether mutating commands are permitted
    pub fn is_read_only(&self) -> bool {
        self.access_mode == AccessMode::ReadOnly
    }

    /// Collection name backing a tier
    pub fn collection(&self, tier: Tier) -> &str {
        match tier {
            Tier::Public => &self.public_collection,
            Tier::Sensitive => &self.sensitive_collection,
        }
    }

    /// Check the configuration is usable
    ///
    /// Collection names must be non-empty and distinct, otherwise the two
    /// tiers would share one partition and their keys would collide.
    pub fn validate(&self) -> Result<()> {
        if self.public_collection.is_empty() {
            return Err(Error::missing_field("public_collection"));
        }
        if self.sensitive_collection.is_empty() {
            return Err(Error::missing_field("sensitive_collection"));
        }
        if self.public_collection == self.sensitive_collection {
            return Err(Error::malformed(format!(
                "public and sensitive collections must differ (both are {})",
                self.public_collection
            )));
        }
        for (name, key) in [
            ("transient.create", &self.transient.create),
            ("transient.update_address", &self.transient.update_address),
            ("transient.delete", &self.transient.delete),
        ] {
            if key.is_empty() {
                return Err(Error::missing_field(name));
            }
        }
        Ok(())
    }
}
