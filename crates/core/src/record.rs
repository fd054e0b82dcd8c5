//! Record documents
//!
//! Both records are stored as UTF-8 JSON documents. The `docType` field
//! distinguishes them inside the store so selector queries can target one
//! kind without matching the other.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `docType` of [`EntryLog`]
pub const ENTRY_LOG_DOC_TYPE: &str = "entryLog";

/// `docType` of [`EntryLogPrivateDetails`]
pub const PRIVATE_DETAILS_DOC_TYPE: &str = "entryLogPrivateDetails";

/// Public-facing entry record
///
/// Lives in the public collection, keyed by `entry_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLog {
    /// Discriminator, always [`ENTRY_LOG_DOC_TYPE`]
    #[serde(rename = "docType")]
    pub object_type: String,
    /// Entry identifier
    #[serde(rename = "entryLogID")]
    pub entry_id: String,
    /// Facility the entry was logged at (indexed)
    #[serde(rename = "facilityID")]
    pub facility_id: String,
    /// Year attribute
    pub year: String,
    /// Sex/gender attribute
    pub sex: String,
    /// When the entry happened, as supplied by the caller
    #[serde(rename = "entryTime")]
    pub entry_time: String,
}

impl EntryLog {
    /// Build a public record with the fixed discriminator
    pub fn new(
        entry_id: impl Into<String>,
        facility_id: impl Into<String>,
        year: impl Into<String>,
        sex: impl Into<String>,
        entry_time: impl Into<String>,
    ) -> Self {
        Self {
            object_type: ENTRY_LOG_DOC_TYPE.to_string(),
            entry_id: entry_id.into(),
            facility_id: facility_id.into(),
            year: year.into(),
            sex: sex.into(),
            entry_time: entry_time.into(),
        }
    }

    /// Serialize to the stored JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::store)
    }

    /// Decode a stored JSON document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::store(format!("failed to decode entryLog: {}", e)))
    }
}

/// Sensitive details of an entry
///
/// Lives in the sensitive collection under the same entry id as its
/// [`EntryLog`]. Only `address` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLogPrivateDetails {
    /// Discriminator, always [`PRIVATE_DETAILS_DOC_TYPE`]
    #[serde(rename = "docType")]
    pub object_type: String,
    /// Entry identifier
    #[serde(rename = "entryLogID")]
    pub entry_id: String,
    /// Person identifier (indexed)
    #[serde(rename = "personalID")]
    pub personal_id: String,
    /// Person name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Postal address
    pub address: String,
}

impl EntryLogPrivateDetails {
    /// Build a private details record with the fixed discriminator
    pub fn new(
        entry_id: impl Into<String>,
        personal_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            object_type: PRIVATE_DETAILS_DOC_TYPE.to_string(),
            entry_id: entry_id.into(),
            personal_id: personal_id.into(),
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Serialize to the stored JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::store)
    }

    /// Decode a stored JSON document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::store(format!("failed to decode entryLog private details: {}", e))
        })
    }
}
