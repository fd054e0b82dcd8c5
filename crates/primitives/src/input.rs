//! Input validation
//!
//! Mutating operations take their payload from the transient map rather
//! than from positional arguments, so sensitive values never land in the
//! invocation record. A payload is a JSON object; every declared field must
//! be a non-empty string.
//!
//! Validation runs in two passes, both before anything is written:
//!
//! 1. Shape: the payload must decode as a JSON object and every declared
//!    field that is present must be a string or `null`, else `MalformedInput`.
//! 2. Presence: each declared field, in declaration order, must be present
//!    and non-empty, else `MissingField` naming the first offender.
//!
//! Undeclared fields are ignored.

use std::collections::BTreeMap;

use entrylog_core::{EntryLog, EntryLogPrivateDetails, Error, Result};
use serde_json::{Map, Value};

/// Out-of-band payload channel of one invocation: key to raw bytes
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TransientMap {
    entries: BTreeMap<String, Vec<u8>>,
}

impl TransientMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.entries.insert(key.into(), value.into())
    }

    /// Raw value under `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Non-empty payload under `key`
    ///
    /// A missing key and an empty value both fail with `MissingField`
    /// naming the key.
    pub fn payload(&self, key: &str) -> Result<&[u8]> {
        match self.get(key) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(Error::missing_field(key)),
        }
    }

    /// Decode the payload under `key`
    pub fn decode<P: Payload>(&self, key: &str) -> Result<P> {
        P::from_bytes(self.payload(key)?)
    }
}

impl std::fmt::Debug for TransientMap {
    // Values are sensitive; only sizes are shown.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for TransientMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A typed payload decoded from a JSON object
pub trait Payload: Sized {
    /// Field names in validation order
    const FIELDS: &'static [&'static str];

    /// Build from fields that already passed validation
    fn from_fields(fields: &Fields<'_>) -> Result<Self>;

    /// Decode and validate raw payload bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::malformed(format!("payload is not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed payload
    fn from_value(value: &Value) -> Result<Self> {
        let fields = Fields::new(value, Self::FIELDS)?;
        Self::from_fields(&fields)
    }
}

/// Shape-checked view of a payload object
#[derive(Debug)]
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value, declared: &[&str]) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::malformed("payload must be a JSON object"))?;
        for field in declared {
            match object.get(*field) {
                None | Some(Value::Null) | Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(Error::malformed(format!(
                        "{} must be a string, found {}",
                        field,
                        json_type(other)
                    )))
                }
            }
        }
        Ok(Self { object })
    }

    /// Non-empty string value of `field`
    pub fn require(&self, field: &str) -> Result<String> {
        match self.object.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(Error::missing_field(field)),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Payload of a create invocation
#[derive(Clone, PartialEq, Eq)]
pub struct CreateInput {
    /// Entry id shared by both records
    pub entry_id: String,
    /// Facility the entry was logged at
    pub facility_id: String,
    /// Year attribute
    pub year: String,
    /// Sex/gender attribute
    pub sex: String,
    /// Entry time as supplied
    pub entry_time: String,
    /// Person identifier
    pub personal_id: String,
    /// Person name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Postal address
    pub address: String,
}

impl CreateInput {
    /// Split into the public record and its private details
    pub fn into_records(self) -> (EntryLog, EntryLogPrivateDetails) {
        let public = EntryLog::new(
            self.entry_id.clone(),
            self.facility_id,
            self.year,
            self.sex,
            self.entry_time,
        );
        let details = EntryLogPrivateDetails::new(
            self.entry_id,
            self.personal_id,
            self.name,
            self.phone,
            self.address,
        );
        (public, details)
    }
}

impl std::fmt::Debug for CreateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateInput")
            .field("entry_id", &self.entry_id)
            .field("facility_id", &self.facility_id)
            .finish_non_exhaustive()
    }
}

impl Payload for CreateInput {
    const FIELDS: &'static [&'static str] = &[
        "entryLogID",
        "facilityID",
        "year",
        "sex",
        "entryTime",
        "personalID",
        "name",
        "phone",
        "address",
    ];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            entry_id: fields.require("entryLogID")?,
            facility_id: fields.require("facilityID")?,
            year: fields.require("year")?,
            sex: fields.require("sex")?,
            entry_time: fields.require("entryTime")?,
            personal_id: fields.require("personalID")?,
            name: fields.require("name")?,
            phone: fields.require("phone")?,
            address: fields.require("address")?,
        })
    }
}

/// Payload of an address update
#[derive(Clone, PartialEq, Eq)]
pub struct AddressUpdateInput {
    /// Entry to update
    pub entry_id: String,
    /// Replacement address
    pub address: String,
}

impl std::fmt::Debug for AddressUpdateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressUpdateInput")
            .field("entry_id", &self.entry_id)
            .finish_non_exhaustive()
    }
}

impl Payload for AddressUpdateInput {
    const FIELDS: &'static [&'static str] = &["entryLogID", "address"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            entry_id: fields.require("entryLogID")?,
            address: fields.require("address")?,
        })
    }
}

/// Payload of a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteInput {
    /// Entry to delete
    pub entry_id: String,
}

impl Payload for DeleteInput {
    const FIELDS: &'static [&'static str] = &["entryLogID"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            entry_id: fields.require("entryLogID")?,
        })
    }
}
