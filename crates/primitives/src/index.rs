//! Secondary indexes
//!
//! Each record kind carries one index over a single attribute. An index
//! entry is a composite key `(attribute, entry_id)` stored in the same
//! collection as the record it points at, with [`INDEX_SENTINEL`] as its
//! value. The key carries all the information; the value only marks
//! presence.
//!
//! | Index | Attribute | Collection tier |
//! |-------|-----------|-----------------|
//! | `facility~entryLog` | `facilityID` | public |
//! | `personal~entryLog` | `personalID` | sensitive |
//!
//! Create and delete both reach index entries through [`Indexed::index_entry`],
//! so the key a record was indexed under is always the key it is removed by.

use entrylog_core::{EntryLog, EntryLogPrivateDetails, Error, Result, Tier};

use crate::composite::CompositeKey;

/// Value stored under every index key
pub const INDEX_SENTINEL: &[u8] = &[0x00];

/// Index over `facilityID` of public records
pub const FACILITY_INDEX: Index = Index {
    name: "facility~entryLog",
    tier: Tier::Public,
};

/// Index over `personalID` of sensitive records
pub const PERSONAL_INDEX: Index = Index {
    name: "personal~entryLog",
    tier: Tier::Sensitive,
};

/// A named secondary index living in one tier's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index {
    /// Composite key object type
    pub name: &'static str,
    /// Tier whose collection holds both the index and its records
    pub tier: Tier,
}

impl Index {
    /// Entry pointing `attribute` at `entry_id`
    pub fn entry(&self, attribute: impl Into<String>, entry_id: impl Into<String>) -> IndexEntry {
        IndexEntry {
            index: *self,
            attribute: attribute.into(),
            entry_id: entry_id.into(),
        }
    }

    /// Encoded key for `(attribute, entry_id)`
    pub fn key_for(&self, attribute: &str, entry_id: &str) -> Result<String> {
        Ok(CompositeKey::new(self.name, [attribute, entry_id])?.encode())
    }

    /// `[start, end)` range covering every entry whose leading parts equal `prefix`
    ///
    /// An empty prefix covers the whole index.
    pub fn scan_range(&self, prefix: &[&str]) -> Result<(String, String)> {
        Ok(CompositeKey::new(self.name, prefix.iter().copied())?.prefix_range())
    }

    /// Decode a stored key back into the entry it encodes
    ///
    /// Fails with `InvalidKeyPart` if the key is not a two-part entry of
    /// this index.
    pub fn parse(&self, key: &str) -> Result<IndexEntry> {
        let (name, mut parts) = CompositeKey::decode(key)?.into_parts();
        if name != self.name {
            return Err(Error::InvalidKeyPart {
                part: name,
                reason: format!("expected index {}", self.name),
            });
        }
        if parts.len() != 2 {
            return Err(Error::InvalidKeyPart {
                part: key.to_string(),
                reason: format!("{} entries have 2 parts, found {}", self.name, parts.len()),
            });
        }
        let entry_id = parts.pop().unwrap_or_default();
        let attribute = parts.pop().unwrap_or_default();
        Ok(self.entry(attribute, entry_id))
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// One entry of an [`Index`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Index this entry belongs to
    pub index: Index,
    /// Indexed attribute value
    pub attribute: String,
    /// Entry id the attribute points at
    pub entry_id: String,
}

impl IndexEntry {
    /// Encoded store key
    pub fn key(&self) -> Result<String> {
        self.index.key_for(&self.attribute, &self.entry_id)
    }

    /// Tier whose collection stores this entry
    pub fn tier(&self) -> Tier {
        self.index.tier
    }
}

/// A record that is reachable through a secondary index
pub trait Indexed {
    /// Index the record is registered in
    const INDEX: Index;

    /// Entry for this record
    fn index_entry(&self) -> IndexEntry;
}

impl Indexed for EntryLog {
    const INDEX: Index = FACILITY_INDEX;

    fn index_entry(&self) -> IndexEntry {
        Self::INDEX.entry(self.facility_id.as_str(), self.entry_id.as_str())
    }
}

impl Indexed for EntryLogPrivateDetails {
    const INDEX: Index = PERSONAL_INDEX;

    fn index_entry(&self) -> IndexEntry {
        Self::INDEX.entry(self.personal_id.as_str(), self.entry_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_index_entries() {
        let public = EntryLog::new("E1", "F1", "2020", "F", "09:00");
        let entry = public.index_entry();
        assert_eq!(entry.index, FACILITY_INDEX);
        assert_eq!(entry.tier(), Tier::Public);
        assert_eq!(entry.key().unwrap(), "\u{0}facility~entryLog\u{0}F1\u{0}E1\u{0}");

        let details = EntryLogPrivateDetails::new("E1", "P1", "Ann", "555", "Main St");
        let entry = details.index_entry();
        assert_eq!(entry.index, PERSONAL_INDEX);
        assert_eq!(entry.tier(), Tier::Sensitive);
        assert_eq!(entry.key().unwrap(), "\u{0}personal~entryLog\u{0}P1\u{0}E1\u{0}");
    }

    #[test]
    fn test_parse_inverts_key() {
        let entry = FACILITY_INDEX.entry("F1", "E7");
        let parsed = FACILITY_INDEX.parse(&entry.key().unwrap()).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_parse_rejects_other_index() {
        let key = PERSONAL_INDEX.key_for("P1", "E1").unwrap();
        let err = FACILITY_INDEX.parse(&key).unwrap_err();
        assert_eq!(err.error_code(), "InvalidKeyPart");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        let (prefix, _) = FACILITY_INDEX.scan_range(&["F1"]).unwrap();
        assert!(FACILITY_INDEX.parse(&prefix).is_err());
        assert!(FACILITY_INDEX.parse("E1").is_err());
    }

    #[test]
    fn test_empty_attribute_is_invalid() {
        let entry = FACILITY_INDEX.entry("", "E1");
        assert_eq!(entry.key().unwrap_err().error_code(), "InvalidKeyPart");
    }

    #[test]
    fn test_scan_range_contains_only_prefix_matches() {
        let (start, end) = FACILITY_INDEX.scan_range(&["F1"]).unwrap();
        let hit = FACILITY_INDEX.key_for("F1", "E1").unwrap();
        let miss = FACILITY_INDEX.key_for("F2", "E1").unwrap();
        assert!(start <= hit && hit < end);
        assert!(!(start <= miss && miss < end));
    }

    #[test]
    fn test_display_is_name() {
        assert_eq!(PERSONAL_INDEX.to_string(), "personal~entryLog");
    }
}
