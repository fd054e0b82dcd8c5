//! Composite key encoding
//!
//! An index entry's key is built from the index name and an ordered list of
//! attribute parts:
//!
//! ```text
//! \0 <index name> \0 <part 1> \0 <part 2> \0 ... <part n> \0
//! ```
//!
//! The leading `\0` keeps composite keys in their own region of the key
//! space, away from plain entry ids. Because `\0` may not appear inside the
//! name or any part, splitting on it recovers the original pieces exactly.
//!
//! Encoding a prefix of the parts gives a key that sorts before every key
//! extending it; [`CompositeKey::prefix_range`] turns that into a
//! `[start, end)` range for partial-key scans. `U+10FFFF` is reserved as the
//! range terminator and is rejected inside parts too.

use entrylog_core::{Error, Result};
use smallvec::SmallVec;

/// Separator between composite key components
pub const SEPARATOR: char = '\u{0}';

/// Greatest code point, used as the exclusive upper bound of prefix scans
pub const MAX_CODE_POINT: char = '\u{10FFFF}';

/// A decoded composite key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// Name of the index this key belongs to
    pub index_name: String,
    /// Attribute parts in order
    pub parts: SmallVec<[String; 2]>,
}

impl CompositeKey {
    /// Build a composite key, validating every component
    pub fn new<I, P>(index_name: impl Into<String>, parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let key = Self {
            index_name: index_name.into(),
            parts: parts.into_iter().map(Into::into).collect(),
        };
        check_component(&key.index_name)?;
        for part in &key.parts {
            check_component(part)?;
        }
        Ok(key)
    }

    /// Encode to the stored key string
    pub fn encode(&self) -> String {
        let len = 2 + self.index_name.len() + self.parts.iter().map(|p| p.len() + 1).sum::<usize>();
        let mut out = String::with_capacity(len);
        out.push(SEPARATOR);
        out.push_str(&self.index_name);
        out.push(SEPARATOR);
        for part in &self.parts {
            out.push_str(part);
            out.push(SEPARATOR);
        }
        out
    }

    /// Decode a stored key
    ///
    /// Fails with `InvalidKeyPart` if `key` is not a well-formed composite key.
    pub fn decode(key: &str) -> Result<Self> {
        let body = key
            .strip_prefix(SEPARATOR)
            .and_then(|rest| rest.strip_suffix(SEPARATOR))
            .ok_or_else(|| invalid(key, "not a composite key"))?;

        let mut components = body.split(SEPARATOR);
        let index_name = components
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid(key, "composite key has no index name"))?
            .to_string();

        let mut parts = SmallVec::new();
        for part in components {
            if part.is_empty() {
                return Err(invalid(key, "composite key has an empty part"));
            }
            parts.push(part.to_string());
        }

        Ok(Self { index_name, parts })
    }

    /// `[start, end)` covering every key that extends this one
    pub fn prefix_range(&self) -> (String, String) {
        let start = self.encode();
        let mut end = start.clone();
        end.push(MAX_CODE_POINT);
        (start, end)
    }

    /// Consume into `(index_name, parts)`
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.index_name, self.parts.into_vec())
    }
}

/// Encode `index_name` and `parts` into a composite key string
pub fn encode(index_name: &str, parts: &[&str]) -> Result<String> {
    Ok(CompositeKey::new(index_name, parts.iter().copied())?.encode())
}

/// Decode a composite key string into `(index_name, parts)`
pub fn decode(key: &str) -> Result<(String, Vec<String>)> {
    Ok(CompositeKey::decode(key)?.into_parts())
}

/// Whether `key` lies in the composite key region
pub fn is_composite(key: &str) -> bool {
    key.starts_with(SEPARATOR)
}

fn check_component(part: &str) -> Result<()> {
    if part.is_empty() {
        return Err(invalid(part, "part must not be empty"));
    }
    if part.contains(SEPARATOR) {
        return Err(invalid(part, "part contains the reserved separator U+0000"));
    }
    if part.contains(MAX_CODE_POINT) {
        return Err(invalid(part, "part contains the reserved code point U+10FFFF"));
    }
    Ok(())
}

fn invalid(part: &str, reason: &str) -> Error {
    Error::InvalidKeyPart {
        part: part.to_string(),
        reason: reason.to_string(),
    }
}
