//! Column Mapping - original header -> sanitized identifier, for one import

use crate::error::ValidationError;
use crate::import::sanitize::{fallback_name, sanitize};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// PostgreSQL silently truncates identifiers beyond this many bytes.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub original: String,
    pub sanitized: String,
}

/// Ordered header mapping. Serializes as a JSON object in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<ColumnPair>,
}

impl ColumnMapping {
    /// Sanitize every header and reject collisions.
    ///
    /// Headers that sanitize to nothing get `col_<position>`. Two headers
    /// collide when their identifiers are equal or share the first
    /// `MAX_IDENTIFIER_BYTES` bytes.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, ValidationError> {
        let mut pairs = Vec::with_capacity(headers.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (idx, header) in headers.iter().enumerate() {
            let original = header.as_ref();
            let mut sanitized = sanitize(original);
            if sanitized.is_empty() {
                sanitized = fallback_name(idx + 1);
            }

            if let Some(&prev) = seen.get(storage_key(&sanitized)) {
                let first: &ColumnPair = &pairs[prev];
                return Err(ValidationError::DuplicateColumn {
                    first: first.original.clone(),
                    second: original.to_string(),
                    sanitized: first.sanitized.clone(),
                });
            }
            seen.insert(storage_key(&sanitized).to_string(), idx);

            pairs.push(ColumnPair {
                original: original.to_string(),
                sanitized,
            });
        }

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    pub fn sanitized_columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.sanitized.as_str())
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.original == original)
            .map(|p| p.sanitized.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for pair in &self.pairs {
            map.serialize_entry(&pair.original, &pair.sanitized)?;
        }
        map.end()
    }
}

// Sanitized identifiers are ASCII, so slicing on a byte index is safe.
fn storage_key(identifier: &str) -> &str {
    if identifier.len() > MAX_IDENTIFIER_BYTES {
        &identifier[..MAX_IDENTIFIER_BYTES]
    } else {
        identifier
    }
}
