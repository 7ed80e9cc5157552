//! Installed-mod records and metadata access.

use std::collections::BTreeMap;

use crate::rule::Version;

/// Metadata key consulted by `DESC` predicates.
pub const KEY_DESCRIPTION: &str = "description";
/// Metadata key consulted by `SIZE` predicates (decimal byte count).
pub const KEY_SIZE: &str = "size";
/// Metadata key consulted by `VER` predicates (dotted version string).
pub const KEY_VERSION: &str = "version";

/// String-keyed metadata attached to a mod by the external scanner.
///
/// The key set is open; only the three well-known keys above carry
/// engine meaning, through predicate evaluation. Typed accessors parse
/// on demand and return `None` for absent or unparsable values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Returns the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Inserts a key/value pair, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// The mod's description field.
    pub fn description(&self) -> Option<&str> {
        self.get(KEY_DESCRIPTION)
    }

    /// The mod's file size in bytes, when present and numeric.
    pub fn size(&self) -> Option<u64> {
        self.get(KEY_SIZE).and_then(|v| v.trim().parse().ok())
    }

    /// The mod's version, when present.
    pub fn version(&self) -> Option<Version> {
        self.get(KEY_VERSION).map(Version::parse)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Metadata {
    fn from(map: BTreeMap<String, String>) -> Self {
        Metadata(map)
    }
}

/// A unique installable unit, as supplied by the external mod source.
///
/// Immutable for the duration of one resolution pass; the engine never
/// mutates it. Names compare case-insensitively throughout the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mod {
    /// Unique name, the mod's identity.
    pub name: String,
    /// Optional file hash for identity/version disambiguation.
    pub content_hash: Option<String>,
    /// Origin tag (e.g. `Local`, `Nexus`), informational only.
    pub source: Option<String>,
    /// Scanner-supplied metadata consulted by predicates.
    pub metadata: Metadata,
}

impl Mod {
    /// Creates a mod with the given name and no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_hash: None,
            source: None,
            metadata: Metadata::default(),
        }
    }

    /// Sets the content hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    /// Sets the origin tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_typed_accessors() {
        let m = Mod::new("Base.esp")
            .with_metadata(KEY_DESCRIPTION, "core assets")
            .with_metadata(KEY_SIZE, "4096")
            .with_metadata(KEY_VERSION, "1.2.3");

        assert_eq!(m.metadata.description(), Some("core assets"));
        assert_eq!(m.metadata.size(), Some(4096));
        assert_eq!(m.metadata.version(), Some(Version::parse("1.2.3")));
    }

    #[test]
    fn test_metadata_absent_and_unparsable() {
        let m = Mod::new("Base.esp").with_metadata(KEY_SIZE, "unknown");
        assert_eq!(m.metadata.size(), None);
        assert_eq!(m.metadata.description(), None);
        assert_eq!(m.metadata.version(), None);
    }

    #[test]
    fn test_mod_builder() {
        let m = Mod::new("Base.esp").with_hash("abc123").with_source("Local");
        assert_eq!(m.content_hash.as_deref(), Some("abc123"));
        assert_eq!(m.source.as_deref(), Some("Local"));
        assert!(m.metadata.is_empty());
    }
}
