// src/model/overrides.rs

//! Forced field values
//!
//! An override is applied once to everything already present when it is
//! set, and again to every entry or collection added later.

use super::collection::Collection;
use super::entry::Entry;

/// Forced collection naming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionOverride {
    pub name: Option<String>,
    pub short_name: Option<String>,
}

impl CollectionOverride {
    /// `None` when neither name is given
    pub fn new(name: Option<&str>, short_name: Option<&str>) -> Option<Self> {
        if name.is_none() && short_name.is_none() {
            return None;
        }
        Some(Self {
            name: name.map(str::to_string),
            short_name: short_name.map(str::to_string),
        })
    }

    /// Overwrite both names of the collection
    pub fn apply(&self, collection: &mut Collection) {
        collection.set_name(self.name.as_deref());
        collection.set_short_name(self.short_name.as_deref());
    }

    /// Key a forced collection is stored under
    pub fn key(&self) -> Option<&str> {
        self.short_name.as_deref().or(self.name.as_deref())
    }
}

/// Overrides held by a document and applied to each of its entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOverrides {
    pub from: Option<String>,
    pub status: Option<String>,
    pub release_name: Option<String>,
    pub collection: Option<CollectionOverride>,
}

impl DocumentOverrides {
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.status.is_none()
            && self.release_name.is_none()
            && self.collection.is_none()
    }

    pub fn apply(&self, entry: &mut Entry) {
        if let Some(from) = &self.from {
            entry.set_from(from.as_str());
        }
        if let Some(status) = &self.status {
            entry.set_status(status.as_str());
        }
        if let Some(release_name) = &self.release_name {
            entry.set_release_name(release_name.as_str());
        }
        if let Some(collection) = &self.collection {
            entry.force_collection_name(
                collection.name.as_deref(),
                collection.short_name.as_deref(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_override_is_none() {
        assert!(CollectionOverride::new(None, None).is_none());
        let forced = CollectionOverride::new(Some("Linux 6"), None).unwrap();
        assert_eq!(forced.key(), Some("Linux 6"));
    }

    #[test]
    fn test_apply_overwrites_both_names() {
        let forced = CollectionOverride::new(Some("Linux 6"), None).unwrap();
        let mut collection = Collection::new(Some("old"), Some("o"));
        forced.apply(&mut collection);
        assert_eq!(collection.release_name(), Some("Linux 6"));
        assert_eq!(collection.short_name(), None);
    }

    #[test]
    fn test_document_overrides_apply() {
        let overrides = DocumentOverrides {
            from: Some("me@example.com".to_string()),
            status: Some("final".to_string()),
            ..Default::default()
        };
        assert!(!overrides.is_empty());

        let mut entry = Entry::new("SLID-1");
        entry.set_status("testing");
        overrides.apply(&mut entry);
        assert_eq!(entry.status.as_deref(), Some("final"));
        assert_eq!(entry.from.as_deref(), Some("me@example.com"));
        assert_eq!(entry.release_name, None);
    }
}
