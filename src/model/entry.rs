// src/model/entry.rs

//! Update entries
//!
//! An [`Entry`] is one `<update>` announcement: identity, classification,
//! free text, dates, suggested post-install actions, references keyed by
//! `href` and collections keyed by short name (or release name).
//!
//! Setting a forced collection name through [`Entry::force_collection_name`]
//! is sticky: existing collections are renamed immediately and every later
//! [`Entry::add_collection`] is renamed too. A forced entry refuses to
//! [`Entry::merge`].

use indexmap::IndexMap;
use tracing::debug;

use crate::date::{IntoUpdateDate, UpdateDate};
use crate::error::{Error, Result};
use crate::xml::Element;

use super::collection::Collection;
use super::kinds::{Severity, UpdateStatus, UpdateType};
use super::overrides::CollectionOverride;
use super::package::Package;
use super::reference::Reference;

/// Schema version written to `<update version="...">` by default
pub const DEFAULT_SCHEMA_VERSION: &str = "1.4";

/// One update announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    update_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub update_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub release_name: Option<String>,
    pub issued_date: Option<UpdateDate>,
    pub updated_date: Option<UpdateDate>,
    pub summary: Option<String>,
    pub rights: Option<String>,
    pub solution: Option<String>,
    pub reboot_suggested: bool,
    pub restart_suggested: bool,
    pub relogin_suggested: bool,
    pub schema_version: String,
    references: IndexMap<String, Reference>,
    collections: IndexMap<String, Collection>,
    forced_collection: Option<CollectionOverride>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            update_id: None,
            status: None,
            from: None,
            update_type: None,
            title: None,
            description: None,
            severity: None,
            release_name: None,
            issued_date: None,
            updated_date: None,
            summary: None,
            rights: None,
            solution: None,
            reboot_suggested: false,
            restart_suggested: false,
            relogin_suggested: false,
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            references: IndexMap::new(),
            collections: IndexMap::new(),
            forced_collection: None,
        }
    }
}

impl Entry {
    pub fn new(update_id: impl Into<String>) -> Self {
        Self {
            update_id: Some(update_id.into()),
            ..Default::default()
        }
    }

    /// The key of this entry inside a document
    pub fn update_id(&self) -> Option<&str> {
        self.update_id.as_deref()
    }

    // Stored entries are renamed through `Updateinfo::rename_entry`
    pub(crate) fn set_id(&mut self, update_id: impl Into<String>) {
        self.update_id = Some(update_id.into());
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = Some(from.into());
    }

    pub fn set_type(&mut self, update_type: impl Into<String>) {
        self.update_type = Some(update_type.into());
    }

    /// Set `from`, `status` and `type` in one call
    pub fn set_update_metainfo(
        &mut self,
        from: impl Into<String>,
        status: impl Into<String>,
        update_type: impl Into<String>,
    ) {
        self.set_from(from);
        self.set_status(status);
        self.set_type(update_type);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Carriage returns are dropped
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into().replace('\r', ""));
    }

    /// Stored lower-cased
    pub fn set_severity(&mut self, severity: impl Into<String>) {
        self.severity = Some(severity.into().to_lowercase());
    }

    pub fn set_release_name(&mut self, release_name: impl Into<String>) {
        self.release_name = Some(release_name.into());
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    pub fn set_rights(&mut self, rights: impl Into<String>) {
        self.rights = Some(rights.into());
    }

    pub fn set_solution(&mut self, solution: impl Into<String>) {
        self.solution = Some(solution.into());
    }

    pub fn set_schema_version(&mut self, version: impl Into<String>) {
        self.schema_version = version.into();
    }

    pub fn set_issued_date(&mut self, date: impl IntoUpdateDate) -> Result<()> {
        self.issued_date = Some(date.into_update_date()?);
        Ok(())
    }

    pub fn set_updated_date(&mut self, date: impl IntoUpdateDate) -> Result<()> {
        self.updated_date = Some(date.into_update_date()?);
        Ok(())
    }

    pub fn set_reboot_suggested(&mut self, value: bool) {
        self.reboot_suggested = value;
    }

    pub fn set_restart_suggested(&mut self, value: bool) {
        self.restart_suggested = value;
    }

    pub fn set_relogin_suggested(&mut self, value: bool) {
        self.relogin_suggested = value;
    }

    // References

    /// Add a reference; its `href` must be set and not yet present
    pub fn add_reference(&mut self, reference: Reference) -> Result<()> {
        if reference.href.is_empty() {
            return Err(Error::MissingField("reference href"));
        }
        if self.references.contains_key(&reference.href) {
            return Err(Error::DuplicateKey {
                kind: "reference href",
                key: reference.href,
            });
        }
        self.references.insert(reference.href.clone(), reference);
        Ok(())
    }

    pub fn has_reference(&self, href: &str) -> bool {
        self.references.contains_key(href)
    }

    pub fn reference(&self, href: &str) -> Option<&Reference> {
        self.references.get(href)
    }

    /// Reference hrefs in insertion order
    pub fn references(&self) -> Vec<&str> {
        self.references.keys().map(String::as_str).collect()
    }

    pub fn reference_values(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    pub fn remove_reference(&mut self, href: &str) -> Option<Reference> {
        self.references.shift_remove(href)
    }

    // Collections

    /// Add a collection and return the key it is stored under
    ///
    /// A forced collection name is applied first. The key is the short name,
    /// or the release name when there is no short name.
    pub fn add_collection(&mut self, mut collection: Collection) -> Result<String> {
        if let Some(forced) = &self.forced_collection {
            forced.apply(&mut collection);
        }
        let key = collection
            .key()
            .map(str::to_string)
            .ok_or(Error::MissingField("collection name"))?;
        self.collections.insert(key.clone(), collection);
        Ok(key)
    }

    /// Add a package to the collection addressed by `collection`
    pub fn add_package(&mut self, collection: &str, package: Package) -> Result<()> {
        let Some(key) = self.find_collection_key(collection).map(str::to_string) else {
            return Err(Error::NoSuchCollection {
                name: collection.to_string(),
                available: self.collection_keys().join(", "),
            });
        };
        match self.collections.get_mut(&key) {
            Some(target) => target.add(package),
            None => Ok(()),
        }
    }

    /// Rename a collection and return its new key
    ///
    /// The collection keeps its position. A forced collection name still
    /// wins over the requested names. Fails when the new key belongs to
    /// another collection.
    pub fn rename_collection(
        &mut self,
        name: &str,
        release_name: Option<&str>,
        short_name: Option<&str>,
    ) -> Result<String> {
        let Some(key) = self.find_collection_key(name).map(str::to_string) else {
            return Err(Error::NoSuchCollection {
                name: name.to_string(),
                available: self.collection_keys().join(", "),
            });
        };
        let Some(mut collection) = self.collections.get(&key).cloned() else {
            return Err(Error::MissingField("collection name"));
        };

        collection.set_name(release_name);
        collection.set_short_name(short_name);
        if let Some(forced) = &self.forced_collection {
            forced.apply(&mut collection);
        }
        let new_key = collection
            .key()
            .map(str::to_string)
            .ok_or(Error::MissingField("collection name"))?;
        if new_key != key && self.collections.contains_key(&new_key) {
            return Err(Error::DuplicateKey {
                kind: "collection",
                key: new_key,
            });
        }

        super::rekey(&mut self.collections, &key, &new_key, collection);
        Ok(new_key)
    }

    /// Look up a collection by key, release name or short name
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        let key = self.find_collection_key(name)?;
        self.collections.get(key)
    }

    /// Key of the collection addressed by `name`
    pub fn find_collection_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.collections.get_key_value(name) {
            return Some(key.as_str());
        }
        self.collections
            .iter()
            .find(|(_, collection)| collection.is_named(name))
            .map(|(key, _)| key.as_str())
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.find_collection_key(name).is_some()
    }

    /// Collection keys in insertion order
    pub fn collection_keys(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn remove_collection(&mut self, key: &str) -> Option<Collection> {
        self.collections.shift_remove(key)
    }

    /// Package filenames, optionally narrowed to one collection
    pub fn filenames(&self, collection: Option<&str>) -> Result<Vec<&str>> {
        match collection {
            None => Ok(self
                .collections
                .values()
                .flat_map(|c| c.filenames())
                .collect()),
            Some(name) => match self.collection(name) {
                Some(c) => Ok(c.filenames()),
                None => Err(Error::NoSuchCollection {
                    name: name.to_string(),
                    available: self.collection_keys().join(", "),
                }),
            },
        }
    }

    pub fn has_filename(&self, filename: &str, collection: Option<&str>) -> Result<bool> {
        Ok(self.filenames(collection)?.contains(&filename))
    }

    /// Force the name of every current and future collection
    ///
    /// Existing collections are re-keyed; collections that end up under the
    /// same key are merged. Passing no names at all does nothing.
    pub fn force_collection_name(&mut self, name: Option<&str>, short_name: Option<&str>) {
        let Some(forced) = CollectionOverride::new(name, short_name) else {
            return;
        };

        let existing = std::mem::take(&mut self.collections);
        for (_, mut collection) in existing {
            forced.apply(&mut collection);
            let key = forced.key().unwrap_or_default().to_string();
            match self.collections.get_mut(&key) {
                Some(current) => current.merge(collection),
                None => {
                    self.collections.insert(key, collection);
                }
            }
        }

        debug!(
            "Forced collection name {:?}/{:?} on entry {:?}",
            forced.name, forced.short_name, self.update_id
        );
        self.forced_collection = Some(forced);
    }

    pub fn forced_collection(&self) -> Option<&CollectionOverride> {
        self.forced_collection.as_ref()
    }

    /// Absorb another entry with the same id
    ///
    /// Only fields unset here are taken from `other`. References not yet
    /// present are added, collections are merged by name. Fails while a
    /// collection name is forced.
    pub fn merge(&mut self, other: Entry) -> Result<()> {
        if self.forced_collection.is_some() {
            return Err(Error::ForcedCollectionMerge);
        }

        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.update_id, other.update_id);
        fill(&mut self.release_name, other.release_name);
        fill(&mut self.title, other.title);
        fill(&mut self.severity, other.severity);
        fill(&mut self.issued_date, other.issued_date);
        fill(&mut self.updated_date, other.updated_date);
        fill(&mut self.description, other.description);
        fill(&mut self.solution, other.solution);
        fill(&mut self.rights, other.rights);
        fill(&mut self.summary, other.summary);

        self.reboot_suggested |= other.reboot_suggested;
        self.restart_suggested |= other.restart_suggested;
        self.relogin_suggested |= other.relogin_suggested;

        for (href, reference) in other.references {
            self.references.entry(href).or_insert(reference);
        }

        for (key, collection) in other.collections {
            match self.find_collection_key(&key).map(str::to_string) {
                Some(existing) => {
                    if let Some(current) = self.collections.get_mut(&existing) {
                        current.merge(collection);
                    }
                }
                None => {
                    self.add_collection(collection)?;
                }
            }
        }

        debug!("Merged entry {:?}", self.update_id);
        Ok(())
    }

    /// Check that the entry carries everything a consumer needs
    ///
    /// Returns `Ok(false)` when status, from, type, id, issued date or any
    /// collection is missing. Out-of-set status, type or severity values are
    /// an error. Severity is checked when set or when the type is security.
    pub fn validate_complete(&self) -> Result<bool> {
        let (Some(status), Some(_), Some(update_type), Some(_), Some(_)) = (
            &self.status,
            &self.from,
            &self.update_type,
            &self.update_id,
            &self.issued_date,
        ) else {
            return Ok(false);
        };
        if self.collections.is_empty() {
            return Ok(false);
        }

        if self.severity.is_some() || update_type == UpdateType::Security.as_str() {
            let severity = self.severity.as_deref().unwrap_or_default();
            if severity != severity.to_lowercase() {
                return Err(Error::InvalidEnum {
                    field: "severity",
                    value: severity.to_string(),
                    allowed: Severity::ALLOWED,
                });
            }
            severity.parse::<Severity>()?;
        }
        status.parse::<UpdateStatus>()?;
        update_type.parse::<UpdateType>()?;

        Ok(true)
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("update");
        for (key, value) in [
            ("type", &self.update_type),
            ("from", &self.from),
            ("status", &self.status),
        ] {
            if let Some(value) = value {
                element.set_attr(key, value.as_str());
            }
        }
        element.set_attr("version", self.schema_version.as_str());

        let mut id = Element::new("id");
        id.text = self.update_id.clone();
        element.push(id);

        for (tag, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("severity", &self.severity),
            ("summary", &self.summary),
            ("rights", &self.rights),
            ("solution", &self.solution),
            ("release", &self.release_name),
        ] {
            if let Some(value) = value {
                element.push(Element::new(tag).with_text(value.as_str()));
            }
        }

        let mut issued = Element::new("issued");
        if let Some(date) = &self.issued_date {
            issued.set_attr("date", date.to_string());
        }
        element.push(issued);

        if let Some(date) = &self.updated_date {
            element.push(Element::new("updated").with_attr("date", date.to_string()));
        }

        for (tag, flag) in [
            ("reboot_suggested", self.reboot_suggested),
            ("restart_suggested", self.restart_suggested),
            ("relogin_suggested", self.relogin_suggested),
        ] {
            if flag {
                element.push(Element::new(tag).with_text("true"));
            }
        }

        let mut references = Element::new("references");
        for reference in self.references.values() {
            references.push(reference.to_element());
        }
        element.push(references);

        let mut pkglist = Element::new("pkglist");
        for collection in self.collections.values() {
            pkglist.push(collection.to_element());
        }
        element.push(pkglist);

        element
    }

    /// Build from an `<update>` element
    ///
    /// Unknown child elements are ignored. Dates go through the same
    /// normalization as [`Entry::set_issued_date`].
    pub fn from_element(element: &Element) -> Result<Self> {
        if element.local_name() != "update" {
            return Err(Error::TypeMismatch {
                expected: "update",
                found: element.name.clone(),
            });
        }

        let mut entry = Entry {
            status: element.attr("status").map(str::to_string),
            from: element.attr("from").map(str::to_string),
            update_type: element.attr("type").map(str::to_string),
            ..Default::default()
        };
        if let Some(version) = element.attr("version") {
            entry.schema_version = version.to_string();
        }

        let text = |child: &Element| child.text().map(str::to_string);
        let date = |child: &Element| -> Result<Option<UpdateDate>> {
            child
                .attr("date")
                .filter(|d| !d.trim().is_empty())
                .map(UpdateDate::parse)
                .transpose()
        };

        for child in &element.children {
            match child.local_name() {
                "id" => entry.update_id = child.text().map(|t| t.trim().to_string()),
                "title" => entry.title = text(child),
                "description" => entry.description = text(child),
                "severity" => entry.severity = child.text().map(|t| t.trim().to_string()),
                "summary" => entry.summary = text(child),
                "rights" => entry.rights = text(child),
                "solution" => entry.solution = text(child),
                "release" => entry.release_name = text(child),
                "issued" => entry.issued_date = date(child)?,
                "updated" => entry.updated_date = date(child)?,
                "reboot_suggested" => entry.reboot_suggested = true,
                "restart_suggested" => entry.restart_suggested = true,
                "relogin_suggested" => entry.relogin_suggested = true,
                "references" => {
                    for reference in child.children_named("reference") {
                        entry.add_reference(Reference::from_element(reference)?)?;
                    }
                }
                "pkglist" => {
                    for collection in child.children_named("collection") {
                        entry.add_collection(Collection::from_element(collection)?)?;
                    }
                }
                _ => {}
            }
        }

        Ok(entry)
    }
}
