// src/model/updateinfo.rs

//! The updateinfo document
//!
//! [`Updateinfo`] owns its entries keyed by update id and serializes them in
//! ascending id order. Document-level force overrides (`from`, `status`,
//! release name, collection name) rewrite every existing entry when set and
//! are applied to every entry added afterwards.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::UpdateinfoSettings;
use crate::error::{Error, Result};
use crate::repository::{self, RepositoryIndex};
use crate::validate::Validation;
use crate::xml::{self, Element};

use super::entry::Entry;
use super::overrides::{CollectionOverride, DocumentOverrides};

/// Root element name of an updateinfo document
pub const ROOT_ELEMENT: &str = "updates";

/// Serialization options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Emit the `<?xml ...?>` declaration
    pub header: bool,
    /// Free text embedded as an XML comment after the declaration
    pub comment: Option<String>,
    /// Run the configured schema validator on the result
    pub validate: bool,
    /// Indent the output
    pub pretty: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            header: true,
            comment: None,
            validate: true,
            pretty: false,
        }
    }
}

impl XmlOptions {
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }
}

/// Serialized document and the validation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOutput {
    pub xml: String,
    pub validation: Validation,
}

/// An updateinfo document
#[derive(Debug, Clone, Default)]
pub struct Updateinfo {
    entries: BTreeMap<String, Entry>,
    overrides: DocumentOverrides,
    settings: UpdateinfoSettings,
}

impl Updateinfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: UpdateinfoSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &UpdateinfoSettings {
        &self.settings
    }

    /// Replace the schema used for validation
    pub fn set_schema_location(&mut self, schema: impl Into<PathBuf>) {
        self.settings.schema_location = Some(schema.into());
    }

    pub fn overrides(&self) -> &DocumentOverrides {
        &self.overrides
    }

    // Entry access

    pub fn get(&self, update_id: &str) -> Option<&Entry> {
        self.entries.get(update_id)
    }

    /// Mutable access to an entry; its id is changed with [`Self::rename_entry`]
    pub fn get_mut(&mut self, update_id: &str) -> Option<&mut Entry> {
        self.entries.get_mut(update_id)
    }

    pub fn has_entry(&self, update_id: &str) -> bool {
        self.entries.contains_key(update_id)
    }

    /// Update ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, update_id: &str) -> Option<Entry> {
        self.entries.remove(update_id)
    }

    /// Give an entry a new update id
    ///
    /// Fails when `new_id` already belongs to another entry.
    pub fn rename_entry(&mut self, update_id: &str, new_id: &str) -> Result<()> {
        if update_id != new_id && self.entries.contains_key(new_id) {
            return Err(Error::DuplicateKey {
                kind: "update id",
                key: new_id.to_string(),
            });
        }
        let Some(mut entry) = self.entries.remove(update_id) else {
            return Err(Error::NotFound {
                kind: "update id",
                key: update_id.to_string(),
            });
        };

        entry.set_id(new_id);
        self.entries.insert(new_id.to_string(), entry);
        debug!("Renamed entry {:?} to {:?}", update_id, new_id);
        Ok(())
    }

    // Force overrides

    /// Force `<update from="...">` on all current and future entries
    pub fn force_from(&mut self, from: impl Into<String>) {
        let from = from.into();
        for entry in self.entries.values_mut() {
            entry.set_from(from.as_str());
        }
        debug!("Forcing update from {:?}", from);
        self.overrides.from = Some(from);
    }

    /// Force `<update status="...">` on all current and future entries
    pub fn force_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        for entry in self.entries.values_mut() {
            entry.set_status(status.as_str());
        }
        debug!("Forcing update status {:?}", status);
        self.overrides.status = Some(status);
    }

    /// Force `<release>` on all current and future entries
    pub fn force_release_name(&mut self, release_name: impl Into<String>) {
        let release_name = release_name.into();
        for entry in self.entries.values_mut() {
            entry.set_release_name(release_name.as_str());
        }
        debug!("Forcing release name {:?}", release_name);
        self.overrides.release_name = Some(release_name);
    }

    /// Force the collection names of all current and future entries
    ///
    /// While active, merging entries by id is refused.
    pub fn force_collection_name(&mut self, name: Option<&str>, short_name: Option<&str>) {
        let Some(forced) = CollectionOverride::new(name, short_name) else {
            return;
        };
        for entry in self.entries.values_mut() {
            entry.force_collection_name(name, short_name);
        }
        self.overrides.collection = Some(forced);
    }

    /// Add an entry
    ///
    /// An id already present is a [`Error::DuplicateKey`] unless
    /// `allow_id_merge` is set, in which case the existing entry absorbs the
    /// new one. New entries receive the active force overrides.
    pub fn add_entry(&mut self, mut entry: Entry, allow_id_merge: bool) -> Result<()> {
        let update_id = entry
            .update_id()
            .map(str::to_string)
            .ok_or(Error::MissingField("update id"))?;

        if let Some(existing) = self.entries.get_mut(&update_id) {
            if !allow_id_merge {
                return Err(Error::DuplicateKey {
                    kind: "update id",
                    key: update_id,
                });
            }
            if self.overrides.collection.is_some() {
                return Err(Error::ForcedCollectionMerge);
            }
            return existing.merge(entry);
        }

        self.overrides.apply(&mut entry);
        self.entries.insert(update_id, entry);
        Ok(())
    }

    /// Add every entry of `other`, merging entries whose ids collide
    ///
    /// Nothing is added when any entry would be refused.
    pub fn merge_with(&mut self, other: Updateinfo) -> Result<()> {
        let count = self.add_batch(other.entries.into_values().collect(), true)?;
        debug!("Merged {} entries, document now holds {}", count, self.len());
        Ok(())
    }

    /// Add a batch of entries as a whole or not at all
    fn add_batch(&mut self, batch: Vec<Entry>, allow_id_merge: bool) -> Result<usize> {
        self.check_batch(&batch, allow_id_merge)?;
        let count = batch.len();
        for entry in batch {
            self.add_entry(entry, allow_id_merge)?;
        }
        Ok(count)
    }

    /// Refuse a batch that [`Self::add_entry`] would reject part way through
    fn check_batch(&self, batch: &[Entry], allow_id_merge: bool) -> Result<()> {
        let mut pending: HashMap<&str, &Entry> = HashMap::new();
        for entry in batch {
            let update_id = entry.update_id().ok_or(Error::MissingField("update id"))?;
            let target = self
                .entries
                .get(update_id)
                .or_else(|| pending.get(update_id).copied());

            let Some(existing) = target else {
                pending.insert(update_id, entry);
                continue;
            };
            if !allow_id_merge {
                return Err(Error::DuplicateKey {
                    kind: "update id",
                    key: update_id.to_string(),
                });
            }
            if self.overrides.collection.is_some() || existing.forced_collection().is_some() {
                return Err(Error::ForcedCollectionMerge);
            }
        }
        Ok(())
    }

    // Queries

    /// Whether any entry carries a reference with this href
    pub fn has_reference_url(&self, href: &str) -> bool {
        self.entries.values().any(|e| e.has_reference(href))
    }

    /// Whether any entry lists this package filename
    ///
    /// With `collection`, only that collection of each entry is searched;
    /// entries without such a collection are skipped.
    pub fn has_filename(&self, filename: &str, collection: Option<&str>) -> bool {
        self.entries.values().any(|entry| match collection {
            Some(name) if !entry.has_collection(name) => false,
            _ => entry.has_filename(filename, collection).unwrap_or(false),
        })
    }

    // Serialization

    pub fn to_element(&self) -> Element {
        let mut root = Element::new(ROOT_ELEMENT);
        for entry in self.entries.values() {
            root.push(entry.to_element());
        }
        root
    }

    /// Serialize the document
    pub fn to_xml(&self, options: &XmlOptions) -> Result<XmlOutput> {
        let xml = xml::write_document(
            &self.to_element(),
            options.header,
            options.comment.as_deref(),
            options.pretty,
        )?;
        debug!("Serialized {} entries ({} bytes)", self.len(), xml.len());

        let validation = if options.validate {
            self.validate_xml(&xml)?
        } else {
            Validation::Skipped
        };
        Ok(XmlOutput { xml, validation })
    }

    /// Validate serialized text with the configured validator and schema
    pub fn validate_xml(&self, xml_text: &str) -> Result<Validation> {
        match (&self.settings.validator, &self.settings.schema_location) {
            (Some(validator), Some(schema)) => {
                validator.validate(xml_text, schema)?;
                Ok(Validation::Passed)
            }
            _ => {
                debug!("No schema validator configured, skipping validation");
                Ok(Validation::Unsupported)
            }
        }
    }

    /// Validate an updateinfo file on disk
    pub fn validate_file(&self, path: &Path) -> Result<Validation> {
        self.validate_xml(&repository::read_metadata_file(path)?)
    }

    // Parsing

    /// Parse a document with default settings
    pub fn from_xml_str(xml_text: &str) -> Result<Self> {
        let mut document = Self::new();
        document.load_xml_str(xml_text)?;
        Ok(document)
    }

    /// Add the entries of a document; ids must not be present yet
    pub fn load_xml_str(&mut self, xml_text: &str) -> Result<usize> {
        self.read_entries(xml_text, false)
    }

    /// Add the entries of a document, merging entries whose ids collide
    pub fn merge_xml_str(&mut self, xml_text: &str) -> Result<usize> {
        self.read_entries(xml_text, true)
    }

    fn read_entries(&mut self, xml_text: &str, allow_id_merge: bool) -> Result<usize> {
        let root = xml::parse_document(xml_text)?;
        if root.name != ROOT_ELEMENT {
            return Err(Error::UnexpectedRoot(root.name));
        }

        let batch = root
            .children_named("update")
            .map(Entry::from_element)
            .collect::<Result<Vec<_>>>()?;
        let count = self.add_batch(batch, allow_id_merge)?;
        debug!("Read {} entries", count);
        Ok(count)
    }

    /// Load an updateinfo file (`*.gz` is decompressed)
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        self.load_xml_str(&repository::read_metadata_file(path)?)
    }

    /// Merge an updateinfo file into this document
    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        self.merge_xml_str(&repository::read_metadata_file(path)?)
    }

    /// Write the document to `path`
    ///
    /// The file is replaced atomically and gzip-compressed when the name ends
    /// in `.gz`. Validation, when requested, runs on the written file.
    pub fn write_file(&self, path: &Path, options: &XmlOptions) -> Result<Validation> {
        let unvalidated = XmlOptions {
            validate: false,
            ..options.clone()
        };
        let output = self.to_xml(&unvalidated)?;

        repository::write_metadata_file(path, &output.xml)?;
        info!("Wrote {} entries to {}", self.len(), path.display());

        if options.validate {
            self.validate_file(path)
        } else {
            Ok(Validation::Skipped)
        }
    }

    /// Splice this document's entries into an existing file
    ///
    /// The existing file is not parsed, validated or de-duplicated; the
    /// entries are inserted before its closing `</updates>`. A `*.gz` file
    /// is decompressed and written back compressed.
    pub fn append_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let mut body = String::from("\n");
        for entry in self.entries.values() {
            body.push_str(&entry.to_element().to_xml(pretty)?);
            body.push('\n');
        }

        let existing = repository::read_metadata_file(path)?;
        let closing = format!("</{}>", ROOT_ELEMENT);
        let empty = format!("<{}/>", ROOT_ELEMENT);
        let updated = if existing.contains(&closing) {
            existing.replacen(&closing, &format!("{body}{closing}"), 1)
        } else if existing.contains(&empty) {
            existing.replacen(&empty, &format!("<{ROOT_ELEMENT}>{body}{closing}"), 1)
        } else {
            return Err(Error::Repository {
                path: path.to_path_buf(),
                reason: format!("no <{}> element to append to", ROOT_ELEMENT),
            });
        };

        repository::write_metadata_file(path, &updated)?;
        debug!("Appended {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Load the updateinfo declared by a repository's metadata index
    ///
    /// With `import_metadata`, the repository's `content` tag forces the
    /// status and its `distro` tag forces release and collection name.
    /// Returns the path of the loaded file, if the repository declares one.
    pub fn load_from_repository(
        &mut self,
        index: &dyn RepositoryIndex,
        base: &Path,
        import_metadata: bool,
    ) -> Result<Option<PathBuf>> {
        let repo_index = index.read_index(base)?;

        if import_metadata {
            if let Some(content) = &repo_index.tags.content {
                self.force_status(content.as_str());
            }
            if let Some(distro) = &repo_index.tags.distro {
                self.force_release_name(distro.as_str());
                self.force_collection_name(Some(distro.as_str()), None);
            }
        }

        let Some(href) = repo_index.updateinfo_href else {
            debug!("Repository at {} has no updateinfo", base.display());
            return Ok(None);
        };

        let path = base.join(href);
        let count = self.load_file(&path)?;
        info!("Loaded {} entries from {}", count, path.display());
        Ok(Some(path))
    }
}
