// src/helper.rs

//! Repository-driven updateinfo builder
//!
//! [`UpdateinfoHelper`] keeps the data gathering out of the document model.
//! Callers implement [`AdvisorySource`] against wherever their errata live;
//! the helper walks the repository, asks the source which update each
//! package belongs to, builds entries, references and collections, writes
//! `repodata/<filename>` and registers it in `repomd.xml`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::HelperConfig;
use crate::date::UpdateDate;
use crate::error::{Error, Result};
use crate::inspect::{ArtifactInspector, RpmInspector};
use crate::model::{Collection, Entry, Package, Reference, ReferenceKind, UpdateType, Updateinfo};
use crate::repository::{self, LocalRepository, RepositoryIndex, REPODATA_DIR};
use crate::validate::Validation;

/// Title of the severity classification reference added to security updates
pub const SEVERITY_REFERENCE_TITLE: &str = "Issue Severity Classification";

/// Identifiers of the update a package belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryIds {
    /// Identifier in the upstream advisory database
    pub upstream_id: String,
    /// Identifier written to `<id>`
    pub update_id: String,
}

impl AdvisoryIds {
    pub fn new(upstream_id: impl Into<String>, update_id: impl Into<String>) -> Self {
        Self {
            upstream_id: upstream_id.into(),
            update_id: update_id.into(),
        }
    }
}

/// Business facts of one update as reported by an [`AdvisorySource`]
///
/// `from` and `status` fall back to the `[metadata]` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFacts {
    pub from: Option<String>,
    pub status: Option<String>,
    pub update_type: String,
    pub title: Option<String>,
    pub issued: Option<UpdateDate>,
    pub updated: Option<UpdateDate>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub rights: Option<String>,
    pub solution: Option<String>,
    pub severity: Option<String>,
    pub reboot_suggested: bool,
    pub restart_suggested: bool,
    pub relogin_suggested: bool,
}

/// Errata data store consulted while building
pub trait AdvisorySource {
    /// Update ids for a package location; `None` marks the package unknown
    fn update_ids(&mut self, location: &str) -> Result<Option<AdvisoryIds>>;

    /// Facts for a new entry
    fn entry_facts(&mut self, ids: &AdvisoryIds) -> Result<EntryFacts>;

    /// References of the update; hrefs already on the entry are skipped
    fn references(&mut self, ids: &AdvisoryIds) -> Result<Vec<Reference>>;
}

/// Result of [`UpdateinfoHelper::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub output: PathBuf,
    /// Updateinfo file loaded from the repository before building
    pub previous: Option<PathBuf>,
    pub packages_added: usize,
    pub validation: Validation,
    pub registered: bool,
}

/// Builds an updateinfo document for a local repository
pub struct UpdateinfoHelper<S: AdvisorySource> {
    config: HelperConfig,
    source: S,
    inspector: Box<dyn ArtifactInspector>,
    repository: Box<dyn RepositoryIndex>,
    document: Updateinfo,
    unknown_packages: Vec<String>,
}

impl<S: AdvisorySource> UpdateinfoHelper<S> {
    pub fn new(config: HelperConfig, source: S) -> Self {
        let document = Updateinfo::with_settings(config.settings());
        Self {
            config,
            source,
            inspector: Box::new(RpmInspector::new()),
            repository: Box::new(LocalRepository::new()),
            document,
            unknown_packages: Vec::new(),
        }
    }

    /// Use another package inspector
    pub fn with_inspector(mut self, inspector: impl ArtifactInspector + 'static) -> Self {
        self.inspector = Box::new(inspector);
        self
    }

    /// Use another repository index reader
    pub fn with_repository(mut self, repository: impl RepositoryIndex + 'static) -> Self {
        self.repository = Box::new(repository);
        self
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn document(&self) -> &Updateinfo {
        &self.document
    }

    pub fn into_document(self) -> Updateinfo {
        self.document
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Packages the advisory source did not recognize
    pub fn unknown_packages(&self) -> &[String] {
        &self.unknown_packages
    }

    /// Build the document, write it and register it with the repository
    pub fn build(&mut self) -> Result<BuildSummary> {
        self.apply_forced_metadata();

        let base = self.config.repo.repobase.clone();
        if !base.join(REPODATA_DIR).is_dir() {
            return Err(Error::Repository {
                path: base,
                reason: "no repodata directory".to_string(),
            });
        }

        let previous = if self.config.repo.import_existing {
            info!("Loading existing updateinfo from {}", base.display());
            self.document.load_from_repository(
                self.repository.as_ref(),
                &base,
                self.config.repo.has_metainfo,
            )?
        } else {
            None
        };

        info!("Scanning packages in {}", base.display());
        let mut packages_added = 0;
        for location in self.repository.package_locations(&base)? {
            if self.document.has_filename(&location, None) {
                continue;
            }
            debug!("Adding {}", location);
            if self.add_package(&location)? {
                packages_added += 1;
            }
        }

        let output = self.config.output_path();
        info!("Writing {}", output.display());
        let validation = self
            .document
            .write_file(&output, &self.config.xml_options())?;

        let registered = if self.config.repo.update_repo {
            self.register(&base, &output, previous.as_deref())?
        } else {
            false
        };

        Ok(BuildSummary {
            output,
            previous,
            packages_added,
            validation,
            registered,
        })
    }

    fn apply_forced_metadata(&mut self) {
        let metadata = &self.config.metadata;
        if metadata.force_updatefrom {
            if let Some(from) = &metadata.updatefrom {
                self.document.force_from(from.as_str());
            }
        }
        if metadata.force_status {
            if let Some(status) = &metadata.status {
                self.document.force_status(status.as_str());
            }
        }
        if metadata.force_release_name {
            if let Some(release_name) = &metadata.release_name {
                self.document.force_release_name(release_name.as_str());
            }
        }
        if metadata.force_collection_name {
            self.document.force_collection_name(
                metadata.collection_name.as_deref(),
                metadata.collection_short_name.as_deref(),
            );
        }
    }

    fn register(&self, base: &Path, output: &Path, previous: Option<&Path>) -> Result<bool> {
        let repodata = base.join(REPODATA_DIR);
        let (Some(parent), Some(file_name)) =
            (output.parent(), output.file_name().and_then(|n| n.to_str()))
        else {
            return Ok(false);
        };
        if fs::canonicalize(parent)? != fs::canonicalize(&repodata)? {
            warn!(
                "{} is outside {}, not registering it in repomd.xml",
                output.display(),
                repodata.display()
            );
            return Ok(false);
        }

        if let Some(previous) = previous {
            if previous.exists() && fs::canonicalize(previous)? != fs::canonicalize(output)? {
                debug!("Removing previous updateinfo {}", previous.display());
                fs::remove_file(previous)?;
            }
        }

        repository::register_updateinfo(&repodata, file_name)?;
        Ok(true)
    }

    /// Add one package location to the document
    ///
    /// Returns `false` when the advisory source does not know the package;
    /// it is then listed in [`UpdateinfoHelper::unknown_packages`].
    pub fn add_package(&mut self, location: &str) -> Result<bool> {
        let Some(ids) = self.source.update_ids(location)? else {
            warn!("No update known for {}", location);
            self.unknown_packages.push(location.to_string());
            return Ok(false);
        };

        if !self.document.has_entry(&ids.update_id) {
            self.add_entry(&ids)?;
        }

        let references = self.source.references(&ids)?;
        let key = self.collection_key(&ids.update_id)?;

        let metadata = self
            .inspector
            .inspect(&self.config.repo.repobase.join(location))?;
        let package = Package::from_artifact(
            location,
            &metadata,
            self.config.repo.src_url_base.as_deref(),
        )?;

        let entry = self.entry_mut(&ids.update_id)?;
        for reference in references {
            if !entry.has_reference(&reference.href) {
                entry.add_reference(reference)?;
            }
        }
        entry.add_package(&key, package)?;
        Ok(true)
    }

    fn entry_mut(&mut self, update_id: &str) -> Result<&mut Entry> {
        self.document
            .get_mut(update_id)
            .ok_or(Error::MissingField("update id"))
    }

    fn add_entry(&mut self, ids: &AdvisoryIds) -> Result<()> {
        let facts = self.source.entry_facts(ids)?;
        let metadata = &self.config.metadata;

        let mut entry = Entry::new(ids.update_id.as_str());
        if let Some(from) = facts.from.as_ref().or(metadata.updatefrom.as_ref()) {
            entry.set_from(from.as_str());
        }
        if let Some(status) = facts.status.as_ref().or(metadata.status.as_ref()) {
            entry.set_status(status.as_str());
        }
        entry.set_type(facts.update_type.as_str());
        entry.title = facts.title;
        entry.issued_date = facts.issued;
        entry.updated_date = facts.updated;
        if let Some(description) = &facts.description {
            entry.set_description(description.trim());
        }
        if let Some(release_name) = &metadata.release_name {
            entry.set_release_name(release_name.as_str());
        }
        entry.summary = facts.summary;
        entry.rights = facts.rights;
        entry.solution = facts.solution;
        if let Some(severity) = &facts.severity {
            entry.set_severity(severity.as_str());
        }
        entry.set_reboot_suggested(facts.reboot_suggested);
        entry.set_restart_suggested(facts.restart_suggested);
        entry.set_relogin_suggested(facts.relogin_suggested);

        let severity_reference = match (&entry.severity, self.config.severity_ref()) {
            (Some(severity), Some(base))
                if facts.update_type == UpdateType::Security.as_str() =>
            {
                Some(
                    Reference::new(ReferenceKind::Other, format!("{base}{severity}"))
                        .with_id(severity.as_str())
                        .with_title(SEVERITY_REFERENCE_TITLE),
                )
            }
            _ => None,
        };

        self.document
            .add_entry(entry, self.config.xml.merge_ids)?;

        if let Some(reference) = severity_reference {
            let entry = self.entry_mut(&ids.update_id)?;
            if !entry.has_reference(&reference.href) {
                entry.add_reference(reference)?;
            }
        }
        Ok(())
    }

    /// Key of the configured collection in an entry, creating it if needed
    fn collection_key(&mut self, update_id: &str) -> Result<String> {
        let metadata = &self.config.metadata;
        let names = [
            metadata.collection_name.clone(),
            metadata.collection_short_name.clone(),
        ];
        let collection = Collection::new(
            metadata.collection_name.as_deref(),
            metadata.collection_short_name.as_deref(),
        );

        let entry = self.entry_mut(update_id)?;
        let forced = entry
            .forced_collection()
            .and_then(|f| f.key())
            .map(str::to_string);
        for name in names.iter().flatten().chain(forced.iter()) {
            if let Some(key) = entry.find_collection_key(name) {
                return Ok(key.to_string());
            }
        }
        entry.add_collection(collection)
    }
}
