// src/config.rs

//! Configuration
//!
//! [`UpdateinfoSettings`] is injected into a document at construction and
//! names the schema and validator used by validation.
//!
//! [`HelperConfig`] drives [`crate::UpdateinfoHelper`] and is read from TOML:
//!
//! ```toml
//! [repo]
//! # must be a local path
//! repobase = "/srv/repo/6/x86_64/updates"
//! import_existing = true
//! has_metainfo = false
//! update_repo = true
//! src_url_base = "http://ftp.example.com/6/SRPMS/"
//!
//! [metadata]
//! updatefrom = "me@example.com"
//! force_updatefrom = false
//! status = "final"
//! force_status = false
//! release_name = "My Linux"
//! force_release_name = false
//! collection_name = "My Linux 6"
//! collection_short_name = "ML6"
//! force_collection_name = false
//!
//! [xml]
//! comment = "Share - don't steal - this data"
//! validate = true
//! pretty = false
//! # relative to repobase/repodata unless absolute
//! filename = "updateinfo.xml"
//! merge_ids = false
//! schema = "/usr/share/updateinfo/updateinfo.xsd"
//!
//! [ref_hints]
//! # security updates get a severity reference to this URL + severity
//! severity_ref = "https://example.com/security/classification/#"
//!
//! [package_data]
//! # free-form values for the advisory source
//! id_prefix = "MLBA"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::model::XmlOptions;
use crate::repository::REPODATA_DIR;
use crate::validate::{SchemaValidator, XmllintValidator};

/// Validation settings of a document
#[derive(Debug, Clone, Default)]
pub struct UpdateinfoSettings {
    /// XML Schema file the document is validated against
    pub schema_location: Option<PathBuf>,
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

impl UpdateinfoSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_location(mut self, schema: impl Into<PathBuf>) -> Self {
        self.schema_location = Some(schema.into());
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Use `xmllint` when it is installed
    pub fn with_xmllint(mut self) -> Self {
        if let Some(xmllint) = XmllintValidator::find() {
            self.validator = Some(Arc::new(xmllint));
        }
        self
    }
}

/// Helper configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperConfig {
    pub repo: RepoConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub xml: XmlConfig,

    /// Reference URL hints (`severity_ref` is used by the helper itself)
    #[serde(default)]
    pub ref_hints: BTreeMap<String, String>,

    /// Free-form values for the advisory source
    #[serde(default)]
    pub package_data: BTreeMap<String, toml::Value>,
}

/// `[repo]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Local repository directory (the one containing `repodata/`)
    pub repobase: PathBuf,

    /// Load the repository's current updateinfo before adding packages
    #[serde(default = "default_true")]
    pub import_existing: bool,

    /// Apply the repository's `content`/`distro` tags as forced values
    #[serde(default)]
    pub has_metainfo: bool,

    /// Register the written file in repomd.xml
    #[serde(default = "default_true")]
    pub update_repo: bool,

    /// Base URL of source packages
    #[serde(default)]
    pub src_url_base: Option<String>,
}

/// `[metadata]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub updatefrom: Option<String>,
    pub force_updatefrom: bool,
    pub status: Option<String>,
    pub force_status: bool,
    pub release_name: Option<String>,
    pub force_release_name: bool,
    pub collection_name: Option<String>,
    pub collection_short_name: Option<String>,
    pub force_collection_name: bool,
}

/// `[xml]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    pub comment: Option<String>,
    pub validate: bool,
    pub pretty: bool,
    pub filename: String,
    pub merge_ids: bool,
    pub schema: Option<PathBuf>,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            comment: None,
            validate: true,
            pretty: false,
            filename: "updateinfo.xml".to_string(),
            merge_ids: false,
            schema: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl HelperConfig {
    /// Minimal configuration for a repository
    pub fn new(repobase: impl Into<PathBuf>) -> Self {
        Self {
            repo: RepoConfig {
                repobase: repobase.into(),
                import_existing: true,
                has_metainfo: false,
                update_repo: true,
                src_url_base: None,
            },
            metadata: MetadataConfig::default(),
            xml: XmlConfig::default(),
            ref_hints: BTreeMap::new(),
            package_data: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn severity_ref(&self) -> Option<&str> {
        self.ref_hints.get("severity_ref").map(String::as_str)
    }

    /// Where the updateinfo file is written
    pub fn output_path(&self) -> PathBuf {
        let filename = Path::new(&self.xml.filename);
        if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            self.repo.repobase.join(REPODATA_DIR).join(filename)
        }
    }

    pub fn xml_options(&self) -> XmlOptions {
        XmlOptions {
            header: true,
            comment: self.xml.comment.clone(),
            validate: self.xml.validate,
            pretty: self.xml.pretty,
        }
    }

    /// Document settings: the configured schema, validated with `xmllint`
    pub fn settings(&self) -> UpdateinfoSettings {
        let settings = UpdateinfoSettings::new();
        match &self.xml.schema {
            Some(schema) if self.xml.validate => {
                settings.with_schema_location(schema).with_xmllint()
            }
            _ => settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HelperConfig::from_toml_str(
            r#"
[repo]
repobase = "/srv/repo"
"#,
        )
        .unwrap();
        assert!(config.repo.import_existing);
        assert!(!config.repo.has_metainfo);
        assert!(config.repo.update_repo);
        assert!(config.xml.validate);
        assert!(!config.xml.merge_ids);
        assert_eq!(config.xml.filename, "updateinfo.xml");
        assert_eq!(
            config.output_path(),
            PathBuf::from("/srv/repo/repodata/updateinfo.xml")
        );
        assert!(config.severity_ref().is_none());
        assert!(config.settings().schema_location.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = HelperConfig::from_toml_str(
            r#"
[repo]
repobase = "/srv/repo"
import_existing = false
src_url_base = "http://example.com/SRPMS/"

[metadata]
updatefrom = "me@example.com"
force_updatefrom = true
collection_name = "My Linux 6"
collection_short_name = "ML6"

[xml]
comment = "hello"
pretty = true
filename = "/tmp/out.xml"
merge_ids = true

[ref_hints]
severity_ref = "https://example.com/classification/#"

[package_data]
id_prefix = "MLBA"
use_db = true
"#,
        )
        .unwrap();
        assert!(!config.repo.import_existing);
        assert!(config.metadata.force_updatefrom);
        assert!(!config.metadata.force_status);
        assert_eq!(config.metadata.collection_short_name.as_deref(), Some("ML6"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/out.xml"));
        assert_eq!(
            config.severity_ref(),
            Some("https://example.com/classification/#")
        );
        assert_eq!(
            config.package_data.get("use_db").and_then(|v| v.as_bool()),
            Some(true)
        );

        let options = config.xml_options();
        assert_eq!(options.comment.as_deref(), Some("hello"));
        assert!(options.pretty);
        assert!(options.validate);
    }

    #[test]
    fn test_missing_repo_section() {
        let err = HelperConfig::from_toml_str("[xml]\npretty = true\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValueInvalid);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = HelperConfig::new("/srv/repo");
        config.metadata.status = Some("final".to_string());
        config.metadata.force_status = true;
        let text = config.to_toml().unwrap();
        let parsed = HelperConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.metadata.status.as_deref(), Some("final"));
        assert!(parsed.metadata.force_status);
        assert_eq!(parsed.repo.repobase, PathBuf::from("/srv/repo"));
    }
}
