// src/repository/repomd.rs

//! repomd.xml reading and patching
//!
//! The index is kept as an element tree so that records this crate does not
//! know about survive a rewrite untouched. Element lookups ignore namespace
//! prefixes.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::info;

use crate::error::{Error, Result};
use crate::hash::{self, ChecksumType, Hasher};
use crate::model::Checksum;
use crate::xml::{self, Element};

use super::{write_atomic, RepoTags, REPODATA_DIR, REPOMD_FILE};

/// `type` of the updateinfo `<data>` record
pub const UPDATEINFO_DATA_TYPE: &str = "updateinfo";

/// One `<data type="...">` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoData {
    pub data_type: String,
    pub checksum: Checksum,
    /// Checksum of the uncompressed content
    pub open_checksum: Option<Checksum>,
    pub location_href: String,
    pub timestamp: Option<i64>,
    pub size: Option<u64>,
    pub open_size: Option<u64>,
}

impl RepoData {
    /// Describe a metadata file stored in `repodata/`
    pub fn for_file(data_type: &str, path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Repository {
                path: path.to_path_buf(),
                reason: "metadata file has no usable name".to_string(),
            })?;

        let digest = hash::hash_reader(ChecksumType::Sha256, &mut File::open(path)?)?;
        let (open_checksum, open_size) = if file_name.ends_with(".gz") {
            let mut hasher = Hasher::new(ChecksumType::Sha256);
            let open_size = io::copy(&mut GzDecoder::new(File::open(path)?), &mut hasher)?;
            (
                Some(Checksum::new(ChecksumType::Sha256.name(), hasher.finalize())),
                Some(open_size),
            )
        } else {
            (None, None)
        };

        let metadata = fs::metadata(path)?;
        let timestamp = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        Ok(Self {
            data_type: data_type.to_string(),
            checksum: Checksum::new(ChecksumType::Sha256.name(), digest),
            open_checksum,
            location_href: format!("{}/{}", REPODATA_DIR, file_name),
            timestamp: Some(timestamp),
            size: Some(metadata.len()),
            open_size,
        })
    }

    fn from_element(element: &Element) -> Option<Self> {
        let checksum = |tag: &str| {
            element.child(tag).map(|c| {
                Checksum::new(
                    c.attr("type").unwrap_or_default(),
                    c.text().unwrap_or_default().trim(),
                )
            })
        };
        let number = |tag: &str| {
            element
                .child(tag)
                .and_then(|c| c.text())
                .and_then(|t| t.trim().parse().ok())
        };

        Some(Self {
            data_type: element.attr("type")?.to_string(),
            checksum: checksum("checksum")?,
            open_checksum: checksum("open-checksum"),
            location_href: element.child("location")?.attr("href")?.to_string(),
            timestamp: number("timestamp").map(|n: u64| n as i64),
            size: number("size"),
            open_size: number("open-size"),
        })
    }

    fn to_element(&self, prefix: &str) -> Element {
        let tag = |name: &str| Element::new(format!("{prefix}{name}"));
        let mut element = tag("data").with_attr("type", self.data_type.as_str());

        element.push(
            tag("checksum")
                .with_attr("type", self.checksum.kind.as_str())
                .with_text(self.checksum.value.as_str()),
        );
        if let Some(open) = &self.open_checksum {
            element.push(
                tag("open-checksum")
                    .with_attr("type", open.kind.as_str())
                    .with_text(open.value.as_str()),
            );
        }
        element.push(tag("location").with_attr("href", self.location_href.as_str()));
        if let Some(timestamp) = self.timestamp {
            element.push(tag("timestamp").with_text(timestamp.to_string()));
        }
        if let Some(size) = self.size {
            element.push(tag("size").with_text(size.to_string()));
        }
        if let Some(open_size) = self.open_size {
            element.push(tag("open-size").with_text(open_size.to_string()));
        }
        element
    }
}

/// A parsed repomd.xml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMd {
    root: Element,
}

impl RepoMd {
    pub fn parse(xml_text: &str) -> Result<Self> {
        let root = xml::parse_document(xml_text)?;
        if root.local_name() != "repomd" {
            return Err(Error::TypeMismatch {
                expected: "repomd",
                found: root.name,
            });
        }
        Ok(Self { root })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| match e {
            Error::Io(_) => e,
            other => Error::Repository {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }

    fn data_elements(&self) -> impl Iterator<Item = &Element> {
        self.root.children_named("data")
    }

    /// All `<data>` records that carry a checksum and location
    pub fn records(&self) -> Vec<RepoData> {
        self.data_elements()
            .filter_map(RepoData::from_element)
            .collect()
    }

    pub fn data(&self, data_type: &str) -> Option<RepoData> {
        self.data_elements()
            .filter(|d| d.attr("type") == Some(data_type))
            .find_map(RepoData::from_element)
    }

    /// `<location href>` of the record of the given type
    pub fn location(&self, data_type: &str) -> Option<String> {
        self.data_elements()
            .filter(|d| d.attr("type") == Some(data_type))
            .find_map(|d| d.child("location").and_then(|l| l.attr("href")))
            .map(str::to_string)
    }

    pub fn tags(&self) -> RepoTags {
        let Some(tags) = self.root.child("tags") else {
            return RepoTags::default();
        };
        let text = |tag: &str| {
            tags.child(tag)
                .and_then(|t| t.text())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        };
        RepoTags {
            content: text("content"),
            distro: text("distro"),
        }
    }

    /// Insert a record, replacing any record of the same type
    pub fn set_data(&mut self, data: &RepoData) {
        let prefix = match self.root.name.split_once(':') {
            Some((prefix, _)) => format!("{prefix}:"),
            None => String::new(),
        };
        let element = data.to_element(&prefix);

        let is_record = |c: &Element| {
            c.local_name() == "data" && c.attr("type") == Some(data.data_type.as_str())
        };
        let existing = self.root.children.iter().position(is_record);
        match existing {
            Some(index) => {
                self.root.children.retain(|c| !is_record(c));
                self.root.children.insert(index, element);
            }
            None => {
                let after_data = self
                    .root
                    .children
                    .iter()
                    .rposition(|c| c.local_name() == "data")
                    .map(|i| i + 1)
                    .unwrap_or(self.root.children.len());
                self.root.children.insert(after_data, element);
            }
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        xml::write_document(&self.root, true, None, true)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_xml()?.as_bytes())
    }
}

/// Record a freshly written updateinfo file in `repodata/repomd.xml`
///
/// `file_name` names a file inside `repodata_dir`. Any previous updateinfo
/// record is replaced.
pub fn register_updateinfo(repodata_dir: &Path, file_name: &str) -> Result<RepoData> {
    let data = RepoData::for_file(UPDATEINFO_DATA_TYPE, &repodata_dir.join(file_name))?;

    let repomd_path = repodata_dir.join(REPOMD_FILE);
    let mut repomd = RepoMd::load(&repomd_path)?;
    repomd.set_data(&data);
    repomd.save(&repomd_path)?;

    info!(
        "Registered {} in {} (sha256 {})",
        data.location_href,
        repomd_path.display(),
        data.checksum.value
    );
    Ok(data)
}
