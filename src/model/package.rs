// src/model/package.rs

//! One package artifact affected by an update
//!
//! A [`Package`] is keyed by its `filename` inside a collection. It carries
//! the NEVRA fields, the source package it was built from, any number of
//! checksums and per-package reboot/restart/relogin suggestions.

use tracing::debug;

use crate::date::{IntoUpdateDate, UpdateDate};
use crate::error::{Error, Result};
use crate::hash::{self, ChecksumType};
use crate::inspect::ArtifactMetadata;
use crate::xml::Element;

/// A `<sum type="...">` checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    /// Algorithm name as written in the document (`sha256`, `sha`, ...)
    pub kind: String,
    /// Lowercase hex digest
    pub value: String,
}

impl Checksum {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// A package entry of a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub name: Option<String>,
    /// Serialized as `"0"` when unset
    pub epoch: Option<String>,
    pub version: Option<String>,
    pub release: Option<String>,
    pub arch: Option<String>,
    /// Source package file name (no directory)
    pub srpm: Option<String>,
    src_url_base: Option<String>,
    filename: Option<String>,
    pub sums: Vec<Checksum>,
    pub reboot_suggested: bool,
    pub restart_suggested: bool,
    pub relogin_suggested: bool,
    /// Not serialized; available to callers deriving issue dates
    pub builddate: Option<UpdateDate>,
}

impl Package {
    /// Create a package keyed by `filename`
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Create a package with its key and NEVRA set
    pub fn with_nevra(
        filename: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            filename: Some(filename.into()),
            name: Some(name.into()),
            version: Some(version.into()),
            release: Some(release.into()),
            arch: Some(arch.into()),
            ..Default::default()
        }
    }

    /// Populate a package from inspected artifact metadata
    ///
    /// `location` becomes the filename. The content is checksummed with
    /// SHA-256. A source package (no source RPM recorded) refers to itself
    /// as its srpm and gets arch `src`.
    pub fn from_artifact(
        location: &str,
        metadata: &ArtifactMetadata,
        src_url_base: Option<&str>,
    ) -> Result<Self> {
        let mut package = Self {
            filename: Some(location.to_string()),
            name: Some(metadata.name.clone()),
            epoch: metadata.epoch.map(|e| e.to_string()),
            version: Some(metadata.version.clone()),
            release: Some(metadata.release.clone()),
            ..Default::default()
        };
        if let Some(built) = metadata.build_time {
            package.set_builddate(built)?;
        }

        match metadata.source_rpm.as_deref().filter(|s| !s.is_empty()) {
            Some(srpm) => {
                package.srpm = Some(srpm.to_string());
                package.arch = Some(metadata.arch.clone());
            }
            None => {
                package.srpm = Some(location.to_string());
                package.arch = Some("src".to_string());
            }
        }

        package.compute_checksum("sha256", &metadata.content)?;
        package.set_src_url_base(src_url_base)?;

        debug!("Populated package {} from artifact metadata", location);
        Ok(package)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_epoch(&mut self, epoch: impl ToString) {
        self.epoch = Some(epoch.to_string());
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    pub fn set_release(&mut self, release: impl Into<String>) {
        self.release = Some(release.into());
    }

    pub fn set_arch(&mut self, arch: impl Into<String>) {
        self.arch = Some(arch.into());
    }

    pub fn set_srpm(&mut self, srpm: impl Into<String>) {
        self.srpm = Some(srpm.into());
    }

    /// The key of this package inside a collection
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Renaming a stored package goes through [`super::Collection::rename`]
    pub(crate) fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    pub fn set_builddate(&mut self, date: impl IntoUpdateDate) -> Result<()> {
        self.builddate = Some(date.into_update_date()?);
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

    /// Append a precomputed checksum
    pub fn add_sum(&mut self, kind: impl Into<String>, value: impl Into<String>) {
        self.sums.push(Checksum::new(kind, value));
    }

    /// Base URL prepended to the srpm in the `src` attribute
    pub fn src_url_base(&self) -> Option<&str> {
        self.src_url_base.as_deref()
    }

    /// Set the source URL base
    ///
    /// `None` and the empty string leave the package unchanged. Anything
    /// else must start with `http://` or `ftp://` and gets a trailing `/`.
    pub fn set_src_url_base(&mut self, url: Option<&str>) -> Result<()> {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return Ok(());
        };
        if !url.starts_with("http://") && !url.starts_with("ftp://") {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        let mut base = url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.src_url_base = Some(base);
        Ok(())
    }

    /// Checksum `bytes` with the named algorithm and record the result
    pub fn compute_checksum(&mut self, algorithm: &str, bytes: &[u8]) -> Result<Checksum> {
        let kind: ChecksumType = algorithm.parse()?;
        let checksum = Checksum::new(algorithm, hash::hash_bytes(kind, bytes));
        self.sums.push(checksum.clone());
        Ok(checksum)
    }

    /// Whether the fields consumers need are all present
    ///
    /// Epoch and srpm are optional.
    pub fn is_complete(&self) -> bool {
        self.filename.is_some()
            && self.name.is_some()
            && self.version.is_some()
            && self.release.is_some()
            && self.arch.is_some()
    }

    /// The `src` attribute value
    pub fn src(&self) -> Option<String> {
        let srpm = self.srpm.as_deref()?;
        Some(match &self.src_url_base {
            Some(base) => format!("{base}{srpm}"),
            None => srpm.to_string(),
        })
    }

    pub fn to_element(&self) -> Element {
        let epoch = match self.epoch.as_deref() {
            None | Some("") | Some("None") | Some("(none)") => "0",
            Some(epoch) => epoch,
        };
        let mut element = Element::new("package").with_attr("epoch", epoch);

        for (key, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("release", &self.release),
            ("arch", &self.arch),
        ] {
            if let Some(value) = value {
                element.set_attr(key, value.as_str());
            }
        }
        if let Some(src) = self.src() {
            element.set_attr("src", src);
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

        let mut filename = Element::new("filename");
        filename.text = self.filename.clone();
        element.push(filename);

        for sum in &self.sums {
            element.push(
                Element::new("sum")
                    .with_attr("type", sum.kind.as_str())
                    .with_text(sum.value.as_str()),
            );
        }
        element
    }

    /// Build from a `<package>` element
    ///
    /// Missing attributes stay unset. `src` is split into base URL and srpm
    /// file name at the last `/`.
    pub fn from_element(element: &Element) -> Result<Self> {
        if element.local_name() != "package" {
            return Err(Error::TypeMismatch {
                expected: "package",
                found: element.name.clone(),
            });
        }

        let attr = |key: &str| element.attr(key).map(str::to_string);
        let mut package = Self {
            epoch: attr("epoch"),
            name: attr("name"),
            version: attr("version"),
            release: attr("release"),
            arch: attr("arch"),
            ..Default::default()
        };

        if let Some(src) = element.attr("src") {
            match src.rsplit_once('/') {
                Some((base, srpm)) => {
                    package.src_url_base = Some(format!("{base}/"));
                    package.srpm = Some(srpm.to_string());
                }
                None => package.srpm = Some(src.to_string()),
            }
        }

        for child in &element.children {
            match child.local_name() {
                "filename" => package.filename = child.text().map(|t| t.trim().to_string()),
                "sum" => package.add_sum(
                    child.attr("type").unwrap_or_default(),
                    child.text().unwrap_or_default().trim(),
                ),
                "reboot_suggested" => package.reboot_suggested = true,
                "restart_suggested" => package.restart_suggested = true,
                "relogin_suggested" => package.relogin_suggested = true,
                _ => {}
            }
        }

        Ok(package)
    }
}
