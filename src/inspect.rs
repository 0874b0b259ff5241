// src/inspect.rs

//! Package artifact inspection
//!
//! Reading package headers is kept apart from the model: an
//! [`ArtifactInspector`] turns a package file into a plain
//! [`ArtifactMetadata`] record and [`crate::Package::from_artifact`] maps that
//! record onto package fields.

use rpm::Package as RpmFile;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Header fields and content of one package artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub name: String,
    pub epoch: Option<u32>,
    pub version: String,
    pub release: String,
    pub arch: String,
    /// `None` for source packages
    pub source_rpm: Option<String>,
    /// Unix seconds
    pub build_time: Option<u64>,
    /// Raw file content, used for checksums
    pub content: Vec<u8>,
}

/// Extracts [`ArtifactMetadata`] from a package file
pub trait ArtifactInspector {
    fn inspect(&self, path: &Path) -> Result<ArtifactMetadata>;
}

/// Reads local RPM files with the `rpm` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RpmInspector;

impl RpmInspector {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactInspector for RpmInspector {
    fn inspect(&self, path: &Path) -> Result<ArtifactMetadata> {
        debug!("Inspecting RPM: {}", path.display());

        let artifact_error = |reason: String| Error::Artifact {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read(path)?;
        let pkg = RpmFile::parse(&mut Cursor::new(content.as_slice()))
            .map_err(|e| artifact_error(format!("Failed to parse RPM: {}", e)))?;

        let name = pkg
            .metadata
            .get_name()
            .map_err(|e| artifact_error(format!("Failed to get package name: {}", e)))?
            .to_string();
        let version = pkg
            .metadata
            .get_version()
            .map_err(|e| artifact_error(format!("Failed to get package version: {}", e)))?
            .to_string();
        let release = pkg
            .metadata
            .get_release()
            .map_err(|e| artifact_error(format!("Failed to get package release: {}", e)))?
            .to_string();
        let arch = pkg
            .metadata
            .get_arch()
            .map_err(|e| artifact_error(format!("Failed to get package arch: {}", e)))?
            .to_string();

        let epoch = pkg.metadata.get_epoch().ok();
        let build_time = pkg.metadata.get_build_time().ok();
        let source_rpm = pkg
            .metadata
            .get_source_rpm()
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(ArtifactMetadata {
            name,
            epoch,
            version,
            release,
            arch,
            source_rpm,
            build_time,
            content,
        })
    }
}
