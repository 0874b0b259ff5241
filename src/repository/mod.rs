// src/repository/mod.rs

//! Package repository glue
//!
//! The document model only needs two things from a repository: where its
//! current updateinfo file lives (plus the `content`/`distro` tags) and the
//! list of package locations. [`RepositoryIndex`] is that seam;
//! [`LocalRepository`] implements it for repositories on local disk by
//! reading `repodata/repomd.xml` and the `primary` metadata it declares.
//!
//! [`register_updateinfo`] patches `repomd.xml` after a new updateinfo file
//! has been written.

mod primary;
mod repomd;

pub use primary::parse_primary_locations;
pub use repomd::{register_updateinfo, RepoData, RepoMd, UPDATEINFO_DATA_TYPE};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Directory holding repository metadata, relative to the repository base
pub const REPODATA_DIR: &str = "repodata";

/// Name of the metadata index inside [`REPODATA_DIR`]
pub const REPOMD_FILE: &str = "repomd.xml";

/// Repository-level tags from `<tags>` in repomd.xml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoTags {
    /// `createrepo --content`; used as the update status
    pub content: Option<String>,
    /// `createrepo --distro`; used as release and collection name
    pub distro: Option<String>,
}

/// What the document model reads from a repository index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoIndex {
    /// Location of the updateinfo metadata, relative to the repository base
    pub updateinfo_href: Option<String>,
    pub tags: RepoTags,
}

/// Source of repository metadata
pub trait RepositoryIndex {
    /// Read the metadata index of the repository at `base`
    fn read_index(&self, base: &Path) -> Result<RepoIndex>;

    /// Locations of all packages, relative to `base`
    fn package_locations(&self, base: &Path) -> Result<Vec<String>>;
}

/// A repository on local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRepository;

impl LocalRepository {
    pub fn new() -> Self {
        Self
    }

    fn repomd(&self, base: &Path) -> Result<RepoMd> {
        RepoMd::load(&base.join(REPODATA_DIR).join(REPOMD_FILE))
    }
}

impl RepositoryIndex for LocalRepository {
    fn read_index(&self, base: &Path) -> Result<RepoIndex> {
        let repomd = self.repomd(base)?;
        Ok(RepoIndex {
            updateinfo_href: repomd.location(UPDATEINFO_DATA_TYPE),
            tags: repomd.tags(),
        })
    }

    fn package_locations(&self, base: &Path) -> Result<Vec<String>> {
        let repomd = self.repomd(base)?;
        let Some(href) = repomd.location("primary") else {
            return Err(Error::Repository {
                path: base.to_path_buf(),
                reason: "repomd.xml declares no primary metadata".to_string(),
            });
        };

        let primary_path = base.join(&href);
        debug!("Reading package list from {}", primary_path.display());
        let xml = read_metadata_file(&primary_path)?;
        parse_primary_locations(&xml)
    }
}

/// Read a metadata file, transparently decompressing `*.gz`
pub fn read_metadata_file(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut content = String::new();

    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => {
            GzDecoder::new(file).read_to_string(&mut content)?;
        }
        Some(other @ ("bz2" | "xz" | "zst" | "zck")) => {
            return Err(Error::Repository {
                path: path.to_path_buf(),
                reason: format!("unsupported metadata compression: .{}", other),
            });
        }
        _ => {
            let mut file = file;
            file.read_to_string(&mut content)?;
        }
    }

    Ok(content)
}

/// Write a metadata file atomically, gzip-compressing `*.gz`
pub(crate) fn write_metadata_file(path: &Path, text: &str) -> Result<()> {
    if path.extension().is_some_and(|e| e == "gz") {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes())?;
        write_atomic(path, &encoder.finish()?)
    } else {
        write_atomic(path, text.as_bytes())
    }
}

/// Replace `path` with `content` through a temporary file in the same
/// directory
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
