// tests/common/mod.rs

//! Shared builders and scratch repositories for integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use updateinfo::{
    ArtifactInspector, ArtifactMetadata, Collection, Entry, Package, Reference, Result,
};

pub const SCENARIO_FILE: &str = "foo-1.0-1.el6.x86_64.rpm";

/// The SLID-1 entry: one SL6 collection holding one package
pub fn scenario_entry() -> Entry {
    let mut entry = Entry::new("SLID-1");
    entry.set_update_metainfo("a@b.com", "final", "bugfix");
    entry.set_title("t");
    entry.set_issued_date("2012-08-25 16:03:34").unwrap();

    let mut collection = Collection::new(None, Some("SL6"));
    collection
        .add(Package::with_nevra(SCENARIO_FILE, "foo", "1.0", "1.el6", "x86_64"))
        .unwrap();
    entry.add_collection(collection).unwrap();
    entry
}

/// A complete entry with one reference and the given packages in `short`
pub fn entry_with(id: &str, short: &str, files: &[&str], href: &str) -> Entry {
    let mut entry = Entry::new(id);
    entry.set_update_metainfo("errata@example.com", "stable", "security");
    entry.set_severity("moderate");
    entry.set_issued_date(1_345_910_614i64).unwrap();
    entry
        .add_reference(Reference::new("bugzilla", href).with_id(id))
        .unwrap();

    let mut collection = Collection::new(Some(&format!("Linux {short}")), Some(short));
    for file in files {
        collection
            .add(Package::with_nevra(*file, "pkg", "1.0", "1", "x86_64"))
            .unwrap();
    }
    entry.add_collection(collection).unwrap();
    entry
}

/// Create `repodata/` with a gzip primary.xml listing `packages`
///
/// With `updateinfo`, the given document is stored and declared too.
pub fn create_repo(packages: &[&str], updateinfo: Option<&str>, tags: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let repodata = dir.path().join("repodata");
    fs::create_dir_all(&repodata).unwrap();

    let mut primary = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<metadata xmlns=\"http://linux.duke.edu/metadata/common\">\n",
    );
    for package in packages {
        primary.push_str(&format!(
            "<package type=\"rpm\"><name>x</name><location href=\"{package}\"/></package>\n"
        ));
    }
    primary.push_str("</metadata>\n");

    let mut encoder = GzEncoder::new(
        fs::File::create(repodata.join("primary.xml.gz")).unwrap(),
        Compression::default(),
    );
    encoder.write_all(primary.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let mut repomd = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<repomd xmlns=\"http://linux.duke.edu/metadata/repo\">\n<revision>1</revision>\n",
    );
    if !tags.is_empty() {
        repomd.push_str("<tags>");
        for (tag, value) in tags {
            repomd.push_str(&format!("<{tag}>{value}</{tag}>"));
        }
        repomd.push_str("</tags>\n");
    }
    repomd.push_str(
        "<data type=\"primary\"><checksum type=\"sha256\">00</checksum><location href=\"repodata/primary.xml.gz\"/></data>\n",
    );
    if let Some(updateinfo) = updateinfo {
        fs::write(repodata.join("old-updateinfo.xml"), updateinfo).unwrap();
        repomd.push_str(
            "<data type=\"updateinfo\"><checksum type=\"sha256\">00</checksum><location href=\"repodata/old-updateinfo.xml\"/></data>\n",
        );
    }
    repomd.push_str("</repomd>\n");
    fs::write(repodata.join("repomd.xml"), repomd).unwrap();

    dir
}

/// Inspector that derives metadata from the file name instead of RPM headers
pub struct NameInspector;

impl ArtifactInspector for NameInspector {
    fn inspect(&self, path: &Path) -> Result<ArtifactMetadata> {
        let file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let name = file.split('-').next().unwrap_or_default().to_string();
        Ok(ArtifactMetadata {
            name: name.clone(),
            epoch: Some(0),
            version: "1.0".to_string(),
            release: "1.el6".to_string(),
            arch: "x86_64".to_string(),
            source_rpm: Some(format!("{name}-1.0-1.el6.src.rpm")),
            build_time: Some(1_345_910_614),
            content: file.as_bytes().to_vec(),
        })
    }
}
