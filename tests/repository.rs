// tests/repository.rs

//! Loading from and registering with local repositories, and the helper's
//! end-to-end build.

mod common;

use common::{create_repo, NameInspector};
use std::collections::HashMap;
use updateinfo::repository::{register_updateinfo, RepoMd};
use updateinfo::{
    AdvisoryIds, AdvisorySource, EntryFacts, HelperConfig, LocalRepository, Reference,
    Result, UpdateDate, Updateinfo, UpdateinfoHelper, Validation, XmlOptions,
};

const EXISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<updates>
  <update from="a@b.com" status="testing" type="bugfix" version="1.4">
    <id>SLBA-1</id>
    <title>old</title>
    <issued date="2012-08-25 16:03:34"/>
    <references/>
    <pkglist>
      <collection short="SL6">
        <name>Scientific Linux 6</name>
        <package epoch="0" name="a" version="1.0" release="1.el6" arch="x86_64">
          <filename>Packages/a-1.0-1.el6.x86_64.rpm</filename>
        </package>
      </collection>
    </pkglist>
  </update>
</updates>
"#;

#[test]
fn test_load_from_repository_applies_tags() {
    let repo = create_repo(
        &[],
        Some(EXISTING),
        &[("content", "final"), ("distro", "Scientific Linux 6.3")],
    );

    let mut doc = Updateinfo::new();
    let loaded = doc
        .load_from_repository(&LocalRepository::new(), repo.path(), true)
        .unwrap();
    assert_eq!(
        loaded,
        Some(repo.path().join("repodata/old-updateinfo.xml"))
    );

    let entry = doc.get("SLBA-1").unwrap();
    assert_eq!(entry.status.as_deref(), Some("final"));
    assert_eq!(entry.release_name.as_deref(), Some("Scientific Linux 6.3"));
    assert_eq!(entry.collection_keys(), ["Scientific Linux 6.3"]);
    assert!(doc.has_filename("Packages/a-1.0-1.el6.x86_64.rpm", Some("Scientific Linux 6.3")));
}

#[test]
fn test_load_from_repository_without_metadata_import() {
    let repo = create_repo(&[], Some(EXISTING), &[("content", "final")]);

    let mut doc = Updateinfo::new();
    doc.load_from_repository(&LocalRepository::new(), repo.path(), false)
        .unwrap();
    let entry = doc.get("SLBA-1").unwrap();
    assert_eq!(entry.status.as_deref(), Some("testing"));
    assert_eq!(entry.collection_keys(), ["SL6"]);
}

#[test]
fn test_repository_without_updateinfo() {
    let repo = create_repo(&["Packages/a.rpm"], None, &[]);
    let mut doc = Updateinfo::new();
    let loaded = doc
        .load_from_repository(&LocalRepository::new(), repo.path(), true)
        .unwrap();
    assert_eq!(loaded, None);
    assert!(doc.is_empty());
}

#[test]
fn test_register_replaces_updateinfo_record() {
    let repo = create_repo(&[], Some(EXISTING), &[]);
    let repodata = repo.path().join("repodata");

    let doc = Updateinfo::from_xml_str(EXISTING).unwrap();
    doc.write_file(
        &repodata.join("updateinfo.xml.gz"),
        &XmlOptions::default().with_validate(false),
    )
    .unwrap();

    let data = register_updateinfo(&repodata, "updateinfo.xml.gz").unwrap();
    assert_eq!(data.location_href, "repodata/updateinfo.xml.gz");
    assert!(data.open_checksum.is_some());

    let repomd = RepoMd::load(&repodata.join("repomd.xml")).unwrap();
    assert_eq!(
        repomd.location("updateinfo").as_deref(),
        Some("repodata/updateinfo.xml.gz")
    );
    assert_eq!(repomd.data("updateinfo").unwrap().checksum, data.checksum);
    assert_eq!(
        repomd.location("primary").as_deref(),
        Some("repodata/primary.xml.gz")
    );
    assert_eq!(repomd.records().len(), 2);
}

struct StaticSource {
    ids: HashMap<&'static str, &'static str>,
}

impl AdvisorySource for StaticSource {
    fn update_ids(&mut self, location: &str) -> Result<Option<AdvisoryIds>> {
        Ok(self
            .ids
            .get(location)
            .map(|id| AdvisoryIds::new(format!("UP-{id}"), *id)))
    }

    fn entry_facts(&mut self, ids: &AdvisoryIds) -> Result<EntryFacts> {
        Ok(EntryFacts {
            update_type: "enhancement".to_string(),
            title: Some(format!("{} enhancement", ids.update_id)),
            issued: Some(UpdateDate::parse("2012-09-01").unwrap()),
            ..Default::default()
        })
    }

    fn references(&mut self, ids: &AdvisoryIds) -> Result<Vec<Reference>> {
        Ok(vec![
            Reference::new("self", format!("http://errata/{}", ids.upstream_id))
                .with_id(ids.upstream_id.as_str()),
        ])
    }
}

#[test]
fn test_helper_build_end_to_end() {
    let repo = create_repo(
        &[
            "Packages/a-1.0-1.el6.x86_64.rpm",
            "Packages/b-1.0-1.el6.x86_64.rpm",
            "Packages/c-1.0-1.el6.x86_64.rpm",
            "Packages/d-1.0-1.el6.x86_64.rpm",
        ],
        Some(EXISTING),
        &[("content", "final"), ("distro", "Scientific Linux 6")],
    );

    let mut config = HelperConfig::new(repo.path());
    config.repo.has_metainfo = true;
    config.metadata.updatefrom = Some("release@example.com".to_string());

    let ids = HashMap::from([
        ("Packages/b-1.0-1.el6.x86_64.rpm", "SLBA-1"),
        ("Packages/c-1.0-1.el6.x86_64.rpm", "SLEA-2"),
    ]);
    let mut helper = UpdateinfoHelper::new(config, StaticSource { ids })
        .with_inspector(NameInspector)
        .with_repository(LocalRepository::new());

    let summary = helper.build().unwrap();
    assert_eq!(summary.output, repo.path().join("repodata/updateinfo.xml"));
    assert_eq!(
        summary.previous,
        Some(repo.path().join("repodata/old-updateinfo.xml"))
    );
    assert_eq!(summary.packages_added, 2);
    assert_eq!(summary.validation, Validation::Unsupported);
    assert!(summary.registered);
    assert_eq!(helper.unknown_packages(), ["Packages/d-1.0-1.el6.x86_64.rpm"]);

    // Previous file is gone, repomd points at the new one
    assert!(!repo.path().join("repodata/old-updateinfo.xml").exists());
    let repomd = RepoMd::load(&repo.path().join("repodata/repomd.xml")).unwrap();
    assert_eq!(
        repomd.location("updateinfo").as_deref(),
        Some("repodata/updateinfo.xml")
    );

    let mut written = Updateinfo::new();
    written.load_file(&summary.output).unwrap();
    assert_eq!(written.ids().collect::<Vec<_>>(), ["SLBA-1", "SLEA-2"]);

    let existing = written.get("SLBA-1").unwrap();
    assert_eq!(existing.status.as_deref(), Some("final"));
    assert_eq!(
        existing.filenames(None).unwrap(),
        [
            "Packages/a-1.0-1.el6.x86_64.rpm",
            "Packages/b-1.0-1.el6.x86_64.rpm"
        ]
    );
    assert_eq!(existing.references(), ["http://errata/UP-SLBA-1"]);

    let new = written.get("SLEA-2").unwrap();
    assert_eq!(new.from.as_deref(), Some("release@example.com"));
    assert_eq!(new.status.as_deref(), Some("final"));
    assert_eq!(new.release_name.as_deref(), Some("Scientific Linux 6"));
    assert_eq!(new.collection_keys(), ["Scientific Linux 6"]);
    assert!(new.validate_complete().unwrap());

    let package = new
        .collection("Scientific Linux 6")
        .unwrap()
        .get("Packages/c-1.0-1.el6.x86_64.rpm")
        .unwrap();
    assert_eq!(package.name.as_deref(), Some("c"));
    assert_eq!(package.srpm.as_deref(), Some("c-1.0-1.el6.src.rpm"));
    assert_eq!(package.sums.len(), 1);
    assert_eq!(package.sums[0].kind, "sha256");
}

#[test]
fn test_helper_skips_registration_outside_repodata() {
    let repo = create_repo(&[], None, &[]);
    let elsewhere = tempfile::tempdir().unwrap();

    let mut config = HelperConfig::new(repo.path());
    config.xml.filename = elsewhere
        .path()
        .join("updateinfo.xml")
        .to_string_lossy()
        .into_owned();
    config.xml.validate = false;

    let mut helper = UpdateinfoHelper::new(config, StaticSource { ids: HashMap::new() })
        .with_inspector(NameInspector);
    let summary = helper.build().unwrap();
    assert!(!summary.registered);
    assert_eq!(summary.validation, Validation::Skipped);
    assert!(elsewhere.path().join("updateinfo.xml").exists());

    let repomd = RepoMd::load(&repo.path().join("repodata/repomd.xml")).unwrap();
    assert_eq!(repomd.location("updateinfo"), None);
}
