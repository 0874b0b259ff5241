// tests/roundtrip.rs

//! Serialize/parse round trips of whole documents.

mod common;

use common::{entry_with, scenario_entry, SCENARIO_FILE};
use updateinfo::{Updateinfo, UpdateDate, Validation, XmlOptions};

#[test]
fn test_scenario_round_trip() {
    let mut doc = Updateinfo::new();
    let entry = scenario_entry();
    assert!(entry.validate_complete().unwrap());
    doc.add_entry(entry, false).unwrap();

    let output = doc.to_xml(&XmlOptions::default()).unwrap();
    assert_eq!(output.validation, Validation::Unsupported);
    assert!(output.xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

    let parsed = Updateinfo::from_xml_str(&output.xml).unwrap();
    let entry = parsed.get("SLID-1").unwrap();
    assert_eq!(entry.status.as_deref(), Some("final"));
    assert_eq!(entry.from.as_deref(), Some("a@b.com"));
    assert_eq!(entry.update_type.as_deref(), Some("bugfix"));
    assert_eq!(entry.title.as_deref(), Some("t"));
    assert_eq!(
        entry.issued_date,
        Some(UpdateDate::parse("2012-08-25 16:03:34").unwrap())
    );
    assert_eq!(entry.collection_keys(), ["SL6"]);

    let package = entry.collection("SL6").unwrap().get(SCENARIO_FILE).unwrap();
    assert_eq!(package.name.as_deref(), Some("foo"));
    assert_eq!(package.version.as_deref(), Some("1.0"));
    assert_eq!(package.release.as_deref(), Some("1.el6"));
    assert_eq!(package.arch.as_deref(), Some("x86_64"));
    assert_eq!(package.epoch.as_deref(), Some("0"));

    assert!(parsed.has_filename(SCENARIO_FILE, None));
    assert!(entry.validate_complete().unwrap());
}

#[test]
fn test_output_is_stable_across_round_trips() {
    let mut doc = Updateinfo::new();
    doc.add_entry(entry_with("B-2", "L6", &["b.rpm"], "http://bugs/2"), false)
        .unwrap();
    doc.add_entry(
        entry_with("A-1", "L6", &["a.rpm", "c.rpm"], "http://bugs/1"),
        false,
    )
    .unwrap();

    for pretty in [false, true] {
        let options = XmlOptions::default()
            .with_validate(false)
            .with_pretty(pretty)
            .with_comment("generated\\nby tests");
        let first = doc.to_xml(&options).unwrap().xml;
        let second = Updateinfo::from_xml_str(&first)
            .unwrap()
            .to_xml(&options)
            .unwrap()
            .xml;
        assert_eq!(first, second);
        assert!(first.contains("<!-- \ngenerated\nby tests\n-->"));
        assert!(first.find("A-1").unwrap() < first.find("B-2").unwrap());
    }
}

#[test]
fn test_parse_handwritten_document() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- comment before the root -->
<updates>
  <update from="security@example.com" status="stable" type="security" version="2.0">
    <id>EXSA-2019:1</id>
    <title>Important: kernel security update</title>
    <severity>Important</severity>
    <release>Example Linux 7</release>
    <issued date="2019-05-09"/>
    <updated date="2019-05-10 12:00:00"/>
    <reboot_suggested>true</reboot_suggested>
    <description>Fixes &lt;CVE-2019-1&gt;.</description>
    <references>
      <reference href="https://cve.example/CVE-2019-1" id="CVE-2019-1" type="cve" title="CVE-2019-1"/>
    </references>
    <pkglist>
      <collection short="EL7">
        <name>Example Linux 7</name>
        <!-- package comment -->
        <package name="kernel" version="3.10.0" release="957.el7" epoch="0" arch="x86_64" src="http://mirror/SRPMS/kernel-3.10.0-957.el7.src.rpm">
          <filename>kernel-3.10.0-957.el7.x86_64.rpm</filename>
          <sum type="sha256">abc123</sum>
          <reboot_suggested>true</reboot_suggested>
        </package>
      </collection>
    </pkglist>
    <unknown_extension/>
  </update>
</updates>
"#;
    let doc = Updateinfo::from_xml_str(xml).unwrap();
    let entry = doc.get("EXSA-2019:1").unwrap();
    assert_eq!(entry.schema_version, "2.0");
    assert_eq!(entry.severity.as_deref(), Some("Important"));
    assert_eq!(entry.description.as_deref(), Some("Fixes <CVE-2019-1>."));
    assert_eq!(
        entry.issued_date.unwrap().to_string(),
        "2019-05-09 00:00:00"
    );
    assert!(entry.reboot_suggested);
    assert!(doc.has_reference_url("https://cve.example/CVE-2019-1"));
    assert_eq!(
        entry
            .reference("https://cve.example/CVE-2019-1")
            .unwrap()
            .title
            .as_deref(),
        Some("CVE-2019-1")
    );

    let collection = entry.collection("Example Linux 7").unwrap();
    let package = collection.get("kernel-3.10.0-957.el7.x86_64.rpm").unwrap();
    assert_eq!(package.src_url_base(), Some("http://mirror/SRPMS/"));
    assert_eq!(package.srpm.as_deref(), Some("kernel-3.10.0-957.el7.src.rpm"));
    assert_eq!(package.sums[0].value, "abc123");
    assert!(package.reboot_suggested);

    // Severity is stored as read; the completeness check flags the casing
    assert!(entry.validate_complete().is_err());
}

#[test]
fn test_malformed_date_in_document() {
    let xml = r#"<updates><update><id>X</id><issued date="soon"/></update></updates>"#;
    let err = Updateinfo::from_xml_str(xml).unwrap_err();
    assert!(matches!(err, updateinfo::Error::InvalidDate(_)));
}

#[test]
fn test_write_file_gz_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repodata").join("updateinfo.xml.gz");

    let mut doc = Updateinfo::new();
    doc.add_entry(scenario_entry(), false).unwrap();
    let validation = doc
        .write_file(&path, &XmlOptions::default().with_validate(false))
        .unwrap();
    assert_eq!(validation, Validation::Skipped);

    // gzip magic
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let mut loaded = Updateinfo::new();
    assert_eq!(loaded.load_file(&path).unwrap(), 1);
    assert_eq!(loaded.to_element(), doc.to_element());
}

#[test]
fn test_append_to_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("updateinfo.xml");

    let mut first = Updateinfo::new();
    first
        .add_entry(entry_with("A-1", "L6", &["a.rpm"], "http://bugs/1"), false)
        .unwrap();
    first
        .write_file(&path, &XmlOptions::default().with_validate(false))
        .unwrap();

    let mut second = Updateinfo::new();
    second
        .add_entry(entry_with("B-2", "L6", &["b.rpm"], "http://bugs/2"), false)
        .unwrap();
    second.append_to_file(&path, true).unwrap();

    let mut loaded = Updateinfo::new();
    assert_eq!(loaded.load_file(&path).unwrap(), 2);
    assert_eq!(loaded.ids().collect::<Vec<_>>(), ["A-1", "B-2"]);
}

#[test]
fn test_append_to_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("updateinfo.xml");
    Updateinfo::new()
        .write_file(&path, &XmlOptions::default().with_validate(false))
        .unwrap();

    let mut doc = Updateinfo::new();
    doc.add_entry(scenario_entry(), false).unwrap();
    doc.append_to_file(&path, false).unwrap();

    let mut loaded = Updateinfo::new();
    loaded.load_file(&path).unwrap();
    assert!(loaded.has_filename(SCENARIO_FILE, Some("SL6")));
}

#[test]
fn test_append_requires_updates_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.xml");
    std::fs::write(&path, "<metadata/>").unwrap();

    let mut doc = Updateinfo::new();
    doc.add_entry(scenario_entry(), false).unwrap();
    let err = doc.append_to_file(&path, false).unwrap_err();
    assert!(matches!(err, updateinfo::Error::Repository { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<metadata/>");
}

#[test]
fn test_append_to_gz_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("updateinfo.xml.gz");

    let mut first = Updateinfo::new();
    first
        .add_entry(entry_with("A-1", "L6", &["a.rpm"], "http://bugs/1"), false)
        .unwrap();
    first
        .write_file(&path, &XmlOptions::default().with_validate(false))
        .unwrap();

    let mut second = Updateinfo::new();
    second
        .add_entry(entry_with("B-2", "L6", &["b.rpm"], "http://bugs/2"), false)
        .unwrap();
    second.append_to_file(&path, false).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let mut loaded = Updateinfo::new();
    assert_eq!(loaded.load_file(&path).unwrap(), 2);
    assert_eq!(loaded.ids().collect::<Vec<_>>(), ["A-1", "B-2"]);
}
