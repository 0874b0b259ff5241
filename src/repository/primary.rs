// src/repository/primary.rs

//! Package locations from `primary` metadata

use crate::error::{Error, Result};
use crate::xml;

/// List the `<location href>` of every `<package>` in a primary.xml document
pub fn parse_primary_locations(xml_text: &str) -> Result<Vec<String>> {
    let root = xml::parse_document(xml_text)?;
    if root.local_name() != "metadata" {
        return Err(Error::TypeMismatch {
            expected: "metadata",
            found: root.name,
        });
    }

    Ok(root
        .children_named("package")
        .filter_map(|package| package.child("location"))
        .filter_map(|location| location.attr("href"))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_in_document_order() {
        let primary = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xmlns="http://linux.duke.edu/metadata/common" xmlns:rpm="http://linux.duke.edu/metadata/rpm" packages="2">
<package type="rpm">
  <name>foo</name>
  <arch>x86_64</arch>
  <location href="Packages/foo-1.0-1.el6.x86_64.rpm"/>
  <format><rpm:license>GPL</rpm:license></format>
</package>
<package type="rpm">
  <name>bar</name>
  <location href="Packages/bar-2.0-1.el6.noarch.rpm"/>
</package>
</metadata>"#;
        assert_eq!(
            parse_primary_locations(primary).unwrap(),
            [
                "Packages/foo-1.0-1.el6.x86_64.rpm",
                "Packages/bar-2.0-1.el6.noarch.rpm"
            ]
        );
    }

    #[test]
    fn test_wrong_root() {
        assert!(matches!(
            parse_primary_locations("<updates/>"),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
