// src/model/reference.rs

//! Cross-references from an update to bug trackers, CVEs and advisories

use crate::error::{Error, Result};
use crate::xml::Element;

use super::kinds::ReferenceKind;

/// A single `<reference>` of an update
///
/// References are identified by `href` within their entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub ref_type: String,
    pub href: String,
    pub id: Option<String>,
    pub title: Option<String>,
}

impl Reference {
    pub fn new(ref_type: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            ref_type: ref_type.into(),
            href: href.into(),
            id: None,
            title: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(&self) -> ReferenceKind {
        ReferenceKind::from(self.ref_type.as_str())
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("reference")
            .with_attr("type", self.ref_type.as_str())
            .with_attr("href", self.href.as_str());
        if let Some(id) = &self.id {
            element.set_attr("id", id.as_str());
        }
        if let Some(title) = &self.title {
            element.text = Some(title.clone());
        }
        element
    }

    /// Build from a `<reference>` element
    ///
    /// The title is read from the element text, falling back to a `title`
    /// attribute as written by other updateinfo generators.
    pub fn from_element(element: &Element) -> Result<Self> {
        if element.local_name() != "reference" {
            return Err(Error::TypeMismatch {
                expected: "reference",
                found: element.name.clone(),
            });
        }

        let title = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| element.attr("title"))
            .map(str::to_string);

        Ok(Self {
            ref_type: element.attr("type").unwrap_or_default().to_string(),
            href: element.attr("href").unwrap_or_default().to_string(),
            id: element.attr("id").map(str::to_string),
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_shape() {
        let reference = Reference::new(ReferenceKind::Cve, "http://cve/CVE-2012-1")
            .with_id("CVE-2012-1")
            .with_title("Overflow");
        let element = reference.to_element();
        assert_eq!(element.name, "reference");
        assert_eq!(element.attr("type"), Some("cve"));
        assert_eq!(element.attr("href"), Some("http://cve/CVE-2012-1"));
        assert_eq!(element.attr("id"), Some("CVE-2012-1"));
        assert_eq!(element.text(), Some("Overflow"));

        assert_eq!(Reference::from_element(&element).unwrap(), reference);
    }

    #[test]
    fn test_title_attribute_accepted() {
        let element = Element::new("reference")
            .with_attr("type", "bugzilla")
            .with_attr("href", "http://bugs/1")
            .with_attr("title", "crash");
        let reference = Reference::from_element(&element).unwrap();
        assert_eq!(reference.title.as_deref(), Some("crash"));
        assert_eq!(reference.kind(), ReferenceKind::Bugzilla);
        assert_eq!(reference.id, None);
    }

    #[test]
    fn test_wrong_element_rejected() {
        let err = Reference::from_element(&Element::new("package")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: "reference", .. }));
    }
}
