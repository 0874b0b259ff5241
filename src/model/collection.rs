// src/model/collection.rs

//! Package collections
//!
//! A [`Collection`] groups the packages of one update that target a single
//! release. It is addressed inside its entry by short name or release name.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::xml::Element;

use super::package::Package;

/// A `<collection>`: named set of packages keyed by filename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    release_name: Option<String>,
    short_name: Option<String>,
    packages: IndexMap<String, Package>,
}

impl Collection {
    pub fn new(release_name: Option<&str>, short_name: Option<&str>) -> Self {
        Self {
            release_name: release_name.map(str::to_string),
            short_name: short_name.map(str::to_string),
            packages: IndexMap::new(),
        }
    }

    pub fn release_name(&self) -> Option<&str> {
        self.release_name.as_deref()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Key inside an entry: the short name, else the release name
    pub fn key(&self) -> Option<&str> {
        self.short_name.as_deref().or(self.release_name.as_deref())
    }

    // Stored collections are renamed through `Entry::rename_collection`
    pub(crate) fn set_name(&mut self, release_name: Option<&str>) {
        self.release_name = release_name.map(str::to_string);
    }

    pub(crate) fn set_short_name(&mut self, short_name: Option<&str>) {
        self.short_name = short_name.map(str::to_string);
    }

    /// Add a package keyed by its filename, replacing any package already
    /// stored under that filename
    pub fn add(&mut self, package: Package) -> Result<()> {
        let Some(filename) = package.filename().map(str::to_string) else {
            return Err(Error::MissingField("package filename"));
        };
        self.packages.insert(filename, package);
        Ok(())
    }

    /// Store a package under an explicit key, which must be its filename
    pub fn insert(&mut self, key: &str, package: Package) -> Result<()> {
        match package.filename() {
            Some(filename) if filename == key => {
                self.packages.insert(key.to_string(), package);
                Ok(())
            }
            other => Err(Error::KeyMismatch {
                kind: "package filename",
                key: key.to_string(),
                actual: other.unwrap_or_default().to_string(),
            }),
        }
    }

    pub fn remove(&mut self, filename: &str) -> Option<Package> {
        self.packages.shift_remove(filename)
    }

    pub fn has(&self, filename: &str) -> bool {
        self.packages.contains_key(filename)
    }

    pub fn get(&self, filename: &str) -> Option<&Package> {
        self.packages.get(filename)
    }

    /// Mutable access to a package; its filename cannot be changed this way
    pub fn get_mut(&mut self, filename: &str) -> Option<&mut Package> {
        self.packages.get_mut(filename)
    }

    /// Change the filename of a stored package, keeping its position
    pub fn rename(&mut self, filename: &str, new_filename: &str) -> Result<()> {
        let Some(mut package) = self.packages.get(filename).cloned() else {
            return Err(Error::NotFound {
                kind: "package filename",
                key: filename.to_string(),
            });
        };
        if filename == new_filename {
            return Ok(());
        }
        if self.has(new_filename) {
            return Err(Error::DuplicateKey {
                kind: "package filename",
                key: new_filename.to_string(),
            });
        }

        package.set_filename(new_filename);
        super::rekey(&mut self.packages, filename, new_filename, package);
        Ok(())
    }

    /// Package filenames in insertion order
    pub fn filenames(&self) -> Vec<&str> {
        self.packages.keys().map(String::as_str).collect()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Whether this name matches the release name or short name
    pub fn is_named(&self, name: &str) -> bool {
        self.release_name.as_deref() == Some(name) || self.short_name.as_deref() == Some(name)
    }

    /// Has packages and at least one name
    pub fn is_complete(&self) -> bool {
        !self.packages.is_empty() && (self.release_name.is_some() || self.short_name.is_some())
    }

    /// Absorb another copy of this collection
    ///
    /// Names are only filled when unset here; packages already present are
    /// kept as they are.
    pub fn merge(&mut self, other: Collection) {
        if self.release_name.is_none() {
            self.release_name = other.release_name;
        }
        if self.short_name.is_none() {
            self.short_name = other.short_name;
        }
        for (filename, package) in other.packages {
            self.packages.entry(filename).or_insert(package);
        }
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("collection");
        if let Some(short) = &self.short_name {
            element.set_attr("short", short.as_str());
        }
        if let Some(name) = &self.release_name {
            element.push(Element::new("name").with_text(name.as_str()));
        }
        for package in self.packages.values() {
            element.push(package.to_element());
        }
        element
    }

    pub fn from_element(element: &Element) -> Result<Self> {
        if element.local_name() != "collection" {
            return Err(Error::TypeMismatch {
                expected: "collection",
                found: element.name.clone(),
            });
        }

        let mut collection = Self::new(None, element.attr("short"));
        for child in &element.children {
            match child.local_name() {
                "name" => collection.release_name = child.text().map(|t| t.trim().to_string()),
                "package" => collection.add(Package::from_element(child)?)?,
                _ => {}
            }
        }
        Ok(collection)
    }
}
