// src/model/mod.rs

//! updateinfo object model
//!
//! The document is a strict ownership tree:
//!
//! ```text
//! Updateinfo ── Entry (by update id)
//!                 ├── Reference (by href)
//!                 └── Collection (by short name or release name)
//!                       └── Package (by filename)
//! ```
//!
//! Every level converts to and from an [`crate::xml::Element`] with the
//! exact element layout consumers of `updateinfo.xml` expect.
//!
//! A child's key is derived from the child itself (id, filename, names), so
//! the fields it is derived from are read-only once the child is stored.
//! Renaming goes through the owning container.

mod collection;
mod entry;
mod kinds;
mod overrides;
mod package;
mod reference;
mod updateinfo;

pub use collection::Collection;
pub use entry::{Entry, DEFAULT_SCHEMA_VERSION};
pub use kinds::{ReferenceKind, Severity, UpdateStatus, UpdateType};
pub use overrides::{CollectionOverride, DocumentOverrides};
pub use package::{Checksum, Package};
pub use reference::Reference;
pub use updateinfo::{Updateinfo, XmlOptions, XmlOutput};

/// Replace `old` with `new` in an ordered map, keeping its position
pub(crate) fn rekey<V>(map: &mut indexmap::IndexMap<String, V>, old: &str, new: &str, value: V) {
    let mut value = Some(value);
    *map = std::mem::take(map)
        .into_iter()
        .map(|(key, current)| {
            if key == old {
                (new.to_string(), value.take().unwrap_or(current))
            } else {
                (key, current)
            }
        })
        .collect();
}
