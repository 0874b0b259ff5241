// src/lib.rs

//! updateinfo.xml errata metadata
//!
//! Build, parse, merge and write the `updateinfo.xml` documents yum/dnf
//! repositories use to announce security and bugfix updates.
//!
//! # Architecture
//!
//! - Object model: `Updateinfo` → `Entry` → `Collection` → `Package`, plus
//!   `Reference`s per entry, each level keyed (update id, href, collection
//!   name, filename)
//! - Stable wire format: fixed element order, entries sorted by update id
//! - Sticky force overrides applied to existing and future entries
//! - Collaborators at the edges: schema validation, package inspection and
//!   repository metadata are traits with local implementations
//!
//! ```
//! use updateinfo::{Collection, Entry, Package, Updateinfo, XmlOptions};
//!
//! let mut entry = Entry::new("SLID-1");
//! entry.set_update_metainfo("a@b.com", "final", "bugfix");
//! entry.set_title("t");
//! entry.set_issued_date("2012-08-25 16:03:34")?;
//!
//! let mut collection = Collection::new(None, Some("SL6"));
//! collection.add(Package::with_nevra(
//!     "foo-1.0-1.el6.x86_64.rpm", "foo", "1.0", "1.el6", "x86_64",
//! ))?;
//! entry.add_collection(collection)?;
//!
//! let mut document = Updateinfo::new();
//! document.add_entry(entry, false)?;
//! let output = document.to_xml(&XmlOptions::default())?;
//!
//! let parsed = Updateinfo::from_xml_str(&output.xml)?;
//! assert!(parsed.has_filename("foo-1.0-1.el6.x86_64.rpm", None));
//! # Ok::<(), updateinfo::Error>(())
//! ```

pub mod config;
pub mod date;
mod error;
pub mod hash;
pub mod helper;
pub mod inspect;
pub mod model;
pub mod repository;
pub mod validate;
pub mod xml;

pub use config::{HelperConfig, UpdateinfoSettings};
pub use date::{IntoUpdateDate, UpdateDate};
pub use error::{Error, ErrorKind, Result};
pub use hash::ChecksumType;
pub use helper::{AdvisoryIds, AdvisorySource, BuildSummary, EntryFacts, UpdateinfoHelper};
pub use inspect::{ArtifactInspector, ArtifactMetadata, RpmInspector};
pub use model::{
    Checksum, Collection, CollectionOverride, DocumentOverrides, Entry, Package, Reference,
    ReferenceKind, Severity, UpdateStatus, UpdateType, Updateinfo, XmlOptions, XmlOutput,
};
pub use repository::{LocalRepository, RepoIndex, RepoTags, RepositoryIndex};
pub use validate::{SchemaValidator, Validation, XmllintValidator};
