// src/error.rs

//! Error types for updateinfo operations
//!
//! Every failure carries the field or key it concerns so build tooling can
//! report something actionable. [`Error::kind`] groups the variants into the
//! broad classes callers usually branch on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An element of the wrong kind was handed to a constructor
    TypeMismatch,
    /// Missing, duplicate or malformed data
    ValueInvalid,
    /// Incompatible configuration (forced collection names combined with merging)
    StateConflict,
    /// The external schema validator rejected the document
    SchemaInvalid,
    /// Failure reading or writing at the I/O boundary
    Io,
}

/// Errors produced while building, parsing, merging or writing updateinfo data
#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected <{expected}> element, found <{found}>")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Duplicate {kind}: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("Key {key:?} does not match {kind} {actual:?}")]
    KeyMismatch {
        kind: &'static str,
        key: String,
        actual: String,
    },

    #[error("Invalid date {0:?}: expected unix seconds, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidDate(String),

    #[error("Invalid source URL base {0:?}: must start with http:// or ftp://")]
    InvalidUrl(String),

    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedChecksum(String),

    #[error("Invalid {field} {value:?}: expected one of {allowed}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("No {kind} {key:?}")]
    NotFound { kind: &'static str, key: String },

    #[error("No such collection {name:?} (have: {available})")]
    NoSuchCollection { name: String, available: String },

    #[error("Not an updateinfo document: root element is <{0}>")]
    UnexpectedRoot(String),

    #[error("Cannot merge while a collection name is being forced")]
    ForcedCollectionMerge,

    #[error("Schema validation failed: {0}")]
    SchemaInvalid(String),

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to inspect package {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("Repository error at {path}: {reason}")]
    Repository { path: PathBuf, reason: String },
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::MissingField(_)
            | Self::DuplicateKey { .. }
            | Self::KeyMismatch { .. }
            | Self::InvalidDate(_)
            | Self::InvalidUrl(_)
            | Self::UnsupportedChecksum(_)
            | Self::InvalidEnum { .. }
            | Self::NotFound { .. }
            | Self::NoSuchCollection { .. }
            | Self::UnexpectedRoot(_)
            | Self::Config(_) => ErrorKind::ValueInvalid,
            Self::ForcedCollectionMerge => ErrorKind::StateConflict,
            Self::SchemaInvalid(_) => ErrorKind::SchemaInvalid,
            Self::Xml(_) | Self::Io(_) | Self::Artifact { .. } | Self::Repository { .. } => {
                ErrorKind::Io
            }
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(error.into())
    }
}

/// Result type for updateinfo operations
pub type Result<T> = std::result::Result<T, Error>;
