// src/validate.rs

//! Schema validation hook
//!
//! The library does not implement XML Schema itself. Documents are handed to
//! a [`SchemaValidator`]; the stock one runs `xmllint --noout --schema`.
//! When no validator or no schema is configured, validation reports
//! [`Validation::Unsupported`] instead of failing.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Outcome of a validation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Validation was not requested
    Skipped,
    /// The validator accepted the document
    Passed,
    /// Validation was requested but no validator or schema is available
    Unsupported,
}

/// External schema validator
pub trait SchemaValidator: Send + Sync + fmt::Debug {
    /// Validate `xml` against the schema at `schema`
    ///
    /// A rejected document is reported as [`Error::SchemaInvalid`].
    fn validate(&self, xml: &str, schema: &Path) -> Result<()>;
}

/// Validator backed by libxml2's `xmllint`
#[derive(Debug, Clone)]
pub struct XmllintValidator {
    program: PathBuf,
}

impl XmllintValidator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate `xmllint` on `PATH`
    pub fn find() -> Option<Self> {
        which::which("xmllint").ok().map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SchemaValidator for XmllintValidator {
    fn validate(&self, xml: &str, schema: &Path) -> Result<()> {
        let mut document = tempfile::Builder::new()
            .prefix("updateinfo-")
            .suffix(".xml")
            .tempfile()?;
        document.write_all(xml.as_bytes())?;
        document.flush()?;

        debug!(
            "Validating {} against {}",
            document.path().display(),
            schema.display()
        );
        let output = Command::new(&self.program)
            .arg("--noout")
            .arg("--schema")
            .arg(schema)
            .arg(document.path())
            .output()?;

        if !output.status.success() {
            return Err(Error::SchemaInvalid(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}
