// src/model/kinds.rs

//! Enumerated update fields
//!
//! Entries store these fields as text so that documents carrying values
//! outside the known sets still load; [`crate::Entry::validate_complete`]
//! checks them against the enums below.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Release status of an update (`<update status="...">`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateStatus {
    Stable,
    Testing,
    Final,
}

impl UpdateStatus {
    pub const ALLOWED: &'static str = "stable, testing, final";

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Stable => "stable",
            UpdateStatus::Testing => "testing",
            UpdateStatus::Final => "final",
        }
    }
}

impl FromStr for UpdateStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(UpdateStatus::Stable),
            "testing" => Ok(UpdateStatus::Testing),
            "final" => Ok(UpdateStatus::Final),
            _ => Err(Error::InvalidEnum {
                field: "status",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Kind of update (`<update type="...">`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    Recommended,
    Security,
    Optional,
    Feature,
    Bugfix,
    Enhancement,
    Newpackage,
}

impl UpdateType {
    pub const ALLOWED: &'static str =
        "recommended, security, optional, feature, bugfix, enhancement, newpackage";

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Recommended => "recommended",
            UpdateType::Security => "security",
            UpdateType::Optional => "optional",
            UpdateType::Feature => "feature",
            UpdateType::Bugfix => "bugfix",
            UpdateType::Enhancement => "enhancement",
            UpdateType::Newpackage => "newpackage",
        }
    }
}

impl FromStr for UpdateType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(UpdateType::Recommended),
            "security" => Ok(UpdateType::Security),
            "optional" => Ok(UpdateType::Optional),
            "feature" => Ok(UpdateType::Feature),
            "bugfix" => Ok(UpdateType::Bugfix),
            "enhancement" => Ok(UpdateType::Enhancement),
            "newpackage" => Ok(UpdateType::Newpackage),
            _ => Err(Error::InvalidEnum {
                field: "type",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Security severity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    Important,
    Moderate,
    Low,
}

impl Severity {
    pub const ALLOWED: &'static str = "critical, important, moderate, low";

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "important" => Ok(Severity::Important),
            "moderate" => Ok(Severity::Moderate),
            "low" => Ok(Severity::Low),
            _ => Err(Error::InvalidEnum {
                field: "severity",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Type of a cross-reference
///
/// Unknown type names are kept as [`ReferenceKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Bugzilla,
    Cve,
    Security,
    /// The update's own announcement (`type="self"`)
    SelfRef,
    Other,
    Vendor,
    Custom(String),
}

impl ReferenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ReferenceKind::Bugzilla => "bugzilla",
            ReferenceKind::Cve => "cve",
            ReferenceKind::Security => "security",
            ReferenceKind::SelfRef => "self",
            ReferenceKind::Other => "other",
            ReferenceKind::Vendor => "vendor",
            ReferenceKind::Custom(name) => name,
        }
    }
}

impl From<&str> for ReferenceKind {
    fn from(s: &str) -> Self {
        match s {
            "bugzilla" => ReferenceKind::Bugzilla,
            "cve" => ReferenceKind::Cve,
            "security" => ReferenceKind::Security,
            "self" => ReferenceKind::SelfRef,
            "other" => ReferenceKind::Other,
            "vendor" => ReferenceKind::Vendor,
            other => ReferenceKind::Custom(other.to_string()),
        }
    }
}

macro_rules! text_conversions {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

text_conversions!(UpdateStatus, UpdateType, Severity, ReferenceKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("final".parse::<UpdateStatus>().unwrap(), UpdateStatus::Final);
        let err = "released".parse::<UpdateStatus>().unwrap_err();
        assert!(matches!(err, Error::InvalidEnum { field: "status", .. }));
    }

    #[test]
    fn test_type_round_trip_names() {
        for name in UpdateType::ALLOWED.split(", ") {
            let parsed: UpdateType = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn test_severity_case_insensitive() {
        assert_eq!("Important".parse::<Severity>().unwrap(), Severity::Important);
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_reference_kind_custom() {
        assert_eq!(ReferenceKind::from("self"), ReferenceKind::SelfRef);
        let custom = ReferenceKind::from("rhsa");
        assert_eq!(custom.as_str(), "rhsa");
        assert_eq!(String::from(custom), "rhsa");
    }
}
