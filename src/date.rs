// src/date.rs

//! Issued, updated and build dates
//!
//! Every date handled by the model, whether set by a caller or read back
//! from a document, is normalized into an [`UpdateDate`]. Accepted inputs:
//!
//! - Unix seconds, as an integer or an all-digit string (taken as UTC)
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DD HH:MM:SS` (a `T` separator is accepted too)
//! - any of the string forms followed by ` UTC` or `Z`
//! - native `chrono` values
//!
//! Dates are written back as `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Output format of a serialized date
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A normalized date as stored on entries and packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UpdateDate(NaiveDateTime);

impl UpdateDate {
    /// Parse a date string in any of the accepted forms
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_suffix(" UTC")
            .or_else(|| trimmed.strip_suffix('Z'))
            .unwrap_or(trimmed);

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let secs: i64 = trimmed
                .parse()
                .map_err(|_| Error::InvalidDate(s.to_string()))?;
            return Self::from_timestamp(secs).map_err(|_| Error::InvalidDate(s.to_string()));
        }

        for format in [DATE_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(dt));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
            .ok_or_else(|| Error::InvalidDate(s.to_string()))
    }

    /// Convert Unix seconds (UTC)
    pub fn from_timestamp(secs: i64) -> Result<Self> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(|dt| Self(dt.naive_utc()))
            .ok_or_else(|| Error::InvalidDate(secs.to_string()))
    }

    /// The underlying naive date-time
    #[inline]
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Unix seconds, treating the stored value as UTC
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.0.and_utc().timestamp()
    }
}

impl fmt::Display for UpdateDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for UpdateDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for UpdateDate {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl From<DateTime<Utc>> for UpdateDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.naive_utc())
    }
}

/// Anything a date setter accepts
pub trait IntoUpdateDate {
    fn into_update_date(self) -> Result<UpdateDate>;
}

impl IntoUpdateDate for UpdateDate {
    fn into_update_date(self) -> Result<UpdateDate> {
        Ok(self)
    }
}

impl IntoUpdateDate for &str {
    fn into_update_date(self) -> Result<UpdateDate> {
        UpdateDate::parse(self)
    }
}

impl IntoUpdateDate for String {
    fn into_update_date(self) -> Result<UpdateDate> {
        UpdateDate::parse(&self)
    }
}

impl IntoUpdateDate for &String {
    fn into_update_date(self) -> Result<UpdateDate> {
        UpdateDate::parse(self)
    }
}

impl IntoUpdateDate for i64 {
    fn into_update_date(self) -> Result<UpdateDate> {
        UpdateDate::from_timestamp(self)
    }
}

impl IntoUpdateDate for u64 {
    fn into_update_date(self) -> Result<UpdateDate> {
        let secs = i64::try_from(self).map_err(|_| Error::InvalidDate(self.to_string()))?;
        UpdateDate::from_timestamp(secs)
    }
}

impl IntoUpdateDate for NaiveDateTime {
    fn into_update_date(self) -> Result<UpdateDate> {
        Ok(UpdateDate(self))
    }
}

impl IntoUpdateDate for DateTime<Utc> {
    fn into_update_date(self) -> Result<UpdateDate> {
        Ok(UpdateDate::from(self))
    }
}
