//! Source identifiers and the storage layout derived from them
//!
//! A source identifier names one data-producing device, e.g. `acme_cam01`.
//! The segment before the first `_` is the tenant; the whole string is the
//! device. Raw frames for a device live in the tenant's bucket under one
//! folder per calendar day.

use chrono::NaiveDate;
use std::fmt;

use crate::errors::{AppError, Result};
use crate::storage::to_path;

const SEPARATOR: char = '_';

/// A validated `<tenant>_<device>` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    raw: String,
    tenant_len: usize,
}

impl SourceId {
    /// Parse a raw query value
    ///
    /// Empty input is reported as a missing `Device` parameter. Input without
    /// a separator, with an empty tenant segment, with surrounding whitespace,
    /// or that would not survive as a single object key segment is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(AppError::MissingParameter("Device"));
        }

        // Object store paths percent-encode characters such as `#`, `~` and `[`,
        // which would silently list a different prefix.
        if raw != raw.trim() || raw.contains('/') || to_path(raw).as_ref() != raw {
            return Err(AppError::MalformedIdentifier(raw.to_string()));
        }

        match raw.find(SEPARATOR) {
            Some(0) | None => Err(AppError::MalformedIdentifier(raw.to_string())),
            Some(idx) => Ok(Self {
                raw: raw.to_string(),
                tenant_len: idx,
            }),
        }
    }

    /// Tenant segment (before the first separator)
    pub fn tenant(&self) -> &str {
        &self.raw[..self.tenant_len]
    }

    /// Full device name
    pub fn device(&self) -> &str {
        &self.raw
    }

    /// Bucket holding the tenant's raw data
    pub fn bucket(&self) -> String {
        format!("{}-pilot", self.tenant())
    }

    /// Folder holding one day of full-frame captures
    pub fn day_prefix(&self, day: NaiveDate) -> String {
        format!(
            "{}-raw-data/{}/{}/all_frames/all_frames/",
            self.tenant(),
            self.device(),
            day.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
