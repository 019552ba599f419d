//! Versioned storage key names.
//!
//! A key has the shape `<name>-v<version>`. An incompatible schema change
//! ships under a new version instead of overwriting old data.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which the active plan is persisted.
pub const PLAN_STORAGE_KEY: &str = "focusdo-plan-v1";

static STORAGE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9]+(?:-[a-z0-9]+)*)-v([1-9][0-9]{0,8})$").expect("valid storage key regex")
});

/// Validated storage key with its parsed schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    raw: String,
    name_len: usize,
    version: u32,
}

impl StorageKey {
    /// Parses and validates a key name.
    pub fn parse(value: &str) -> Result<Self, StorageKeyError> {
        let caps = STORAGE_KEY_RE
            .captures(value)
            .ok_or_else(|| StorageKeyError::Malformed(value.to_string()))?;
        let name_len = caps.get(1).map_or(0, |m| m.len());
        let version = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(|| StorageKeyError::Malformed(value.to_string()))?;

        Ok(Self {
            raw: value.to_string(),
            name_len,
            version,
        })
    }

    /// Key used for the active plan.
    pub fn plan() -> Self {
        Self {
            raw: PLAN_STORAGE_KEY.to_string(),
            name_len: "focusdo-plan".len(),
            version: 1,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Name part without the version suffix.
    pub fn name(&self) -> &str {
        &self.raw[..self.name_len]
    }

    /// Schema version encoded in the key.
    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKeyError {
    Malformed(String),
}

impl Display for StorageKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(
                f,
                "storage key `{value}` must look like `<name>-v<version>`"
            ),
        }
    }
}

impl Error for StorageKeyError {}
