//! Opaque identifiers used throughout the bridge.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Rejects a process guid, instance guid, or other identifier that isn't
/// composed entirely of the URL-safe subset `[A-Za-z0-9_-]`.
#[derive(Debug, thiserror::Error)]
#[error("invalid guid: {0:?}")]
pub struct InvalidGuid(String);

/// Opaque identifier for a desired application specification.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessGuid(String);

impl ProcessGuid {
    /// Returns the guid's string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProcessGuid {
    type Err = InvalidGuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !GUID_PATTERN.is_match(s) {
            return Err(InvalidGuid(s.to_string()));
        }
        Ok(ProcessGuid(s.to_string()))
    }
}

/// Opaque identifier for a specific instance incarnation. May be empty for
/// not-yet-placed instances, so unlike [`ProcessGuid`] this does not
/// validate the guid charset.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceGuid(pub String);

impl InstanceGuid {
    /// An instance guid denoting an unplaced instance.
    pub fn empty() -> InstanceGuid {
        InstanceGuid(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the host running an instance. Empty when unplaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub String);

impl CellId {
    pub fn empty() -> CellId {
        CellId(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative instance ordinal within a process, `0 <= index < instances`.
pub type Index = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_unsafe_characters() {
        assert!("".parse::<ProcessGuid>().is_err());
        assert!("has a space".parse::<ProcessGuid>().is_err());
        assert!("has/slash".parse::<ProcessGuid>().is_err());
        assert!("valid-guid_123".parse::<ProcessGuid>().is_ok());
    }
}
