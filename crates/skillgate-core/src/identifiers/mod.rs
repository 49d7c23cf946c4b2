//! Validated identifier types for skills and their reference files.
//!
//! Names coming from a model's tool call are untrusted. They are parsed into
//! these newtypes before any filesystem path is built from them, so a value
//! holding a path separator or a traversal sequence never reaches the path
//! layer.
//!
//! # Examples
//!
//! ```rust
//! use skillgate_core::identifiers::{ReferenceFileName, SkillName};
//!
//! assert!(SkillName::parse("market-sizing").is_ok());
//! assert!(SkillName::parse("../../etc").is_err());
//!
//! assert!(ReferenceFileName::parse("calculator.py").is_ok());
//! assert!(ReferenceFileName::parse("../secrets.txt").is_err());
//! ```

mod validation;

pub use validation::{
    IdValidationError, IdValidator, MAX_REFERENCE_NAME_LENGTH, MAX_SKILL_NAME_LENGTH,
    SkillNameRule,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Name of a skill as accepted by the gateway (permissive rule).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillName(String);

impl SkillName {
    /// Parse a skill name under the permissive rule.
    pub fn parse(name: impl AsRef<str>) -> Result<Self, IdValidationError> {
        IdValidator::validate_skill_name(name.as_ref(), SkillNameRule::Permissive)
            .map(|s| Self(s.to_string()))
    }

    /// Parse a skill name under the canonical (publishing) rule.
    pub fn parse_canonical(name: impl AsRef<str>) -> Result<Self, IdValidationError> {
        IdValidator::validate_skill_name(name.as_ref(), SkillNameRule::Canonical)
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a single relative path component.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SkillName {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SkillName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SkillName> for String {
    fn from(name: SkillName) -> Self {
        name.0
    }
}

impl TryFrom<String> for SkillName {
    type Error = IdValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Name of a file inside a skill directory.
///
/// Only alphanumerics, `.`, `-` and `_` are allowed, so the name is always a
/// single path component. `.` and `..` pass the pattern and are caught by the
/// containment check instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceFileName(String);

impl ReferenceFileName {
    pub fn parse(name: impl AsRef<str>) -> Result<Self, IdValidationError> {
        IdValidator::validate_reference_name(name.as_ref()).map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ReferenceFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReferenceFileName {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ReferenceFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReferenceFileName> for String {
    fn from(name: ReferenceFileName) -> Self {
        name.0
    }
}

impl TryFrom<String> for ReferenceFileName {
    type Error = IdValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_name_round_trips_through_serde() {
        let name: SkillName = serde_json::from_str("\"market-sizing\"").unwrap();
        assert_eq!(name.as_str(), "market-sizing");
        assert!(serde_json::from_str::<SkillName>("\"../etc\"").is_err());
    }

    #[test]
    fn canonical_parse_is_stricter() {
        assert!(SkillName::parse("market_sizing").is_ok());
        assert!(SkillName::parse_canonical("market_sizing").is_err());
    }

    #[test]
    fn from_str_support() {
        let name: SkillName = "research".parse().unwrap();
        assert_eq!(name.to_string(), "research");
        let file: ReferenceFileName = "template.md".parse().unwrap();
        assert_eq!(file.as_str(), "template.md");
    }

    #[test]
    fn parsed_names_are_single_path_components() {
        let name = SkillName::parse("market-sizing").unwrap();
        assert_eq!(name.as_path().components().count(), 1);
        let file = ReferenceFileName::parse("template.md").unwrap();
        assert_eq!(file.as_path().components().count(), 1);
    }
}
