//! Pattern validation for skill names and reference file names.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Maximum length of a skill name under either rule set.
pub const MAX_SKILL_NAME_LENGTH: usize = 64;

/// Maximum length of a reference file name.
pub const MAX_REFERENCE_NAME_LENGTH: usize = 255;

static SKILL_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_-]{0,63}$").expect("skill name pattern is a valid regex")
});

// Letter first, then lowercase alphanumerics, each optionally preceded by a
// single hyphen: no trailing or doubled hyphens.
static CANONICAL_SKILL_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z](?:-?[a-z0-9])*$").expect("canonical skill name pattern is a valid regex")
});

static REFERENCE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.-]{1,255}$").expect("reference name pattern is a valid regex")
});

/// Identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    #[error("Identifier cannot be empty")]
    Empty,

    #[error("Identifier too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },

    #[error("Identifier '{value}' does not match {rule}")]
    InvalidPattern { value: String, rule: &'static str },
}

/// Which rule set a skill name is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillNameRule {
    /// Lowercase letter start, then lowercase alphanumerics, `-` or `_`.
    /// Used at runtime when the model names a skill.
    Permissive,
    /// Lowercase alphanumerics and single inner hyphens only.
    /// Used when authoring or publishing a skill.
    Canonical,
}

/// Stateless validator shared by the identifier newtypes.
pub struct IdValidator;

impl IdValidator {
    /// Validate a skill name under the given rule set.
    pub fn validate_skill_name(name: &str, rule: SkillNameRule) -> Result<&str, IdValidationError> {
        if name.is_empty() {
            return Err(IdValidationError::Empty);
        }
        if name.len() > MAX_SKILL_NAME_LENGTH {
            return Err(IdValidationError::TooLong {
                length: name.len(),
                max: MAX_SKILL_NAME_LENGTH,
            });
        }

        let (pattern, rule_name) = match rule {
            SkillNameRule::Permissive => (&*SKILL_NAME_PATTERN, "the skill name pattern"),
            SkillNameRule::Canonical => (
                &*CANONICAL_SKILL_NAME_PATTERN,
                "the canonical skill name pattern",
            ),
        };
        if !pattern.is_match(name) {
            return Err(IdValidationError::InvalidPattern {
                value: name.to_string(),
                rule: rule_name,
            });
        }
        Ok(name)
    }

    /// Validate a reference file name. Path separators are never accepted.
    pub fn validate_reference_name(name: &str) -> Result<&str, IdValidationError> {
        if name.is_empty() {
            return Err(IdValidationError::Empty);
        }
        if name.len() > MAX_REFERENCE_NAME_LENGTH {
            return Err(IdValidationError::TooLong {
                length: name.len(),
                max: MAX_REFERENCE_NAME_LENGTH,
            });
        }
        if !REFERENCE_NAME_PATTERN.is_match(name) {
            return Err(IdValidationError::InvalidPattern {
                value: name.to_string(),
                rule: "the reference file name pattern",
            });
        }
        Ok(name)
    }
}
