//! Skill bundles: a `SKILL.md` descriptor plus optional reference files.

use crate::error::{SkillError, SkillResult};
use crate::frontmatter::parse_frontmatter;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Descriptor file name inside every skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Metadata key listing the tools a skill unlocks.
pub const ALLOWED_TOOLS_KEY: &str = "allowed-tools";

/// One discoverable skill, read fresh from disk.
///
/// Bundles are never cached. Every access re-reads the descriptor, so edits
/// on disk are visible immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillBundle {
    /// Name declared in the descriptor. Empty when the descriptor has none.
    pub name: String,
    pub description: String,
    /// Markdown body, injected into the conversation on load.
    pub instructions: String,
    /// Tools this skill unlocks. Empty means every registered tool.
    pub allowed_tools: Vec<String>,
    pub directory: PathBuf,
    /// Sibling files of the descriptor, sorted, descriptor excluded.
    pub reference_files: Vec<String>,
}

impl SkillBundle {
    /// Read a bundle from `directory`.
    ///
    /// The declared `name` is taken as-is; a descriptor without one produces an
    /// empty name, which [`is_named`](Self::is_named) checks and discovery skips.
    pub fn from_directory(directory: impl AsRef<Path>) -> SkillResult<Self> {
        Self::read(directory.as_ref(), false)
    }

    /// Read a bundle, naming it after its directory when the descriptor omits
    /// `name`. Kept for skill trees written before names were mandatory.
    pub fn from_directory_lenient(directory: impl AsRef<Path>) -> SkillResult<Self> {
        Self::read(directory.as_ref(), true)
    }

    /// Path of the descriptor inside `directory`.
    pub fn descriptor_path(directory: impl AsRef<Path>) -> PathBuf {
        directory.as_ref().join(SKILL_FILE)
    }

    /// Whether `directory` holds a descriptor file.
    pub fn has_descriptor(directory: impl AsRef<Path>) -> bool {
        Self::descriptor_path(directory).is_file()
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether this skill restricts the tool set.
    pub fn restricts_tools(&self) -> bool {
        !self.allowed_tools.is_empty()
    }

    /// Name of the directory the bundle was read from.
    pub fn directory_name(&self) -> Option<&str> {
        self.directory.file_name().and_then(|name| name.to_str())
    }

    fn read(directory: &Path, fallback_to_directory_name: bool) -> SkillResult<Self> {
        let descriptor = Self::descriptor_path(directory);
        let document = parse_frontmatter(&descriptor)?;
        let metadata = &document.metadata;

        let invalid = |field: &'static str, expected: &'static str| SkillError::InvalidField {
            path: descriptor.clone(),
            field,
            expected,
        };

        let declared_name = metadata
            .string("name")
            .map_err(|_| invalid("name", "a string"))?;
        let name = match declared_name {
            Some(name) => name,
            None if fallback_to_directory_name => directory
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => String::new(),
        };

        let description = metadata
            .string("description")
            .map_err(|_| invalid("description", "a string"))?
            .unwrap_or_default();
        let allowed_tools = metadata
            .string_list(ALLOWED_TOOLS_KEY)
            .map_err(|_| invalid(ALLOWED_TOOLS_KEY, "a list of strings"))?;

        Ok(Self {
            name,
            description,
            instructions: document.body,
            allowed_tools,
            directory: directory.to_path_buf(),
            reference_files: list_reference_files(directory)?,
        })
    }
}

fn list_reference_files(directory: &Path) -> SkillResult<Vec<String>> {
    let io_error = |source| SkillError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        if !entry.file_type().map_err(io_error)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != SKILL_FILE {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}
