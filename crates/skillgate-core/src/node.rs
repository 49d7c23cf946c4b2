//! Node configuration documents.

use crate::error::NodeConfigError;
use crate::frontmatter::{Frontmatter, parse_frontmatter, parse_frontmatter_str};
use crate::skill::ALLOWED_TOOLS_KEY;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One reasoning step's configuration: metadata plus system prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeConfig {
    pub name: String,
    pub description: String,
    /// Markdown body of the document.
    pub system_prompt: String,
    /// Skills this node may reference, in declaration order.
    pub skills: Vec<String>,
    /// Static allow-list of registry tools. Empty binds every registry tool.
    pub allowed_tools: Vec<String>,
}

impl NodeConfig {
    /// Read a node config from a document on disk.
    ///
    /// `name` and `description` are required.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NodeConfigError> {
        let path = path.as_ref();
        let document = parse_frontmatter(path)?;
        Self::from_document(document, path)
    }

    /// Parse a node config held in memory.
    pub fn from_markdown(text: &str) -> Result<Self, NodeConfigError> {
        let document = parse_frontmatter_str(text)?;
        Self::from_document(document, Path::new("<inline>"))
    }

    /// Whether the node restricts which registry tools are bound.
    pub fn has_allowed_tools(&self) -> bool {
        !self.allowed_tools.is_empty()
    }

    fn from_document(document: Frontmatter, path: &Path) -> Result<Self, NodeConfigError> {
        let metadata = &document.metadata;
        let path_buf = || PathBuf::from(path);

        let required = |field: &'static str| -> Result<String, NodeConfigError> {
            metadata
                .string(field)
                .map_err(|_| NodeConfigError::InvalidField {
                    path: path_buf(),
                    field,
                    expected: "a string",
                })?
                .ok_or(NodeConfigError::MissingField {
                    path: path_buf(),
                    field,
                })
        };
        let list = |field: &'static str| -> Result<Vec<String>, NodeConfigError> {
            metadata
                .string_list(field)
                .map_err(|_| NodeConfigError::InvalidField {
                    path: path_buf(),
                    field,
                    expected: "a list of strings",
                })
        };

        Ok(Self {
            name: required("name")?,
            description: required("description")?,
            skills: list("skills")?,
            allowed_tools: list(ALLOWED_TOOLS_KEY)?,
            system_prompt: document.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_fields() {
        let config = NodeConfig::from_markdown(
            "---\nname: analyst\ndescription: Crunches numbers\nskills: [market-sizing]\nallowed-tools:\n  - sql_query\n  - calculate\n---\nYou are an analyst.\n",
        )
        .unwrap();

        assert_eq!(config.name, "analyst");
        assert_eq!(config.description, "Crunches numbers");
        assert_eq!(config.system_prompt, "You are an analyst.");
        assert_eq!(config.skills, vec!["market-sizing"]);
        assert_eq!(config.allowed_tools, vec!["sql_query", "calculate"]);
        assert!(config.has_allowed_tools());
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let config =
            NodeConfig::from_markdown("---\nname: writer\ndescription: Writes\n---\nWrite.").unwrap();
        assert!(config.skills.is_empty());
        assert!(!config.has_allowed_tools());
    }

    #[test]
    fn missing_description_is_reported() {
        let err = NodeConfig::from_markdown("---\nname: writer\n---\nWrite.").unwrap_err();
        assert!(matches!(
            err,
            NodeConfigError::MissingField {
                field: "description",
                ..
            }
        ));
    }

    #[test]
    fn document_without_metadata_lacks_name() {
        let err = NodeConfig::from_markdown("Just a prompt").unwrap_err();
        assert!(matches!(err, NodeConfigError::MissingField { field: "name", .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = NodeConfig::from_file(tmp.path().join("ghost.md")).unwrap_err();
        match err {
            NodeConfigError::Document(doc) => assert!(doc.is_not_found()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skills_must_be_a_list() {
        let err =
            NodeConfig::from_markdown("---\nname: a\ndescription: b\nskills: one\n---\n").unwrap_err();
        assert!(matches!(err, NodeConfigError::InvalidField { field: "skills", .. }));
    }
}
