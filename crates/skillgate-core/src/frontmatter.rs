//! Frontmatter document parser.
//!
//! Node configs and skill descriptors share one document format: an optional
//! YAML metadata block opened and closed by a `---` marker, followed by a
//! markdown body.
//!
//! ```text
//! ---
//! name: market-sizing
//! description: Estimate TAM, SAM and SOM
//! allowed-tools: [web_search, calculate]
//! ---
//! # Instructions
//! ...
//! ```
//!
//! The document is split on the first two marker occurrences, so the body may
//! not contain a second metadata block. A document that does not start with
//! the marker has no metadata and its whole text is the body.

use crate::error::{DocumentError, DocumentResult};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Marker delimiting the metadata block.
pub const FRONTMATTER_MARKER: &str = "---";

/// The metadata value had a different shape than the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidShape;

/// Decoded metadata block.
///
/// Keys are kept as strings; non-string YAML keys (numbers, booleans) are
/// stringified so they can still be looked up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    /// Raw YAML value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String value for a key.
    ///
    /// Missing keys and explicit `null` are `Ok(None)`; anything other than a
    /// string is [`InvalidShape`].
    pub fn string(&self, key: &str) -> Result<Option<String>, InvalidShape> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(InvalidShape),
        }
    }

    /// List-of-strings value for a key.
    ///
    /// Missing keys and explicit `null` yield an empty list.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, InvalidShape> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(InvalidShape),
                })
                .collect(),
            Some(_) => Err(InvalidShape),
        }
    }

    /// Iterate over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A parsed document: metadata plus trimmed body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub metadata: Metadata,
    pub body: String,
}

/// Parse a document from disk.
///
/// Fails with [`DocumentError::NotFound`] when `path` does not exist. YAML
/// decoding errors are propagated as [`DocumentError::Yaml`] with the decoder's
/// error as the source.
pub fn parse_frontmatter(path: impl AsRef<Path>) -> DocumentResult<Frontmatter> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_document(&text, path)
}

/// Parse a document held in memory.
pub fn parse_frontmatter_str(text: &str) -> DocumentResult<Frontmatter> {
    parse_document(text, Path::new("<inline>"))
}

fn parse_document(text: &str, origin: &Path) -> DocumentResult<Frontmatter> {
    if !text.starts_with(FRONTMATTER_MARKER) {
        return Ok(Frontmatter {
            metadata: Metadata::default(),
            body: text.trim().to_string(),
        });
    }

    let mut parts = text.splitn(3, FRONTMATTER_MARKER);
    let (Some(_), Some(raw_metadata), Some(body)) = (parts.next(), parts.next(), parts.next())
    else {
        return Ok(Frontmatter {
            metadata: Metadata::default(),
            body: text.trim().to_string(),
        });
    };

    Ok(Frontmatter {
        metadata: decode_metadata(raw_metadata, origin)?,
        body: body.trim().to_string(),
    })
}

fn decode_metadata(raw: &str, origin: &Path) -> DocumentResult<Metadata> {
    if raw.trim().is_empty() {
        return Ok(Metadata::default());
    }

    let value: Value = serde_yaml::from_str(raw).map_err(|source| DocumentError::Yaml {
        path: PathBuf::from(origin),
        source,
    })?;

    match value {
        Value::Null => Ok(Metadata::default()),
        Value::Mapping(mapping) => Ok(Metadata(
            mapping
                .into_iter()
                .filter_map(|(key, value)| key_to_string(key).map(|k| (k, value)))
                .collect(),
        )),
        _ => Err(DocumentError::NotAMapping {
            path: PathBuf::from(origin),
        }),
    }
}

fn key_to_string(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_metadata_and_trims_body() {
        let doc = parse_frontmatter_str(
            "---\nname: researcher\ndescription: Finds things\n---\n\n  You are a researcher.\n\n",
        )
        .unwrap();

        assert_eq!(doc.metadata.string("name").unwrap().as_deref(), Some("researcher"));
        assert_eq!(
            doc.metadata.string("description").unwrap().as_deref(),
            Some("Finds things")
        );
        assert_eq!(doc.body, "You are a researcher.");
    }

    #[test]
    fn document_without_marker_is_all_body() {
        let doc = parse_frontmatter_str("  Just a prompt.\n").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Just a prompt.");
    }

    #[test]
    fn unterminated_block_is_all_body() {
        let doc = parse_frontmatter_str("---\nname: x\n").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "---\nname: x");
    }

    #[test]
    fn empty_metadata_block_is_empty_mapping() {
        let doc = parse_frontmatter_str("---\n---\nBody").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Body");

        let doc = parse_frontmatter_str("---\n# only a comment\n---\nBody").unwrap();
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn body_keeps_later_markers() {
        let doc = parse_frontmatter_str("---\nname: a\n---\nintro\n---\noutro").unwrap();
        assert_eq!(doc.body, "intro\n---\noutro");
    }

    #[test]
    fn string_lists() {
        let doc = parse_frontmatter_str(
            "---\nallowed-tools:\n  - web_search\n  - calculate\nskills: []\n---\n",
        )
        .unwrap();
        assert_eq!(
            doc.metadata.string_list("allowed-tools").unwrap(),
            vec!["web_search", "calculate"]
        );
        assert!(doc.metadata.string_list("skills").unwrap().is_empty());
        assert!(doc.metadata.string_list("missing").unwrap().is_empty());
    }

    #[test]
    fn wrong_shapes_are_reported() {
        let doc = parse_frontmatter_str("---\nname: [a, b]\nskills: market\n---\n").unwrap();
        assert_eq!(doc.metadata.string("name"), Err(InvalidShape));
        assert_eq!(doc.metadata.string_list("skills"), Err(InvalidShape));
    }

    #[test]
    fn malformed_yaml_propagates_decoder_error() {
        let err = parse_frontmatter_str("---\nname: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, DocumentError::Yaml { .. }));
    }

    #[test]
    fn scalar_metadata_is_rejected() {
        let err = parse_frontmatter_str("---\njust text\n---\nbody").unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_frontmatter(dir.path().join("absent.md")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.md");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "---\nname: analyst\n---\nAnalyze.").unwrap();

        let doc = parse_frontmatter(&path).unwrap();
        assert_eq!(doc.metadata.string("name").unwrap().as_deref(), Some("analyst"));
        assert_eq!(doc.body, "Analyze.");
    }
}
