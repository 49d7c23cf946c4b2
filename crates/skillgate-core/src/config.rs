//! TOML configuration for skill roots, node documents, agents and logging.
//!
//! ```toml
//! [skills]
//! roots = ["skills", "shared/skills"]
//!
//! [nodes]
//! dir = "prompts/nodes"
//!
//! [agent]
//! recursion_limit = 25
//! append_skill_catalog = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Relative paths are resolved against the directory of the file the
//! configuration was loaded from, or used as-is for in-memory configs.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum number of graph steps per invocation.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillgateConfig {
    pub skills: SkillsConfig,
    pub nodes: NodesConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Skill roots in priority order; the first root wins name collisions.
    pub roots: Vec<PathBuf>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("skills")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesConfig {
    /// Directory holding `<node-name>.md` documents.
    pub dir: PathBuf,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("nodes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub recursion_limit: usize,
    /// Append the node's skill catalog to its system prompt.
    pub append_skill_catalog: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            append_skill_catalog: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl SkillgateConfig {
    /// Load and validate a configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::load_from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn load_from_toml(toml_content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration, reporting every problem at once.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut problems = Vec::new();

        if self.skills.roots.is_empty() {
            problems.push("skills.roots must list at least one directory".to_string());
        }
        if self.skills.roots.iter().any(|root| root.as_os_str().is_empty()) {
            problems.push("skills.roots contains an empty path".to_string());
        }
        if self.agent.recursion_limit == 0 {
            problems.push("agent.recursion_limit cannot be zero".to_string());
        }
        if self.logging.level.trim().is_empty() {
            problems.push("logging.level cannot be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                message: problems.join("; "),
            })
        }
    }

    /// Override the directory relative paths are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Skill roots with relative entries resolved.
    pub fn skill_roots(&self) -> Vec<PathBuf> {
        self.skills.roots.iter().map(|root| self.resolve(root)).collect()
    }

    /// Location of the document for node `name`.
    pub fn node_config_path(&self, name: &str) -> PathBuf {
        self.resolve(&self.nodes.dir).join(format!("{name}.md"))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
