//! Error Types
//!
//! Construction-time and I/O errors raised by the core crate. Runtime
//! access errors seen by the model live in `skillgate-agent`.
//!
//! The error types are organized into focused submodules:
//! - `document`: frontmatter document reading and decoding
//! - `config`: node configs, skill bundles and the TOML configuration
//! - `path`: containment checks against a sandbox root
//! - `model`: chat model invocation

mod config;
mod document;
mod model;
mod path;

pub use config::{ConfigError, ConfigResult, NodeConfigError, SkillError, SkillResult};
pub use document::{DocumentError, DocumentResult};
pub use model::{ModelError, ModelResult};
pub use path::{PathError, PathResult};
