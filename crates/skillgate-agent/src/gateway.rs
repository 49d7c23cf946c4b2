//! Skill-scoped tool gateway.
//!
//! The gateway exposes two tools to the model:
//!
//! - `load_skill(skill_name)` returns the skill's instructions and a state
//!   update widening `available_tools` to the skill's tools
//! - `read_reference(skill_name, file_name)` returns a file bundled with the
//!   skill
//!
//! Both are sandboxed. A skill directory must resolve strictly inside the
//! root it was found in, and a reference file strictly inside its skill
//! directory, after symbolic links and `..` segments are resolved.
//! Rejections come back as tool-result errors the model can react to.
//!
//! ## Tool set computed by a load
//!
//! | Skill declares `allowed-tools` | New `available_tools`                          |
//! |--------------------------------|------------------------------------------------|
//! | no                             | every registry tool + `load_skill` + `read_reference` |
//! | yes                            | the declared tools + `load_skill` + `read_reference`  |
//!
//! The update is merged by set union, so tools unlocked by earlier loads stay
//! available.

use crate::catalog::available_skills_xml;
use crate::discovery::{SkillIndex, locate_skill};
use crate::error::{GatewayError, GatewayResult};
use serde_json::{Value, json};
use skillgate_core::config::SkillgateConfig;
use skillgate_core::error::PathError;
use skillgate_core::identifiers::{ReferenceFileName, SkillName};
use skillgate_core::security::{ContainedPath, Sandbox};
use skillgate_core::skill::SkillBundle;
use skillgate_core::state::StateUpdate;
use skillgate_core::tool::{ExecutionResult, Tool, required_str};
use skillgate_tools::ToolRegistry;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the skill loading tool.
pub const LOAD_SKILL_TOOL: &str = "load_skill";

/// Name of the reference reading tool.
pub const READ_REFERENCE_TOOL: &str = "read_reference";

/// Tools every gateway contributes, regardless of loaded skills.
pub const ALWAYS_AVAILABLE_TOOLS: [&str; 2] = [LOAD_SKILL_TOOL, READ_REFERENCE_TOOL];

const LOAD_SKILL_DESCRIPTION: &str = "Load a skill's instructions and unlock its tools. \
Call this before using skill-specific capabilities.";

const READ_REFERENCE_DESCRIPTION: &str =
    "Read a reference file (template, example, script) from within a skill directory.";

/// Outcome of a successful skill load.
#[derive(Debug, Clone)]
pub struct SkillLoad {
    /// Name the skill was requested under; this is what `loaded_skills` records.
    pub name: SkillName,
    pub skill: SkillBundle,
    /// Tool set the skill grants, before merging with prior state.
    pub available_tools: BTreeSet<String>,
}

impl SkillLoad {
    /// The state change this load asks for.
    pub fn state_update(&self) -> StateUpdate {
        StateUpdate::new()
            .with_available_tools(self.available_tools.iter().cloned())
            .with_loaded_skill(self.name.as_str())
    }
}

/// Sandboxed access to skills for one set of roots and one tool registry.
#[derive(Debug, Clone)]
pub struct SkillGateway {
    roots: Vec<PathBuf>,
    registry: Arc<ToolRegistry>,
}

impl SkillGateway {
    /// Create a gateway over `roots`, in priority order.
    pub fn new<I, P>(roots: I, registry: Arc<ToolRegistry>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            registry,
        }
    }

    /// Gateway over the configured `[skills]` roots.
    pub fn from_config(config: &SkillgateConfig, registry: Arc<ToolRegistry>) -> Self {
        Self::new(config.skill_roots(), registry)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Fresh scan of the roots.
    pub fn index(&self) -> SkillIndex {
        SkillIndex::discover(&self.roots)
    }

    /// Sorted names of every discoverable skill.
    pub fn available_skills(&self) -> Vec<String> {
        self.index().names()
    }

    /// `load_skill` description, ending with the current skill catalog.
    pub fn load_description(&self) -> String {
        let catalog = available_skills_xml(&self.index());
        if catalog.is_empty() {
            LOAD_SKILL_DESCRIPTION.to_string()
        } else {
            format!("{LOAD_SKILL_DESCRIPTION}\n\n{catalog}")
        }
    }

    /// Load a skill and compute the tool set it grants.
    pub fn load(&self, skill_name: &str) -> GatewayResult<SkillLoad> {
        let name = self.parse_skill_name(skill_name)?;
        let (_, skill) = self.open_skill(&name)?;

        let mut available_tools: BTreeSet<String> =
            ALWAYS_AVAILABLE_TOOLS.iter().map(|t| t.to_string()).collect();
        if skill.restricts_tools() {
            available_tools.extend(skill.allowed_tools.iter().cloned());
        } else {
            available_tools.extend(self.registry.names());
        }

        info!(
            skill = %name,
            tools = available_tools.len(),
            restricted = skill.restricts_tools(),
            "Skill loaded"
        );

        Ok(SkillLoad {
            name,
            skill,
            available_tools,
        })
    }

    /// Read a reference file bundled with a skill.
    pub fn read(&self, skill_name: &str, file_name: &str) -> GatewayResult<String> {
        let name = self.parse_skill_name(skill_name)?;
        let file_name = ReferenceFileName::parse(file_name).map_err(|_| {
            warn!(skill = %name, file = %file_name, "Rejected invalid reference file name");
            GatewayError::InvalidFileName {
                file: file_name.to_string(),
            }
        })?;

        let (directory, _) = self.open_skill(&name)?;
        let sandbox = Sandbox::new(directory.as_path())
            .map_err(|err| path_error(err, &name, || self.not_found(&name)))?;

        let not_found = || GatewayError::ReferenceNotFound {
            file: file_name.to_string(),
            skill: name.to_string(),
        };
        let file = sandbox
            .resolve(file_name.as_path())
            .map_err(|err| path_error(err, &name, not_found))?;

        if !file.as_path().is_file() {
            return Err(not_found());
        }

        debug!(skill = %name, file = %file_name, "Reading reference file");
        std::fs::read_to_string(file.as_path()).map_err(|source| GatewayError::Io {
            path: file.into_path_buf(),
            source,
        })
    }

    /// The two model-facing tools backed by this gateway.
    pub fn tools(self: &Arc<Self>) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(LoadSkillTool::new(Arc::clone(self))),
            Arc::new(ReadReferenceTool::new(Arc::clone(self))),
        ]
    }

    fn parse_skill_name(&self, skill_name: &str) -> GatewayResult<SkillName> {
        SkillName::parse(skill_name).map_err(|_| {
            warn!(skill = %skill_name, "Rejected invalid skill name");
            GatewayError::InvalidSkillName {
                name: skill_name.to_string(),
                available: self.available_skills(),
            }
        })
    }

    fn not_found(&self, name: &SkillName) -> GatewayError {
        GatewayError::SkillNotFound {
            name: name.to_string(),
            available: self.available_skills(),
        }
    }

    /// Locate the skill directory, require it to sit inside its root, and
    /// read its descriptor. A descriptor without a `name` is not a skill.
    fn open_skill(&self, name: &SkillName) -> GatewayResult<(ContainedPath, SkillBundle)> {
        let index = self.index();
        let location =
            locate_skill(&index, &self.roots, name).ok_or_else(|| self.not_found(name))?;
        let directory = location
            .contained()
            .map_err(|err| path_error(err, name, || self.not_found(name)))?;

        if !SkillBundle::has_descriptor(directory.as_path()) {
            return Err(self.not_found(name));
        }
        let skill = SkillBundle::from_directory(directory.as_path())?;
        if !skill.is_named() {
            warn!(skill = %name, directory = %directory.display(), "Refusing skill without a name");
            return Err(self.not_found(name));
        }
        Ok((directory, skill))
    }
}

/// Traversal becomes [`GatewayError::PathTraversal`]; an unresolvable path
/// means the target does not exist.
fn path_error(
    err: PathError,
    skill_name: &SkillName,
    not_found: impl FnOnce() -> GatewayError,
) -> GatewayError {
    match err {
        PathError::Traversal { .. } => {
            warn!(skill = %skill_name, error = %err, "Path traversal detected");
            GatewayError::PathTraversal {
                name: skill_name.to_string(),
            }
        }
        PathError::Io { .. } => not_found(),
    }
}

/// `load_skill`: activates a skill for the rest of the conversation.
pub struct LoadSkillTool {
    gateway: Arc<SkillGateway>,
}

impl LoadSkillTool {
    pub fn new(gateway: Arc<SkillGateway>) -> Self {
        Self { gateway }
    }
}

impl Tool for LoadSkillTool {
    fn name(&self) -> &str {
        LOAD_SKILL_TOOL
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Owned(self.gateway.load_description())
    }

    fn input_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "skill_name": {
                    "type": "string",
                    "description": "Name of the skill to load (e.g. 'market-sizing')"
                }
            },
            "required": ["skill_name"]
        }))
    }

    fn call(&self, arguments: Value) -> ExecutionResult {
        let skill_name = match required_str(&arguments, "skill_name") {
            Ok(name) => name,
            Err(reason) => return ExecutionResult::failed(reason),
        };

        match self.gateway.load(skill_name) {
            Ok(load) => {
                let update = load.state_update();
                let output = if load.skill.instructions.is_empty() {
                    format!("Skill '{}' loaded.", load.name)
                } else {
                    load.skill.instructions
                };
                ExecutionResult::command(output, update)
            }
            Err(err) => ExecutionResult::failed(err.into()),
        }
    }
}

/// `read_reference`: returns a file bundled with a skill.
pub struct ReadReferenceTool {
    gateway: Arc<SkillGateway>,
}

impl ReadReferenceTool {
    pub fn new(gateway: Arc<SkillGateway>) -> Self {
        Self { gateway }
    }
}

impl Tool for ReadReferenceTool {
    fn name(&self) -> &str {
        READ_REFERENCE_TOOL
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed(READ_REFERENCE_DESCRIPTION)
    }

    fn input_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "skill_name": {
                    "type": "string",
                    "description": "Name of the skill containing the reference file"
                },
                "file_name": {
                    "type": "string",
                    "description": "Name of the reference file to read (e.g. 'calculator.py')"
                }
            },
            "required": ["skill_name", "file_name"]
        }))
    }

    fn call(&self, arguments: Value) -> ExecutionResult {
        let (skill_name, file_name) = match (
            required_str(&arguments, "skill_name"),
            required_str(&arguments, "file_name"),
        ) {
            (Ok(skill), Ok(file)) => (skill, file),
            (Err(reason), _) | (_, Err(reason)) => return ExecutionResult::failed(reason),
        };

        match self.gateway.read(skill_name, file_name) {
            Ok(contents) => ExecutionResult::success(contents),
            Err(err) => ExecutionResult::failed(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillgate_testing::{MockTool, SkillRootFixture, skill_descriptor};

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::from_tools([
            MockTool::new("sql_query").into_tool(),
            MockTool::new("calculate").into_tool(),
            MockTool::new("web_search").into_tool(),
        ]))
    }

    fn fixture() -> SkillRootFixture {
        let fixture = SkillRootFixture::new();
        fixture.skill(
            "market-sizing",
            "Estimate market size",
            &["web_search", "calculate"],
            "# Market sizing\nUse top-down and bottom-up.",
        );
        fixture.skill("open-ended", "Unrestricted", &[], "Anything goes.");
        fixture.reference("market-sizing", "template.md", "| TAM | SAM | SOM |");
        fixture
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn load_grants_declared_tools_only() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());

        let load = gateway.load("market-sizing").unwrap();
        assert_eq!(
            names(&load.available_tools),
            vec!["calculate", "load_skill", "read_reference", "web_search"]
        );
        assert_eq!(load.state_update().loaded_skills, vec!["market-sizing"]);
    }

    #[test]
    fn unrestricted_skill_grants_whole_registry() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());

        let load = gateway.load("open-ended").unwrap();
        assert_eq!(
            names(&load.available_tools),
            vec!["calculate", "load_skill", "read_reference", "sql_query", "web_search"]
        );
    }

    #[test]
    fn invalid_name_lists_available_skills() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());

        for bad in ["../etc", "Market", "", "a/b", "market sizing"] {
            let err = gateway.load(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid skill name '{bad}'. Available skills: market-sizing, open-ended")
            );
        }
    }

    #[test]
    fn loaded_skills_records_requested_name() {
        let fixture = fixture();
        fixture.raw_skill("skills", "folder", &skill_descriptor("renamed", "d", &[], "body"));
        let gateway = SkillGateway::new([fixture.root()], registry());

        let by_dir = gateway.load("folder").unwrap();
        assert_eq!(by_dir.state_update().loaded_skills, vec!["folder"]);
        assert_eq!(by_dir.skill.name, "renamed");

        let by_name = gateway.load("renamed").unwrap();
        assert_eq!(by_name.state_update().loaded_skills, vec!["renamed"]);
    }

    #[test]
    fn unnamed_skill_cannot_be_loaded_or_read() {
        let fixture = fixture();
        fixture.raw_skill("skills", "unnamed", "---\ndescription: no name\n---\nbody");
        fixture.reference("unnamed", "notes.md", "hidden");
        let gateway = SkillGateway::new([fixture.root()], registry());

        assert!(!gateway.available_skills().contains(&"unnamed".to_string()));
        assert!(matches!(
            gateway.load("unnamed"),
            Err(GatewayError::SkillNotFound { .. })
        ));
        assert!(matches!(
            gateway.read("unnamed", "notes.md"),
            Err(GatewayError::SkillNotFound { .. })
        ));
    }

    #[test]
    fn unknown_skill_is_not_found() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());

        let err = gateway.load("ghost").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Skill 'ghost' not found. Available skills: market-sizing, open-ended"
        );
    }

    #[test]
    fn missing_root_reports_none_available() {
        let fixture = SkillRootFixture::new();
        let gateway = SkillGateway::new([fixture.path().join("missing")], registry());
        let err = gateway.load("ghost").unwrap_err();
        assert_eq!(err.to_string(), "Skill 'ghost' not found. Available skills: none");
    }

    #[test]
    fn read_returns_file_contents() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());
        assert_eq!(
            gateway.read("market-sizing", "template.md").unwrap(),
            "| TAM | SAM | SOM |"
        );
    }

    #[test]
    fn read_rejects_bad_file_names() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());

        for bad in ["../open-ended/SKILL.md", "a/b", "", "with space.md"] {
            assert!(matches!(
                gateway.read("market-sizing", bad),
                Err(GatewayError::InvalidFileName { .. })
            ));
        }
    }

    #[test]
    fn dot_dot_file_name_is_traversal() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());
        // ".." passes the file name pattern but resolves to the skill root
        assert!(matches!(
            gateway.read("market-sizing", ".."),
            Err(GatewayError::PathTraversal { .. })
        ));
        assert!(matches!(
            gateway.read("market-sizing", "."),
            Err(GatewayError::PathTraversal { .. })
        ));
    }

    #[test]
    fn missing_reference_is_not_found() {
        let fixture = fixture();
        let gateway = SkillGateway::new([fixture.root()], registry());
        let err = gateway.read("market-sizing", "nope.md").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Reference file 'nope.md' not found in skill 'market-sizing'"
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_skill_outside_root_is_rejected() {
        let fixture = SkillRootFixture::new();
        let outside = fixture.raw_skill("outside", "escape", &skill_descriptor("escape", "x", &[], ""));
        std::os::unix::fs::symlink(&outside, fixture.root().join("escape")).unwrap();

        let gateway = SkillGateway::new([fixture.root()], registry());
        assert!(matches!(
            gateway.load("escape"),
            Err(GatewayError::PathTraversal { .. })
        ));
        assert!(matches!(
            gateway.read("escape", "SKILL.md"),
            Err(GatewayError::PathTraversal { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_reference_outside_skill_is_rejected() {
        let fixture = fixture();
        let secret = fixture.file("secret.txt", "top secret");
        std::os::unix::fs::symlink(&secret, fixture.root().join("market-sizing/leak.md")).unwrap();

        let gateway = SkillGateway::new([fixture.root()], registry());
        assert!(matches!(
            gateway.read("market-sizing", "leak.md"),
            Err(GatewayError::PathTraversal { .. })
        ));
    }

    #[test]
    fn load_tool_returns_instructions_and_update() {
        let fixture = fixture();
        let gateway = Arc::new(SkillGateway::new([fixture.root()], registry()));
        let tools = gateway.tools();

        let result = tools[0].call(json!({"skill_name": "market-sizing"}));
        let (output, update) = result.into_parts();
        assert!(output.starts_with("# Market sizing"));
        let update = update.unwrap();
        assert!(update.available_tools.contains("web_search"));
        assert_eq!(update.loaded_skills, vec!["market-sizing"]);
    }

    #[test]
    fn tool_errors_are_results_not_panics() {
        let fixture = fixture();
        let gateway = Arc::new(SkillGateway::new([fixture.root()], registry()));
        let tools = gateway.tools();

        let missing_arg = tools[0].call(json!({}));
        assert!(missing_arg.is_failure());

        let bad = tools[1].call(json!({"skill_name": "market-sizing", "file_name": "../x"}));
        assert_eq!(bad.output(), "Error: Invalid file name '../x'");
    }

    #[test]
    fn load_description_embeds_catalog() {
        let fixture = fixture();
        let gateway = Arc::new(SkillGateway::new([fixture.root()], registry()));
        let description = gateway.tools()[0].description().into_owned();

        assert!(description.starts_with(LOAD_SKILL_DESCRIPTION));
        assert!(description.contains("<name>market-sizing</name>"));
        assert!(description.contains("<description>Unrestricted</description>"));

        let empty = SkillGateway::new([fixture.path().join("none")], registry());
        assert_eq!(empty.load_description(), LOAD_SKILL_DESCRIPTION);
    }

    #[test]
    fn first_root_wins_on_load() {
        let fixture = SkillRootFixture::new();
        fixture.raw_skill("first", "shared", &skill_descriptor("shared", "one", &["calculate"], "from first"));
        fixture.raw_skill("second", "shared", &skill_descriptor("shared", "two", &["web_search"], "from second"));

        let gateway = SkillGateway::new(
            [fixture.root_named("first"), fixture.root_named("second")],
            registry(),
        );
        let load = gateway.load("shared").unwrap();
        assert_eq!(load.skill.instructions, "from first");
        assert!(load.available_tools.contains("calculate"));
        assert!(!load.available_tools.contains("web_search"));
    }
}
