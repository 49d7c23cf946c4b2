//! On-disk fixtures. Filesystem failures panic, since a broken fixture is a
//! broken test.

use skillgate_core::skill::SKILL_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the default skill root inside the fixture.
pub const DEFAULT_ROOT: &str = "skills";

/// Render a `SKILL.md` document.
pub fn skill_descriptor(
    name: &str,
    description: &str,
    allowed_tools: &[&str],
    instructions: &str,
) -> String {
    let mut text = format!("---\nname: {name}\ndescription: {description}\n");
    if !allowed_tools.is_empty() {
        text.push_str(&format!("allowed-tools: [{}]\n", allowed_tools.join(", ")));
    }
    text.push_str("---\n");
    text.push_str(instructions);
    text.push('\n');
    text
}

/// Render a node config document.
pub fn node_document(
    name: &str,
    description: &str,
    skills: &[&str],
    allowed_tools: &[&str],
    system_prompt: &str,
) -> String {
    let mut text = format!("---\nname: {name}\ndescription: {description}\n");
    if !skills.is_empty() {
        text.push_str(&format!("skills: [{}]\n", skills.join(", ")));
    }
    if !allowed_tools.is_empty() {
        text.push_str(&format!("allowed-tools: [{}]\n", allowed_tools.join(", ")));
    }
    text.push_str("---\n");
    text.push_str(system_prompt);
    text.push('\n');
    text
}

/// A temporary directory holding skill roots and node configs.
///
/// ```text
/// <tmp>/skills/<skill>/SKILL.md
/// <tmp>/<other-root>/<skill>/SKILL.md
/// <tmp>/nodes/<node>.md
/// ```
#[derive(Debug)]
pub struct SkillRootFixture {
    dir: TempDir,
}

impl Default for SkillRootFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillRootFixture {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create fixture directory");
        fs::create_dir_all(dir.path().join(DEFAULT_ROOT)).expect("create default skill root");
        Self { dir }
    }

    /// The fixture's temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The default skill root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join(DEFAULT_ROOT)
    }

    /// Another skill root, created on first use.
    pub fn root_named(&self, name: &str) -> PathBuf {
        let root = self.dir.path().join(name);
        fs::create_dir_all(&root).expect("create skill root");
        root
    }

    pub fn nodes_dir(&self) -> PathBuf {
        self.dir.path().join("nodes")
    }

    /// Write a skill into the default root. Returns its directory.
    pub fn skill(
        &self,
        name: &str,
        description: &str,
        allowed_tools: &[&str],
        instructions: &str,
    ) -> PathBuf {
        self.raw_skill(
            DEFAULT_ROOT,
            name,
            &skill_descriptor(name, description, allowed_tools, instructions),
        )
    }

    /// Write an arbitrary descriptor into `root/<directory>/SKILL.md`.
    pub fn raw_skill(&self, root: &str, directory: &str, descriptor: &str) -> PathBuf {
        let dir = self.root_named(root).join(directory);
        fs::create_dir_all(&dir).expect("create skill directory");
        fs::write(dir.join(SKILL_FILE), descriptor).expect("write SKILL.md");
        dir
    }

    /// Write a reference file next to a skill in the default root.
    pub fn reference(&self, skill: &str, file: &str, contents: &str) -> PathBuf {
        let path = self.root().join(skill).join(file);
        fs::write(&path, contents).expect("write reference file");
        path
    }

    /// Write a node config document. Returns its path.
    pub fn node(
        &self,
        name: &str,
        description: &str,
        skills: &[&str],
        allowed_tools: &[&str],
        system_prompt: &str,
    ) -> PathBuf {
        let dir = self.nodes_dir();
        fs::create_dir_all(&dir).expect("create nodes directory");
        let path = dir.join(format!("{name}.md"));
        fs::write(
            &path,
            node_document(name, description, skills, allowed_tools, system_prompt),
        )
        .expect("write node config");
        path
    }

    /// Write an arbitrary file relative to the fixture directory.
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write file");
        path
    }
}
