//! Skill discovery across one or more skill roots.
//!
//! A skill root is a directory whose immediate subdirectories are candidate
//! skills. Each candidate with a readable `SKILL.md` is indexed under the
//! name its descriptor declares:
//!
//! ```text
//! skills/                      shared/
//! ├── market-sizing/           └── market-sizing/   (ignored, name taken)
//! │   ├── SKILL.md
//! │   └── template.md
//! └── stakeholder-mapping/
//!     └── SKILL.md
//! ```
//!
//! Roots are scanned in order and subdirectories in lexicographic order; the
//! first directory to claim a name keeps it. The index is rebuilt on every
//! call, so skills added to disk are visible immediately.

use skillgate_core::error::PathResult;
use skillgate_core::identifiers::SkillName;
use skillgate_core::security::{ContainedPath, Sandbox};
use skillgate_core::skill::SkillBundle;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One indexed skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub name: String,
    pub description: String,
    pub directory: PathBuf,
    /// Root the skill was discovered under
    pub root: PathBuf,
}

/// Declared skill name to directory, built from a fresh scan.
#[derive(Debug, Clone, Default)]
pub struct SkillIndex {
    entries: BTreeMap<String, SkillEntry>,
}

impl SkillIndex {
    /// Scan `roots` in order. Missing roots and unreadable skills are skipped.
    pub fn discover<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut index = Self::default();
        for root in roots {
            index.scan_root(root.as_ref());
        }
        debug!(skills = index.len(), "Skill discovery finished");
        index
    }

    fn scan_root(&mut self, root: &Path) {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(root = %root.display(), error = %err, "Skipping unreadable skill root");
                return;
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && SkillBundle::has_descriptor(path))
            .collect();
        candidates.sort();

        for directory in candidates {
            let skill = match SkillBundle::from_directory(&directory) {
                Ok(skill) => skill,
                Err(err) => {
                    warn!(directory = %directory.display(), error = %err, "Skipping unreadable skill");
                    continue;
                }
            };

            if !skill.is_named() {
                warn!(directory = %directory.display(), "Skipping skill without a name");
                continue;
            }

            if let Some(existing) = self.entries.get(&skill.name) {
                warn!(
                    skill = %skill.name,
                    kept = %existing.directory.display(),
                    ignored = %directory.display(),
                    "Ignoring duplicate skill name"
                );
                continue;
            }

            debug!(skill = %skill.name, directory = %directory.display(), "Discovered skill");
            self.entries.insert(
                skill.name.clone(),
                SkillEntry {
                    name: skill.name,
                    description: skill.description,
                    directory,
                    root: root.to_path_buf(),
                },
            );
        }
    }

    /// Every discovered name, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Directory of the skill declaring `name`.
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(|entry| entry.directory.as_path())
    }

    pub fn get(&self, name: &str) -> Option<&SkillEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = &SkillEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a skill name points: its candidate directory and the root it must stay in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLocation {
    pub root: PathBuf,
    pub directory: PathBuf,
}

impl SkillLocation {
    pub fn descriptor(&self) -> PathBuf {
        SkillBundle::descriptor_path(&self.directory)
    }

    /// The directory resolved inside its root, with links and `..` followed.
    pub fn contained(&self) -> PathResult<ContainedPath> {
        let sandbox = Sandbox::new(&self.root)?;
        match self.directory.strip_prefix(&self.root) {
            Ok(relative) => sandbox.resolve(relative),
            Err(_) => sandbox.resolve(&self.directory),
        }
    }
}

/// Resolve a skill name against `roots`.
///
/// The declared name wins. Otherwise the first root holding a directory
/// named `name` is used, and failing that the first root's would-be
/// directory, so callers can still report the path they expected.
/// `None` only when there are no roots. The location is not yet checked
/// for containment; see [`SkillLocation::contained`].
pub fn locate_skill(
    index: &SkillIndex,
    roots: &[PathBuf],
    name: &SkillName,
) -> Option<SkillLocation> {
    if let Some(entry) = index.get(name.as_str()) {
        return Some(SkillLocation {
            root: entry.root.clone(),
            directory: entry.directory.clone(),
        });
    }

    roots
        .iter()
        .find(|root| root.join(name.as_path()).is_dir())
        .or_else(|| roots.first())
        .map(|root| SkillLocation {
            root: root.clone(),
            directory: root.join(name.as_path()),
        })
}
