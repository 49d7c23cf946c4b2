//! Construction-time validation of node configs and skill bundles.
//!
//! Both validators collect every violation instead of stopping at the first,
//! returning human-readable messages. An empty list means valid.

use crate::discovery::{SkillIndex, locate_skill};
use skillgate_core::identifiers::{IdValidator, SkillName, SkillNameRule};
use skillgate_core::node::NodeConfig;
use skillgate_core::skill::SkillBundle;
use skillgate_tools::ToolRegistry;
use std::path::{Path, PathBuf};

/// Check a node config against the registry and a single skill root.
pub fn validate_node_config(
    config: &NodeConfig,
    registry: &ToolRegistry,
    skills_root: &Path,
) -> Vec<String> {
    validate_node_config_in(config, registry, &[skills_root.to_path_buf()])
}

/// Check a node config against the registry and several skill roots.
///
/// Checked independently:
/// - every `allowed-tools` entry is registered
/// - every declared skill is a valid name resolving, inside its root, to a
///   directory with a readable `SKILL.md`
/// - every tool a resolvable skill declares is registered
pub fn validate_node_config_in(
    config: &NodeConfig,
    registry: &ToolRegistry,
    roots: &[PathBuf],
) -> Vec<String> {
    let mut errors = Vec::new();

    for tool in &config.allowed_tools {
        if !registry.contains(tool) {
            errors.push(format!(
                "Node '{}' references unknown tool '{tool}'",
                config.name
            ));
        }
    }

    if config.skills.is_empty() {
        return errors;
    }

    let index = SkillIndex::discover(roots);
    for skill_name in &config.skills {
        let Ok(name) = SkillName::parse(skill_name) else {
            errors.push(format!(
                "Node '{}' references invalid skill name '{skill_name}'",
                config.name
            ));
            continue;
        };

        let Some(location) = locate_skill(&index, roots, &name) else {
            errors.push(format!(
                "Node '{}' references missing skill '{skill_name}': no skill roots configured",
                config.name
            ));
            continue;
        };

        if let Err(err) = location.contained()
            && err.is_traversal()
        {
            errors.push(format!(
                "Node '{}' references skill '{skill_name}' outside its skill root: {err}",
                config.name
            ));
            continue;
        }

        let descriptor = location.descriptor();
        if !descriptor.is_file() {
            errors.push(format!(
                "Node '{}' references missing skill '{skill_name}': {} does not exist",
                config.name,
                descriptor.display()
            ));
            continue;
        }

        let skill = match SkillBundle::from_directory(&location.directory) {
            Ok(skill) => skill,
            Err(err) => {
                errors.push(format!(
                    "Node '{}' references unreadable skill '{skill_name}': {err}",
                    config.name
                ));
                continue;
            }
        };

        if !skill.is_named() {
            errors.push(format!(
                "Node '{}' references skill '{skill_name}' whose SKILL.md has no name",
                config.name
            ));
            continue;
        }

        for tool in &skill.allowed_tools {
            if !registry.contains(tool) {
                errors.push(format!(
                    "Skill '{skill_name}' references unknown tool '{tool}'"
                ));
            }
        }
    }

    errors
}

/// Check a skill bundle for publishing: required fields, canonical name, and
/// a name matching its directory.
pub fn validate_skill(skill: &SkillBundle) -> Vec<String> {
    let mut errors = Vec::new();

    if skill.name.is_empty() {
        errors.push("Skill is missing required field 'name'".to_string());
    } else if IdValidator::validate_skill_name(&skill.name, SkillNameRule::Canonical).is_err() {
        errors.push(format!(
            "Skill name '{}' is invalid. Must be 1-64 lowercase alphanumeric characters and hyphens, no leading/trailing/consecutive hyphens.",
            skill.name
        ));
    }

    if skill.description.is_empty() {
        errors.push(format!(
            "Skill '{}' is missing required field 'description'",
            skill.name
        ));
    }

    if let Some(directory_name) = skill.directory_name()
        && !skill.name.is_empty()
        && skill.name != directory_name
    {
        errors.push(format!(
            "Skill name '{}' does not match directory name '{directory_name}'",
            skill.name
        ));
    }

    errors
}
