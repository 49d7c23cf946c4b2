//! Model-readable skill listings.
//!
//! Two renderings exist: an `<available_skills>` block appended to the
//! `load_skill` tool description, listing everything discovered, and a
//! markdown table appended to a node's system prompt, listing only the
//! skills that node declares.

use crate::discovery::{SkillIndex, locate_skill};
use crate::gateway::LOAD_SKILL_TOOL;
use skillgate_core::identifiers::SkillName;
use skillgate_core::skill::SkillBundle;
use std::path::PathBuf;

/// `<available_skills>` block for every skill in `index`, or an empty string
/// when nothing was discovered.
pub fn available_skills_xml(index: &SkillIndex) -> String {
    if index.is_empty() {
        return String::new();
    }

    let entries: Vec<String> = index
        .entries()
        .map(|entry| {
            format!(
                "<skill>\n  <name>{}</name>\n  <description>{}</description>\n</skill>",
                entry.name, entry.description
            )
        })
        .collect();

    format!("<available_skills>\n{}\n</available_skills>", entries.join("\n"))
}

/// Markdown table of the given skills. Names that are invalid, resolve
/// outside their root, or do not lead to a readable skill are left out;
/// `None` when no row remains.
pub fn node_skill_catalog(skills: &[String], roots: &[PathBuf]) -> Option<String> {
    if skills.is_empty() {
        return None;
    }

    let index = SkillIndex::discover(roots);
    let rows: Vec<String> = skills
        .iter()
        .filter_map(|name| SkillName::parse(name).ok())
        .filter_map(|name| locate_skill(&index, roots, &name))
        .filter_map(|location| location.contained().ok())
        .filter_map(|directory| SkillBundle::from_directory(directory.as_path()).ok())
        .filter(SkillBundle::is_named)
        .map(|skill| format!("| {} | {} |", skill.name, skill.description))
        .collect();

    if rows.is_empty() {
        return None;
    }

    let mut lines = vec![
        "## Available Skills".to_string(),
        String::new(),
        format!("Use `{LOAD_SKILL_TOOL}` to activate a skill before using its capabilities."),
        String::new(),
        "| Skill | Description |".to_string(),
        "|-------|-------------|".to_string(),
    ];
    lines.extend(rows);
    Some(lines.join("\n"))
}
