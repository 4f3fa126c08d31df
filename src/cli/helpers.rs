//! Shared helper functions for CLI commands

use console::{style, StyledObject};
use miette::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::run::InspectionStatus;
use crate::core::shortid::ShortIdIndex;
use crate::core::table::AcReTable;
use crate::core::Config;
use crate::entities::Inspection;

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Open the project named by `--project`, or discover it from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    Project::open(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// The Ac/Re table configured for a project
pub fn load_table(config: &Config, project: Option<&Project>) -> Result<AcReTable> {
    Ok(config.acre_table(project)?)
}

fn resolve_reference(project: &Project, reference: &str) -> Result<String> {
    ShortIdIndex::load(project)
        .resolve(reference)
        .ok_or_else(|| miette::miette!("Unknown short ID '{}'. Run 'aql insp list' first.", reference))
}

/// Path of an inspection file, without parsing it
pub fn locate_inspection(project: &Project, reference: &str) -> Result<PathBuf> {
    let resolved = resolve_reference(project, reference)?;
    loader::find_entity_file(&project.entity_dir(EntityPrefix::Insp), &resolved)
        .ok_or_else(|| miette::miette!("No inspection found matching '{}'", reference))
}

/// Find an inspection by full ID, partial ID or short ID
///
/// The derived state is recomputed so a hand-edited file can't carry a
/// stale verdict.
pub fn find_inspection(
    project: &Project,
    table: &AcReTable,
    reference: &str,
) -> Result<(PathBuf, Inspection)> {
    let resolved = resolve_reference(project, reference)?;

    let (path, mut insp) = loader::load_entity::<Inspection>(project, &resolved)?
        .ok_or_else(|| miette::miette!("No inspection found matching '{}'", reference))?;

    insp.run.recompute(table)?;
    Ok((path, insp))
}

/// Short alias (`@N`) for display, falling back to the truncated ID
pub fn display_id(project: &Project, id: &EntityId) -> String {
    ShortIdIndex::load(project)
        .get_short_id(&id.to_string())
        .map(|n| format!("@{}", n))
        .unwrap_or_else(|| format_short_id(id))
}

pub fn styled_status(status: InspectionStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        InspectionStatus::InProgress => style(text).yellow(),
        InspectionStatus::Pass => style(text).green(),
        InspectionStatus::Reject => style(text).red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Insp);
        let formatted = format_short_id(&id);
        assert_eq!(formatted.len(), 16);
        assert!(formatted.starts_with("INSP-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("µµµµµµ", 5), "µµ...");
    }
}
