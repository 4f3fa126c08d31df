//! Entity loading and saving
//!
//! Documents live as one YAML file per entity under the entity type's
//! directory. Loading never trusts derived state; callers recompute.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::entity::Entity;
use crate::core::project::Project;
use crate::yaml::{parse_yaml, YamlError};

fn is_entity_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "yaml")
}

/// Load all entities of type T from the project
///
/// Files that fail to parse are skipped with a warning.
pub fn load_all<T: Entity>(project: &Project) -> Result<Vec<(PathBuf, T)>, YamlError> {
    let dir = project.entity_dir(T::PREFIX);
    let mut entities = Vec::new();

    if !dir.exists() {
        return Ok(entities);
    }

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if !is_entity_file(&path) {
            continue;
        }

        let content = fs::read_to_string(&path)?;
        match serde_yml::from_str::<T>(&content) {
            Ok(entity) => entities.push((path, entity)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entity file")
            }
        }
    }

    Ok(entities)
}

/// Find an entity file by ID (supports partial matching)
///
/// Searches for a file whose stem contains the given ID.
pub fn find_entity_file(dir: &Path, id: &str) -> Option<PathBuf> {
    if id.is_empty() || !dir.exists() {
        return None;
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_entity_file(path))
        .find(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.contains(id))
        })
}

/// Load a single entity by ID
pub fn load_entity<T: Entity>(project: &Project, id: &str) -> Result<Option<(PathBuf, T)>, YamlError> {
    let Some(path) = find_entity_file(&project.entity_dir(T::PREFIX), id) else {
        return Ok(None);
    };

    let content = fs::read_to_string(&path)?;
    let filename = path.display().to_string();
    let entity = parse_yaml::<T>(&content, &filename, T::PREFIX.directory())?;
    Ok(Some((path, entity)))
}

/// Write an entity to its file
pub fn save_entity<T: Entity>(project: &Project, entity: &T) -> Result<PathBuf, YamlError> {
    let path = project.entity_path(entity.id());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml = serde_yml::to_string(entity)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    fs::write(&path, yaml)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tolerance::Dimension;
    use crate::entities::Inspection;
    use tempfile::tempdir;

    fn inspection(title: &str) -> Inspection {
        Inspection::new(
            title.to_string(),
            vec![Dimension::new("A", 1.0, 0.1, 0.1).unwrap()],
            "tester".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_all_empty_project() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let all: Vec<(PathBuf, Inspection)> = load_all(&project).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_find_entity_file_nonexistent() {
        assert!(find_entity_file(Path::new("/nonexistent/path"), "INSP-123").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let insp = inspection("Saved");
        let path = save_entity(&project, &insp).unwrap();
        assert!(path.exists());

        let id = insp.id.to_string();
        let (found, loaded): (PathBuf, Inspection) = load_entity(&project, &id[..12]).unwrap().unwrap();
        assert_eq!(found, path);
        assert_eq!(loaded.title, "Saved");
    }

    #[test]
    fn test_load_all_skips_broken_files() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        save_entity(&project, &inspection("Good")).unwrap();
        fs::write(
            project.entity_dir(crate::core::identity::EntityPrefix::Insp).join("INSP-broken.aql.yaml"),
            "title: [unclosed",
        )
        .unwrap();

        let all: Vec<(PathBuf, Inspection)> = load_all(&project).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_load_entity_reports_syntax_errors() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        fs::write(
            project.entity_dir(crate::core::identity::EntityPrefix::Insp).join("INSP-bad.aql.yaml"),
            "title: ok\n",
        )
        .unwrap();

        let result: Result<Option<(PathBuf, Inspection)>, YamlError> = load_entity(&project, "INSP-bad");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }
}
