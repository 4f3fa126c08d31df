//! Short aliases for inspections
//!
//! `aql insp list` assigns `@1`, `@2`, ... (also written `INSP@1`) to the
//! listed inspections so later commands don't need the full ULID. The
//! index is rewritten on every listing.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;

/// Index file location within a project
const INDEX_FILE: &str = ".aql/shortids.json";

/// A mapping of short IDs (@N) to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    entries: HashMap<u32, String>,
    #[serde(skip)]
    reverse: HashMap<String, u32>,
    next_id: u32,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            reverse: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };

        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index.entries.iter().map(|(k, v)| (v.clone(), *k)).collect();
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt short id index");
                Self::new()
            }
        }
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Clear and rebuild the index with new entity IDs
    pub fn rebuild(&mut self, entity_ids: impl IntoIterator<Item = String>) {
        self.entries.clear();
        self.reverse.clear();
        self.next_id = 1;

        for id in entity_ids {
            self.add(id);
        }
    }

    /// Add an entity ID and return its short ID
    pub fn add(&mut self, entity_id: String) -> u32 {
        if let Some(&short_id) = self.reverse.get(&entity_id) {
            return short_id;
        }

        let short_id = self.next_id;
        self.next_id += 1;
        self.entries.insert(short_id, entity_id.clone());
        self.reverse.insert(entity_id, short_id);
        short_id
    }

    /// Resolve a reference to a full or partial entity ID
    ///
    /// `@N`, `INSP@N` and bare numbers are looked up; anything else is
    /// passed through for partial matching.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let num_str = if let Some((prefix, num)) = reference.split_once('@') {
            if !prefix.is_empty() && !prefix.eq_ignore_ascii_case(EntityPrefix::Insp.as_str()) {
                return None;
            }
            num
        } else if !reference.is_empty() && reference.chars().all(|c| c.is_ascii_digit()) {
            reference
        } else {
            return Some(reference.to_string());
        };

        num_str
            .parse::<u32>()
            .ok()
            .and_then(|n| self.entries.get(&n).cloned())
    }

    pub fn get_short_id(&self, entity_id: &str) -> Option<u32> {
        self.reverse.get(entity_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a reference that might be a short ID or a full/partial entity ID
pub fn parse_entity_reference(reference: &str, project: &Project) -> String {
    ShortIdIndex::load(project)
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_short_id_add_and_resolve() {
        let mut index = ShortIdIndex::new();
        assert_eq!(index.add("INSP-01ABC".to_string()), 1);
        assert_eq!(index.add("INSP-02DEF".to_string()), 2);

        assert_eq!(index.resolve("@1"), Some("INSP-01ABC".to_string()));
        assert_eq!(index.resolve("INSP@2"), Some("INSP-02DEF".to_string()));
        assert_eq!(index.resolve("insp@2"), Some("INSP-02DEF".to_string()));
        assert_eq!(index.resolve("1"), Some("INSP-01ABC".to_string()));
        assert_eq!(index.resolve("@99"), None);
        assert_eq!(index.resolve("LOT@1"), None);
    }

    #[test]
    fn test_short_id_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("INSP-01ABC"), Some("INSP-01ABC".to_string()));
    }

    #[test]
    fn test_short_id_rebuild_and_dedup() {
        let mut index = ShortIdIndex::new();
        index.add("INSP-001".to_string());
        assert_eq!(index.add("INSP-001".to_string()), 1);
        assert_eq!(index.len(), 1);

        index.rebuild(vec!["INSP-A".to_string(), "INSP-B".to_string()]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get_short_id("INSP-B"), Some(2));
        assert_eq!(index.get_short_id("INSP-001"), None);
    }

    #[test]
    fn test_short_id_persists() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let mut index = ShortIdIndex::new();
        index.add("INSP-XYZ".to_string());
        index.save(&project).unwrap();

        assert_eq!(parse_entity_reference("@1", &project), "INSP-XYZ");
        assert_eq!(ShortIdIndex::load(&project).get_short_id("INSP-XYZ"), Some(1));
    }
}
