//! Skill table persistence
//!
//! Skills are read from the modified-skills file when one exists (it holds
//! what was learned in earlier sessions), otherwise from the default-skills
//! file, otherwise from the built-in table.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::builtin::default_table;
use super::table::SkillTable;

/// JSON-file backed storage for the skill table
#[derive(Debug, Clone)]
pub struct SkillStore {
    default_path: PathBuf,
    modified_path: PathBuf,
}

impl SkillStore {
    /// Create a store over the two skills files
    pub fn new(default_path: PathBuf, modified_path: PathBuf) -> Self {
        Self {
            default_path,
            modified_path,
        }
    }

    /// Create from the `[skills]` configuration section
    pub fn from_config(config: &crate::config::SkillsConfig) -> Result<Self> {
        Ok(Self::new(config.default_path()?, config.modified_path()?))
    }

    /// Load the skill table, preferring learned skills over defaults
    pub fn load(&self, alias: &str) -> Result<SkillTable> {
        for path in [&self.modified_path, &self.default_path] {
            if let Some(table) = read_table(path)? {
                info!("Loaded {} skills from {}", table.len(), path.display());
                return Ok(table);
            }
        }

        debug!("No skills file found, using built-in skills");
        Ok(default_table(alias))
    }

    /// Write the table to the modified-skills file.
    ///
    /// The data goes to a sibling temporary file first and is renamed over
    /// the target, so an interrupted save leaves the previous file intact.
    pub fn save(&self, table: &SkillTable) -> Result<()> {
        let path = &self.modified_path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create skills directory")?;
        }

        let contents = serde_json::to_string_pretty(table)
            .context("Failed to serialize skills")?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        info!("Saved {} skills to {}", table.len(), path.display());
        Ok(())
    }

    /// Forget everything learned by deleting the modified-skills file
    pub fn reset(&self) -> Result<bool> {
        if self.modified_path.exists() {
            std::fs::remove_file(&self.modified_path)
                .context("Failed to remove modified skills file")?;
            info!("Removed {}", self.modified_path.display());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    pub fn modified_path(&self) -> &Path {
        &self.modified_path
    }
}

fn read_table(path: &Path) -> Result<Option<SkillTable>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let table = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::table::Skill;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SkillStore {
        SkillStore::new(
            dir.path().join("skills.json"),
            dir.path().join("learned").join("modified_skills.json"),
        )
    }

    #[test]
    fn test_load_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let table = store_in(&dir).load("Panda").unwrap();
        assert_eq!(table, default_table("Panda"));
    }

    #[test]
    fn test_load_prefers_modified_over_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::fs::write(
            store.default_path(),
            r#"{"greeting": {"commands": ["hello"], "response": "Default"}}"#,
        )
        .unwrap();
        let table = store.load("Panda").unwrap();
        assert_eq!(table.names(), vec!["greeting"]);

        let mut learned = table.clone();
        learned.register(Skill::fixed("farewell", &["bye"], "Bye"));
        store.save(&learned).unwrap();

        let reloaded = store.load("Panda").unwrap();
        assert_eq!(reloaded, learned);
    }

    #[test]
    fn test_save_round_trips_candidates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut table = default_table("Panda");
        table
            .get_mut("joke")
            .unwrap()
            .candidates
            .insert("make me laugh".to_string(), 2);
        store.save(&table).unwrap();

        assert!(!store.modified_path().with_extension("json.tmp").exists());
        let reloaded = store.load("Panda").unwrap();
        assert_eq!(reloaded.get("joke").unwrap().candidate("make me laugh"), Some(2));
    }

    #[test]
    fn test_reset_removes_learned_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.reset().unwrap());
        store.save(&default_table("Panda")).unwrap();
        assert!(store.reset().unwrap());
        assert!(!store.modified_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.default_path(), "not json").unwrap();
        assert!(store.load("Panda").is_err());
    }
}
