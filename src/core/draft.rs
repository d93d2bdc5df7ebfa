/// Draft persistence — the full scene plus both output strings, stored as
/// one RON file per opaque key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::EntityStore;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid draft key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),
}

/// Everything needed to restore an editing session. Missing fields load as
/// their empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub store: EntityStore,
    pub composed: String,
    pub refined: String,
}

impl Draft {
    /// Parses a draft and repairs the restored store.
    pub fn parse_ron(input: &str) -> Result<Draft, DraftError> {
        let mut draft: Draft = ron::from_str(input)?;
        draft.store.normalize();
        Ok(draft)
    }

    pub fn to_ron(&self) -> Result<String, DraftError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

/// Load/save of drafts by key.
pub trait DraftStore {
    /// Returns `None` when no draft exists under `key`.
    fn load(&self, key: &str) -> Result<Option<Draft>, DraftError>;
    fn save(&self, key: &str, draft: &Draft) -> Result<(), DraftError>;
    /// Keys of every stored draft, sorted.
    fn list(&self) -> Result<Vec<String>, DraftError>;
}

/// Keeps each draft as `<dir>/<key>.ron`.
#[derive(Debug, Clone)]
pub struct RonDraftStore {
    dir: PathBuf,
}

impl RonDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DraftError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DraftError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.ron", key)))
    }
}

impl DraftStore for RonDraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>, DraftError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        let draft = Draft::parse_ron(&contents)?;
        tracing::debug!(key, "loaded draft");
        Ok(Some(draft))
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<(), DraftError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, draft.to_ron()?)?;
        tracing::debug!(key, "saved draft");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, DraftError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::{Character, CharacterAttributes, CharacterId};
    use crate::schema::scene::SceneUpdate;

    #[test]
    fn empty_document_loads_defaults() {
        let draft = Draft::parse_ron("()").unwrap();
        assert_eq!(draft, Draft::default());
    }

    #[test]
    fn missing_fields_fall_back() {
        let input = r#"(
            refined: "A quiet beach at dawn.",
            store: (
                characters: [(id: ("a"), name: "Aria")],
                scene: (location: "Pantai"),
            ),
        )"#;
        let draft = Draft::parse_ron(input).unwrap();
        assert_eq!(draft.composed, "");
        assert_eq!(draft.refined, "A quiet beach at dawn.");
        assert_eq!(draft.store.characters().len(), 1);
        assert_eq!(draft.store.characters()[0].name, "Aria");
        assert_eq!(draft.store.scene().location, "Pantai");
        assert!(draft.store.scene().visual_styles.is_empty());
    }

    #[test]
    fn rejects_path_like_keys() {
        let store = RonDraftStore::new("drafts");
        assert!(matches!(
            store.load("../secret"),
            Err(DraftError::InvalidKey(_))
        ));
        assert!(matches!(store.load(""), Err(DraftError::InvalidKey(_))));
    }

    #[test]
    fn save_then_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = RonDraftStore::new(dir.path().join("drafts"));
        assert!(drafts.list().unwrap().is_empty());

        let mut draft = Draft::default();
        draft
            .store
            .upsert_character(Character {
                id: CharacterId::new("a"),
                name: "Aria".to_string(),
                attributes: CharacterAttributes::default(),
            })
            .unwrap();
        draft
            .store
            .set_scene_attribute(SceneUpdate::Location("Hutan".to_string()));
        draft.composed = "Lokasi: Hutan.".to_string();

        drafts.save("scene-1", &draft).unwrap();
        assert_eq!(drafts.load("scene-1").unwrap(), Some(draft));
        assert_eq!(drafts.load("scene-2").unwrap(), None);
        assert_eq!(drafts.list().unwrap(), vec!["scene-1".to_string()]);
    }
}
