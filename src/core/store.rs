/// Entity Store — the authoritative in-memory scene state.
///
/// Every mutating operation validates first and only then writes, so a
/// rejected edit leaves the store exactly as it was.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::character::{
    Character, CharacterForm, CharacterId, CharacterKind, ValidationError,
};
use crate::schema::dialogue::{
    ActionUpdate, CharacterAction, DialogueLine, DialogueType, DialogueUpdate, SpokenDialogue,
};
use crate::schema::scene::{SceneAttributes, SceneUpdate, VisualStyle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("character not found: {0}")]
    UnknownCharacter(CharacterId),
    #[error("character {id} is a {existing:?} and cannot become a {requested:?}")]
    KindChange {
        id: CharacterId,
        existing: CharacterKind,
        requested: CharacterKind,
    },
    #[error("character {0} cannot address a line to itself")]
    SelfTarget(CharacterId),
    #[error("character {char_id} has no dialogue line at index {index}")]
    DialogueIndexOutOfRange { char_id: CharacterId, index: usize },
    #[error("no spoken dialogue entry at index {0}")]
    SpokenIndexOutOfRange(usize),
    #[error("{0:?} lines are not addressed to a character")]
    TargetNotAllowed(DialogueType),
}

/// Owned scene state: characters, their action entries, expressions,
/// global dialogue and scene attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityStore {
    characters: Vec<Character>,
    actions: FxHashMap<CharacterId, CharacterAction>,
    /// Insertion order of `actions`, used for composition.
    action_order: Vec<CharacterId>,
    expressions: FxHashMap<CharacterId, String>,
    spoken_dialogue: Vec<SpokenDialogue>,
    scene: SceneAttributes,
    next_id: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- reads ----

    /// Characters in insertion order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    pub fn contains_character(&self, id: &CharacterId) -> bool {
        self.character(id).is_some()
    }

    pub fn action(&self, id: &CharacterId) -> Option<&CharacterAction> {
        self.actions.get(id)
    }

    /// Action entries in the order they were first created.
    pub fn actions(&self) -> impl Iterator<Item = &CharacterAction> {
        self.action_order.iter().filter_map(|id| self.actions.get(id))
    }

    pub fn expression(&self, id: &CharacterId) -> Option<&str> {
        self.expressions.get(id).map(String::as_str)
    }

    /// Every expression mapping, sorted by character id.
    pub fn expressions(&self) -> Vec<(&CharacterId, &str)> {
        let mut all: Vec<_> = self
            .expressions
            .iter()
            .map(|(id, expr)| (id, expr.as_str()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    pub fn spoken_dialogue(&self) -> &[SpokenDialogue] {
        &self.spoken_dialogue
    }

    pub fn scene(&self) -> &SceneAttributes {
        &self.scene
    }

    // ---- characters ----

    fn next_free_id(&self) -> (u64, CharacterId) {
        let mut counter = self.next_id;
        loop {
            counter += 1;
            let id = CharacterId(format!("char-{}", counter));
            if !self.contains_character(&id) {
                return (counter, id);
            }
        }
    }

    /// Returns a fresh id that no character in the store uses.
    pub fn allocate_id(&mut self) -> CharacterId {
        let (counter, id) = self.next_free_id();
        self.next_id = counter;
        id
    }

    /// Commits a character form under a newly allocated id.
    pub fn add_character(&mut self, form: CharacterForm) -> Result<CharacterId, StoreError> {
        let (counter, id) = self.next_free_id();
        let character = form.commit(id.clone())?;
        self.next_id = counter;
        self.characters.push(character);
        Ok(id)
    }

    /// Inserts a new character or replaces an existing one in place.
    /// A committed character's kind never changes.
    pub fn upsert_character(&mut self, character: Character) -> Result<(), StoreError> {
        character.validate()?;
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => {
                if existing.kind() != character.kind() {
                    tracing::warn!(id = %character.id, "rejected character kind change");
                    return Err(StoreError::KindChange {
                        id: character.id.clone(),
                        existing: existing.kind(),
                        requested: character.kind(),
                    });
                }
                *existing = character;
            }
            None => self.characters.push(character),
        }
        Ok(())
    }

    /// Removes a character and everything that refers to it: its action
    /// entry, its expression, every global line it speaks, and any target
    /// reference to it in the remaining dialogue.
    pub fn remove_character(&mut self, id: &CharacterId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| &c.id == id)?;
        let removed = self.characters.remove(pos);

        self.actions.remove(id);
        self.action_order.retain(|other| other != id);
        self.expressions.remove(id);
        self.spoken_dialogue.retain(|entry| &entry.char_id != id);

        for entry in &mut self.spoken_dialogue {
            if entry.target_char_id.as_ref() == Some(id) {
                entry.target_char_id = None;
            }
        }
        for action in self.actions.values_mut() {
            for line in &mut action.dialogue_lines {
                if line.target_char_id.as_ref() == Some(id) {
                    line.target_char_id = None;
                }
            }
        }

        Some(removed)
    }

    // ---- action entries ----

    fn require_character(&self, id: &CharacterId) -> Result<(), StoreError> {
        if self.contains_character(id) {
            Ok(())
        } else {
            Err(StoreError::UnknownCharacter(id.clone()))
        }
    }

    /// Returns the action entry for `id`, creating an empty one on first edit.
    fn action_entry(&mut self, id: &CharacterId) -> &mut CharacterAction {
        if !self.actions.contains_key(id) {
            self.action_order.push(id.clone());
        }
        self.actions
            .entry(id.clone())
            .or_insert_with(|| CharacterAction::new(id.clone()))
    }

    pub fn set_character_action(
        &mut self,
        id: &CharacterId,
        update: ActionUpdate,
    ) -> Result<(), StoreError> {
        self.require_character(id)?;
        let entry = self.action_entry(id);
        match update {
            ActionUpdate::Action(text) => entry.action = text,
            ActionUpdate::IsMain(flag) => entry.is_main = flag,
        }
        Ok(())
    }

    /// Flips the main-character flag and returns its new value.
    pub fn toggle_main_character(&mut self, id: &CharacterId) -> Result<bool, StoreError> {
        self.require_character(id)?;
        let entry = self.action_entry(id);
        entry.is_main = !entry.is_main;
        Ok(entry.is_main)
    }

    pub fn set_expression(&mut self, id: &CharacterId, value: &str) -> Result<(), StoreError> {
        self.require_character(id)?;
        let value = value.trim();
        if value.is_empty() {
            self.expressions.remove(id);
        } else {
            self.expressions.insert(id.clone(), value.to_string());
        }
        Ok(())
    }

    // ---- embedded dialogue ----

    /// Appends an empty line and returns its index.
    pub fn add_dialogue_line(&mut self, id: &CharacterId) -> Result<usize, StoreError> {
        self.require_character(id)?;
        let entry = self.action_entry(id);
        entry.dialogue_lines.push(DialogueLine::default());
        Ok(entry.dialogue_lines.len() - 1)
    }

    pub fn dialogue_line(&self, id: &CharacterId, index: usize) -> Option<&DialogueLine> {
        self.actions.get(id)?.dialogue_lines.get(index)
    }

    pub fn update_dialogue_line(
        &mut self,
        id: &CharacterId,
        index: usize,
        update: DialogueUpdate,
    ) -> Result<(), StoreError> {
        self.require_character(id)?;
        let Some(current) = self.dialogue_line(id, index) else {
            return Err(StoreError::DialogueIndexOutOfRange {
                char_id: id.clone(),
                index,
            });
        };
        if let DialogueUpdate::Target(Some(target)) = &update {
            Self::check_target_allowed(current.dialogue_type)?;
            self.check_target(id, target)?;
        }

        let line = match self
            .actions
            .get_mut(id)
            .and_then(|a| a.dialogue_lines.get_mut(index))
        {
            Some(line) => line,
            None => {
                return Err(StoreError::DialogueIndexOutOfRange {
                    char_id: id.clone(),
                    index,
                })
            }
        };
        match update {
            DialogueUpdate::Type(kind) => {
                line.dialogue_type = kind;
                if !kind.needs_target() {
                    line.target_char_id = None;
                }
            }
            DialogueUpdate::Sentence(text) => line.sentence = text,
            DialogueUpdate::Target(target) => line.target_char_id = target,
            // Embedded lines are always spoken by the entry's character.
            DialogueUpdate::Speaker(_) => {}
        }
        Ok(())
    }

    pub fn remove_dialogue_line(
        &mut self,
        id: &CharacterId,
        index: usize,
    ) -> Result<DialogueLine, StoreError> {
        match self.actions.get_mut(id) {
            Some(action) if index < action.dialogue_lines.len() => {
                Ok(action.dialogue_lines.remove(index))
            }
            _ => Err(StoreError::DialogueIndexOutOfRange {
                char_id: id.clone(),
                index,
            }),
        }
    }

    // ---- global spoken dialogue ----

    /// Appends an empty line spoken by `speaker` and returns its index.
    pub fn add_spoken_dialogue(&mut self, speaker: &CharacterId) -> Result<usize, StoreError> {
        self.require_character(speaker)?;
        self.spoken_dialogue.push(SpokenDialogue {
            char_id: speaker.clone(),
            ..Default::default()
        });
        Ok(self.spoken_dialogue.len() - 1)
    }

    pub fn update_spoken_dialogue(
        &mut self,
        index: usize,
        update: DialogueUpdate,
    ) -> Result<(), StoreError> {
        let entry = self
            .spoken_dialogue
            .get(index)
            .ok_or(StoreError::SpokenIndexOutOfRange(index))?;
        match &update {
            DialogueUpdate::Target(Some(target)) => {
                Self::check_target_allowed(entry.dialogue_type)?;
                self.check_target(&entry.char_id, target)?;
            }
            DialogueUpdate::Speaker(speaker) => {
                self.require_character(speaker)?;
                if entry.target_char_id.as_ref() == Some(speaker) {
                    tracing::warn!(id = %speaker, "rejected speaker equal to target");
                    return Err(StoreError::SelfTarget(speaker.clone()));
                }
            }
            _ => {}
        }

        let entry = self
            .spoken_dialogue
            .get_mut(index)
            .ok_or(StoreError::SpokenIndexOutOfRange(index))?;
        match update {
            DialogueUpdate::Type(kind) => {
                entry.dialogue_type = kind;
                if !kind.needs_target() {
                    entry.target_char_id = None;
                }
            }
            DialogueUpdate::Sentence(text) => entry.sentence = text,
            DialogueUpdate::Target(target) => entry.target_char_id = target,
            DialogueUpdate::Speaker(speaker) => entry.char_id = speaker,
        }
        Ok(())
    }

    pub fn remove_spoken_dialogue(&mut self, index: usize) -> Result<SpokenDialogue, StoreError> {
        if index < self.spoken_dialogue.len() {
            Ok(self.spoken_dialogue.remove(index))
        } else {
            Err(StoreError::SpokenIndexOutOfRange(index))
        }
    }

    /// Only questions and answers carry a target.
    fn check_target_allowed(kind: DialogueType) -> Result<(), StoreError> {
        if kind.needs_target() {
            Ok(())
        } else {
            tracing::warn!(?kind, "rejected target on untargeted dialogue line");
            Err(StoreError::TargetNotAllowed(kind))
        }
    }

    fn check_target(&self, speaker: &CharacterId, target: &CharacterId) -> Result<(), StoreError> {
        if speaker == target {
            tracing::warn!(id = %speaker, "rejected dialogue target equal to speaker");
            return Err(StoreError::SelfTarget(speaker.clone()));
        }
        self.require_character(target)
    }

    // ---- scene ----

    pub fn set_scene_attribute(&mut self, update: SceneUpdate) {
        self.scene.apply(update);
    }

    pub fn toggle_visual_style(&mut self, style: VisualStyle) {
        self.scene.toggle_visual_style(style);
    }

    /// Clears every field back to its empty value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Repairs a store restored from partial data: reconciles the action
    /// order with the action map and re-keys entries by their map key.
    pub fn normalize(&mut self) {
        let mut seen = FxHashSet::default();
        let actions = &self.actions;
        self.action_order
            .retain(|id| actions.contains_key(id) && seen.insert(id.clone()));

        let mut missing: Vec<CharacterId> = self
            .actions
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();
        missing.sort();
        self.action_order.extend(missing);

        for (id, action) in self.actions.iter_mut() {
            action.char_id = id.clone();
        }
    }
}
