use serde::{Deserialize, Serialize};

use super::character::CharacterId;

/// How a dialogue sentence is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DialogueType {
    Question,
    #[default]
    Answer,
    AddressAudience,
}

impl DialogueType {
    /// Question and Answer lines are directed at another character.
    pub fn needs_target(&self) -> bool {
        matches!(self, Self::Question | Self::Answer)
    }
}

/// A line of dialogue embedded in a character's action entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLine {
    pub dialogue_type: DialogueType,
    pub sentence: String,
    pub target_char_id: Option<CharacterId>,
}

/// A globally listed line of dialogue with an explicit speaker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpokenDialogue {
    pub char_id: CharacterId,
    pub dialogue_type: DialogueType,
    pub sentence: String,
    pub target_char_id: Option<CharacterId>,
}

/// Per-character action, main-character flag and embedded dialogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterAction {
    pub char_id: CharacterId,
    pub action: String,
    pub is_main: bool,
    pub dialogue_lines: Vec<DialogueLine>,
}

impl CharacterAction {
    pub fn new(char_id: CharacterId) -> Self {
        Self {
            char_id,
            ..Default::default()
        }
    }
}

/// A single-field edit to a character's action entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionUpdate {
    Action(String),
    IsMain(bool),
}

/// A single-field edit to a dialogue entry, embedded or global.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueUpdate {
    Type(DialogueType),
    Sentence(String),
    Target(Option<CharacterId>),
    /// Only meaningful for global spoken dialogue.
    Speaker(CharacterId),
}
