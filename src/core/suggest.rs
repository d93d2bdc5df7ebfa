/// Suggestion client — short generated values for single entity fields.
///
/// The client only talks to the generation service and cleans up its
/// answer. Writing the result back into the store is the caller's job
/// (see `core::session`).

use thiserror::Error;

use crate::core::generation::{GenerateRequest, GenerationError, GenerationPort};
use crate::core::store::StoreError;
use crate::schema::character::{Character, CharacterId};
use crate::schema::dialogue::DialogueType;
use crate::schema::scene::{SceneAttributes, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SuggestionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("character not found: {0}")]
    UnknownCharacter(CharacterId),
    #[error("dialogue entry not found: {0}")]
    UnknownDialogue(SuggestionKey),
    #[error("could not store suggestion: {0}")]
    WriteBack(#[from] StoreError),
}

/// Stable identity of a suggestion request, used for loading flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionKey {
    Action(CharacterId),
    DialogueLine { char_id: CharacterId, index: usize },
    SpokenDialogue(usize),
}

impl std::fmt::Display for SuggestionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(id) => write!(f, "action of {}", id),
            Self::DialogueLine { char_id, index } => {
                write!(f, "dialogue line {} of {}", index, char_id)
            }
            Self::SpokenDialogue(index) => write!(f, "spoken dialogue {}", index),
        }
    }
}

/// The dialogue entry a sentence is requested for.
#[derive(Debug, Clone)]
pub struct DialogueRequest {
    pub speaker: Character,
    pub dialogue_type: DialogueType,
    /// Resolved target character, if one is set and still exists.
    pub target: Option<Character>,
}

/// Ambient scene facts passed along with dialogue requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneContext {
    pub location: String,
    pub time_of_day: Option<TimeOfDay>,
}

impl SceneContext {
    pub fn from_scene(scene: &SceneAttributes) -> Self {
        Self {
            location: scene.location.trim().to_string(),
            time_of_day: scene.time_of_day,
        }
    }
}

/// Instruction asking for one short action phrase.
pub fn action_instruction(character: &Character) -> String {
    format!(
        "Suggest one short, vivid action for a {} character named \"{}\" in a short \
         animated scene. Write it in Indonesian, at most 8 words, starting with a verb \
         (for example: \"berlari kecil sambil tertawa\"). Reply with the action phrase \
         only, without quotation marks or explanation.",
        character.kind().noun(),
        character.name.trim()
    )
}

/// Instruction asking for one dialogue sentence. The wording depends on the
/// line type and on whether a target character resolved.
pub fn dialogue_instruction(request: &DialogueRequest, scene: &SceneContext) -> String {
    let speaker = request.speaker.name.trim();
    let target = request.target.as_ref().map(|c| c.name.trim());

    let ask = match (request.dialogue_type, target) {
        (DialogueType::Question, Some(target)) => {
            format!("a short question that {} asks {}", speaker, target)
        }
        (DialogueType::Question, None) => format!("a short question that {} asks", speaker),
        (DialogueType::Answer, Some(target)) => {
            format!("a short answer that {} gives to {}", speaker, target)
        }
        (DialogueType::Answer, None) => format!("a short reply spoken by {}", speaker),
        (DialogueType::AddressAudience, _) => format!(
            "a short line that {} says directly to the audience, breaking the fourth wall",
            speaker
        ),
    };

    let mut instruction = format!(
        "Write {} in a short animated scene. {} is a {}.",
        ask,
        speaker,
        request.speaker.kind().noun()
    );
    if !scene.location.is_empty() {
        instruction.push_str(&format!(" The scene takes place at {}.", scene.location));
    }
    if let Some(time) = scene.time_of_day {
        instruction.push_str(&format!(" Time of day: {}.", time.label().to_lowercase()));
    }
    instruction.push_str(
        " Write one natural sentence in Indonesian. Reply with the sentence only, \
         without quotation marks.",
    );
    instruction
}

/// Opening and closing quote pairs a service may wrap a sentence in.
const QUOTE_PAIRS: [(char, char); 5] = [
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('‘', '’'),
    ('«', '»'),
];

/// Trims whitespace and removes one wrapping quote pair. Quotes inside the
/// sentence are left alone.
pub fn strip_quotes(text: &str) -> String {
    let text = text.trim();
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    text.to_string()
}

/// Requests suggestions from a generation service.
#[derive(Debug, Clone)]
pub struct SuggestionClient<G> {
    port: G,
}

impl<G: GenerationPort> SuggestionClient<G> {
    pub fn new(port: G) -> Self {
        Self { port }
    }

    /// One short action phrase for a committed character.
    pub async fn suggest_action(&self, character: &Character) -> Result<String, SuggestionError> {
        let request = GenerateRequest::from_instruction(action_instruction(character));
        let text = self.port.generate(request).await?;
        let action = text.trim().to_string();
        if action.is_empty() {
            return Err(GenerationError::EmptyText.into());
        }
        Ok(action)
    }

    /// One dialogue sentence, with wrapping quotes removed.
    pub async fn suggest_dialogue_sentence(
        &self,
        request: &DialogueRequest,
        scene: &SceneContext,
    ) -> Result<String, SuggestionError> {
        let instruction = dialogue_instruction(request, scene);
        let text = self
            .port
            .generate(GenerateRequest::from_instruction(instruction))
            .await?;
        let sentence = strip_quotes(&text);
        if sentence.is_empty() {
            return Err(GenerationError::EmptyText.into());
        }
        Ok(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::MockGenerationPort;
    use crate::schema::character::{CharacterAttributes, CharacterKind};

    fn character(id: &str, name: &str, kind: CharacterKind) -> Character {
        Character {
            id: CharacterId::new(id),
            name: name.to_string(),
            attributes: CharacterAttributes::empty(kind),
        }
    }

    #[test]
    fn action_instruction_names_character_and_kind() {
        let bruno = character("b", "Bruno", CharacterKind::BipedAnimal);
        let text = action_instruction(&bruno);
        assert!(text.contains("\"Bruno\""));
        assert!(text.contains("two-legged anthropomorphic animal"));
    }

    #[test]
    fn dialogue_instruction_varies_with_target() {
        let request = DialogueRequest {
            speaker: character("a", "Aria", CharacterKind::Human),
            dialogue_type: DialogueType::Question,
            target: Some(character("b", "Bima", CharacterKind::Human)),
        };
        let scene = SceneContext {
            location: "Taman Kota".to_string(),
            time_of_day: Some(TimeOfDay::Morning),
        };
        let with_target = dialogue_instruction(&request, &scene);
        assert!(with_target.contains("a short question that Aria asks Bima"));
        assert!(with_target.contains("The scene takes place at Taman Kota."));
        assert!(with_target.contains("Time of day: pagi hari."));

        let untargeted = DialogueRequest {
            target: None,
            ..request
        };
        let without_target = dialogue_instruction(&untargeted, &SceneContext::default());
        assert!(without_target.contains("a short question that Aria asks in"));
        assert!(!without_target.contains("takes place"));
    }

    #[test]
    fn audience_instruction_ignores_target() {
        let request = DialogueRequest {
            speaker: character("a", "Aria", CharacterKind::Human),
            dialogue_type: DialogueType::AddressAudience,
            target: Some(character("b", "Bima", CharacterKind::Human)),
        };
        let text = dialogue_instruction(&request, &SceneContext::default());
        assert!(text.contains("directly to the audience"));
        assert!(!text.contains("Bima"));
    }

    #[test]
    fn strips_wrapping_quotes() {
        assert_eq!(strip_quotes("  \"Halo, apa kabar?\"\n"), "Halo, apa kabar?");
        assert_eq!(strip_quotes("“Ayo pergi!”"), "Ayo pergi!");
        assert_eq!(strip_quotes("Tanpa kutip"), "Tanpa kutip");
    }

    #[test]
    fn inner_quotes_survive_stripping() {
        assert_eq!(
            strip_quotes("\"Dia bilang 'halo'\""),
            "Dia bilang 'halo'"
        );
        assert_eq!(strip_quotes("'Ayo' katanya"), "'Ayo' katanya");
        assert_eq!(strip_quotes("«Kamu yakin?»"), "Kamu yakin?");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[tokio::test]
    async fn suggest_action_trims_result() {
        let mut port = MockGenerationPort::new();
        port.expect_generate()
            .withf(|req| req.instruction().is_some_and(|i| i.contains("Aria")))
            .times(1)
            .returning(|_| Ok("  melompat kegirangan \n".to_string()));

        let client = SuggestionClient::new(port);
        let aria = character("a", "Aria", CharacterKind::Human);
        assert_eq!(client.suggest_action(&aria).await.unwrap(), "melompat kegirangan");
    }

    #[tokio::test]
    async fn suggest_action_reports_service_failure() {
        let mut port = MockGenerationPort::new();
        port.expect_generate()
            .returning(|_| Err(GenerationError::status(500, "internal")));

        let client = SuggestionClient::new(port);
        let aria = character("a", "Aria", CharacterKind::Human);
        let err = client.suggest_action(&aria).await.unwrap_err();
        assert!(matches!(
            err,
            SuggestionError::Generation(GenerationError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn quote_only_sentence_is_empty() {
        let mut port = MockGenerationPort::new();
        port.expect_generate().returning(|_| Ok("\"\"".to_string()));

        let client = SuggestionClient::new(port);
        let request = DialogueRequest {
            speaker: character("a", "Aria", CharacterKind::Human),
            dialogue_type: DialogueType::Answer,
            target: None,
        };
        let err = client
            .suggest_dialogue_sentence(&request, &SceneContext::default())
            .await
            .unwrap_err();
        assert_eq!(err, SuggestionError::Generation(GenerationError::EmptyText));
    }
}
