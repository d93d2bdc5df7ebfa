use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque, store-unique identifier for a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which attribute variant and which composition clauses apply to a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    Human,
    QuadrupedAnimal,
    BipedAnimal,
    FantasyCreature,
}

impl CharacterKind {
    /// Classifier article used in the authored language: people take
    /// "Seorang", every other kind takes "Seekor".
    pub fn article(&self) -> &'static str {
        match self {
            Self::Human => "Seorang",
            Self::QuadrupedAnimal | Self::BipedAnimal | Self::FantasyCreature => "Seekor",
        }
    }

    /// Short English noun used inside service instructions.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::QuadrupedAnimal => "four-legged animal",
            Self::BipedAnimal => "two-legged anthropomorphic animal",
            Self::FantasyCreature => "fantasy creature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Label used for people.
    pub fn human_label(&self) -> &'static str {
        match self {
            Self::Male => "Laki-laki",
            Self::Female => "Perempuan",
        }
    }

    /// Label used for animals.
    pub fn animal_label(&self) -> &'static str {
        match self {
            Self::Male => "Jantan",
            Self::Female => "Betina",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceShape {
    Oval,
    Round,
    Square,
    Heart,
    Long,
}

impl FaceShape {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Oval => "Oval",
            Self::Round => "Bulat",
            Self::Square => "Persegi",
            Self::Heart => "Hati",
            Self::Long => "Lonjong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinColor {
    Fair,
    Light,
    Tan,
    Brown,
    Dark,
}

impl SkinColor {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fair => "Putih",
            Self::Light => "Kuning Langsat",
            Self::Tan => "Sawo Matang",
            Self::Brown => "Cokelat",
            Self::Dark => "Gelap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    Slim,
    Athletic,
    Average,
    Stocky,
    Plump,
    Hunched,
}

impl BodyType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Slim => "Ramping",
            Self::Athletic => "Atletis dan Tegap",
            Self::Average => "Sedang",
            Self::Stocky => "Kekar",
            Self::Plump => "Gemuk",
            Self::Hunched => "Sedikit Membungkuk",
        }
    }
}

/// Coarse age bracket for two-legged animals, resolved through the
/// Age Descriptor Table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    Baby,
    Toddler,
    Child,
    Teen,
    YoungAdult,
    Adult,
    Elder,
}

/// The Age Descriptor Table: bracket, display label, canonical descriptor.
/// Ordered youngest first.
pub static AGE_DESCRIPTORS: [(AgeBracket, &str, &str); 7] = [
    (AgeBracket::Baby, "Bayi", "baby-style, tiny and round, oversized head"),
    (
        AgeBracket::Toddler,
        "Balita",
        "toddler-style, playful and chubby, short legs",
    ),
    (
        AgeBracket::Child,
        "Anak-anak",
        "child-style, energetic and small, slender limbs",
    ),
    (
        AgeBracket::Teen,
        "Remaja",
        "teen-style, lanky and expressive, growing limbs",
    ),
    (
        AgeBracket::YoungAdult,
        "Dewasa Muda",
        "young adult-style, fit and lively, balanced proportions",
    ),
    (
        AgeBracket::Adult,
        "Dewasa",
        "adult-style, mature and steady, full proportions",
    ),
    (
        AgeBracket::Elder,
        "Lansia",
        "elder-style, slow and wise, slightly hunched",
    ),
];

impl AgeBracket {
    /// All brackets in table order.
    pub fn all() -> impl Iterator<Item = AgeBracket> {
        AGE_DESCRIPTORS.iter().map(|(bracket, _, _)| *bracket)
    }

    pub fn label(&self) -> &'static str {
        self.entry().1
    }

    /// The canonical descriptive phrase for this bracket.
    pub fn descriptor(&self) -> &'static str {
        self.entry().2
    }

    fn entry(&self) -> &'static (AgeBracket, &'static str, &'static str) {
        // Every variant has exactly one row; the fallback is unreachable.
        AGE_DESCRIPTORS
            .iter()
            .find(|(bracket, _, _)| bracket == self)
            .unwrap_or(&AGE_DESCRIPTORS[0])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanAttributes {
    pub gender: Option<Gender>,
    pub face_shape: Option<FaceShape>,
    pub skin_color: Option<SkinColor>,
    pub body_type_posture: Option<BodyType>,
    pub age: Option<String>,
    pub height: Option<String>,
    pub clothing_accessories: Option<String>,
    pub additional_detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrupedAttributes {
    pub animal_type: String,
    pub clothing_accessories: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BipedAttributes {
    pub animal_type: String,
    pub gender: Option<Gender>,
    pub age: Option<AgeBracket>,
    pub body_shape_posture: Option<String>,
    pub nose_shape: Option<String>,
    pub face_feature: Option<String>,
    pub ear_feature: Option<String>,
    pub fur_characteristic: Option<String>,
    pub fur_colors: Option<String>,
    pub clothing_accessories: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FantasyAttributes {
    pub description: String,
}

/// Per-kind attribute set. The variant is the character's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharacterAttributes {
    Human(HumanAttributes),
    QuadrupedAnimal(QuadrupedAttributes),
    BipedAnimal(BipedAttributes),
    FantasyCreature(FantasyAttributes),
}

impl Default for CharacterAttributes {
    fn default() -> Self {
        Self::Human(HumanAttributes::default())
    }
}

impl CharacterAttributes {
    pub fn kind(&self) -> CharacterKind {
        match self {
            Self::Human(_) => CharacterKind::Human,
            Self::QuadrupedAnimal(_) => CharacterKind::QuadrupedAnimal,
            Self::BipedAnimal(_) => CharacterKind::BipedAnimal,
            Self::FantasyCreature(_) => CharacterKind::FantasyCreature,
        }
    }

    /// Empty attribute set for a kind.
    pub fn empty(kind: CharacterKind) -> Self {
        match kind {
            CharacterKind::Human => Self::Human(HumanAttributes::default()),
            CharacterKind::QuadrupedAnimal => {
                Self::QuadrupedAnimal(QuadrupedAttributes::default())
            }
            CharacterKind::BipedAnimal => Self::BipedAnimal(BipedAttributes::default()),
            CharacterKind::FantasyCreature => {
                Self::FantasyCreature(FantasyAttributes::default())
            }
        }
    }
}

/// A committed scene participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub attributes: CharacterAttributes,
}

impl Character {
    pub fn kind(&self) -> CharacterKind {
        self.attributes.kind()
    }

    /// Checks the fields a character must carry before it can be committed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let CharacterAttributes::BipedAnimal(attrs) = &self.attributes {
            if attrs.animal_type.trim().is_empty() {
                return Err(ValidationError::MissingAnimalType);
            }
        }
        Ok(())
    }
}

/// Validation failures surfaced to the author. State is never modified
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("character name must not be empty")]
    EmptyName,
    #[error("a two-legged animal needs an animal type")]
    MissingAnimalType,
    #[error("the scene has no characters yet")]
    NoCharacters,
}

/// Transient form fields edited before a character is saved.
///
/// `commit` is the "save character" action: it trims the name, blanks
/// out empty optional text and checks the required fields.
#[derive(Debug, Clone, Default)]
pub struct CharacterForm {
    pub name: String,
    pub attributes: Option<CharacterAttributes>,
}

impl CharacterForm {
    pub fn new(name: impl Into<String>, attributes: CharacterAttributes) -> Self {
        Self {
            name: name.into(),
            attributes: Some(attributes),
        }
    }

    pub fn commit(self, id: CharacterId) -> Result<Character, ValidationError> {
        let attributes = normalize(self.attributes.unwrap_or_default());
        let character = Character {
            id,
            name: self.name.trim().to_string(),
            attributes,
        };
        character.validate()?;
        Ok(character)
    }
}

fn blank_to_none(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize(attributes: CharacterAttributes) -> CharacterAttributes {
    match attributes {
        CharacterAttributes::Human(h) => CharacterAttributes::Human(HumanAttributes {
            age: blank_to_none(h.age),
            height: blank_to_none(h.height),
            clothing_accessories: blank_to_none(h.clothing_accessories),
            additional_detail: blank_to_none(h.additional_detail),
            ..h
        }),
        CharacterAttributes::QuadrupedAnimal(q) => {
            CharacterAttributes::QuadrupedAnimal(QuadrupedAttributes {
                animal_type: q.animal_type.trim().to_string(),
                clothing_accessories: blank_to_none(q.clothing_accessories),
            })
        }
        CharacterAttributes::BipedAnimal(b) => CharacterAttributes::BipedAnimal(BipedAttributes {
            animal_type: b.animal_type.trim().to_string(),
            body_shape_posture: blank_to_none(b.body_shape_posture),
            nose_shape: blank_to_none(b.nose_shape),
            face_feature: blank_to_none(b.face_feature),
            ear_feature: blank_to_none(b.ear_feature),
            fur_characteristic: blank_to_none(b.fur_characteristic),
            fur_colors: blank_to_none(b.fur_colors),
            clothing_accessories: blank_to_none(b.clothing_accessories),
            ..b
        }),
        CharacterAttributes::FantasyCreature(f) => {
            CharacterAttributes::FantasyCreature(FantasyAttributes {
                description: f.description.trim().to_string(),
            })
        }
    }
}
