/// Template compiler: Entity Store snapshot → narrative prompt.
///
/// Composition runs in a fixed order and every step appends zero or more
/// sentences. Sentences are joined with a single space. References that no
/// longer resolve are skipped, so composing never fails.

use crate::core::store::EntityStore;
use crate::schema::character::{
    BipedAttributes, Character, CharacterAttributes, FantasyAttributes, HumanAttributes,
    QuadrupedAttributes,
};
use crate::schema::dialogue::{DialogueType, SpokenDialogue};

/// Builds the full narrative prompt for a store snapshot.
pub fn compose(store: &EntityStore) -> String {
    let mut sentences = Vec::new();

    push_main_characters(&mut sentences, store);
    push_introductions(&mut sentences, store);
    push_actions(&mut sentences, store);
    push_scene(&mut sentences, store);
    push_spoken_dialogue(&mut sentences, store);
    push_additional_details(&mut sentences, store);

    sentences.join(" ")
}

/// Joins names with the authored-language conjunction: `A`, `A dan B`,
/// `A, B dan C`.
pub fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} dan {}", init.join(", "), last),
    }
}

fn push_main_characters(sentences: &mut Vec<String>, store: &EntityStore) {
    let names: Vec<&str> = store
        .characters()
        .iter()
        .filter(|c| store.action(&c.id).is_some_and(|a| a.is_main))
        .map(|c| c.name.as_str())
        .collect();

    if !names.is_empty() {
        sentences.push(format!("Karakter utama: {}.", join_names(&names)));
    }
}

fn push_introductions(sentences: &mut Vec<String>, store: &EntityStore) {
    for character in store.characters() {
        sentences.push(introduce(character));
    }
}

/// Descriptive introduction sentence for one character.
pub fn introduce(character: &Character) -> String {
    let article = character.kind().article();
    let (head, clauses) = match &character.attributes {
        CharacterAttributes::Human(attrs) => human_clauses(attrs),
        CharacterAttributes::QuadrupedAnimal(attrs) => quadruped_clauses(attrs),
        CharacterAttributes::BipedAnimal(attrs) => biped_clauses(attrs),
        CharacterAttributes::FantasyCreature(attrs) => fantasy_clauses(attrs),
    };

    let mut sentence = format!("{} {} bernama {}", article, head, character.name.trim());
    for clause in clauses {
        sentence.push_str(", ");
        sentence.push_str(&clause);
    }
    sentence.push('.');
    sentence
}

/// Trimmed, lower-cased text, or `None` when blank.
fn lowered(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn human_clauses(attrs: &HumanAttributes) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    if let Some(gender) = attrs.gender {
        clauses.push(format!("berjenis kelamin {}", gender.human_label().to_lowercase()));
    }
    if let Some(age) = lowered(attrs.age.as_deref()) {
        clauses.push(format!("berusia {}", age));
    }
    if let Some(height) = lowered(attrs.height.as_deref()) {
        clauses.push(format!("dengan tinggi {}", height));
    }
    if let Some(face) = attrs.face_shape {
        clauses.push(format!("berwajah {}", face.label().to_lowercase()));
    }
    if let Some(skin) = attrs.skin_color {
        clauses.push(format!("berkulit {}", skin.label().to_lowercase()));
    }
    if let Some(body) = attrs.body_type_posture {
        clauses.push(format!("bertubuh {}", body.label().to_lowercase()));
    }
    if let Some(clothing) = lowered(attrs.clothing_accessories.as_deref()) {
        clauses.push(format!("mengenakan {}", clothing));
    }
    if let Some(detail) = lowered(attrs.additional_detail.as_deref()) {
        clauses.push(detail);
    }
    ("karakter".to_string(), clauses)
}

fn quadruped_clauses(attrs: &QuadrupedAttributes) -> (String, Vec<String>) {
    let head = lowered(Some(attrs.animal_type.as_str()))
        .unwrap_or_else(|| "hewan berkaki empat".to_string());
    let mut clauses = Vec::new();
    if let Some(clothing) = lowered(attrs.clothing_accessories.as_deref()) {
        clauses.push(format!("mengenakan {}", clothing));
    }
    (head, clauses)
}

fn biped_clauses(attrs: &BipedAttributes) -> (String, Vec<String>) {
    let animal =
        lowered(Some(attrs.animal_type.as_str())).unwrap_or_else(|| "hewan".to_string());
    let head = format!("{} antropomorfik berkaki dua", animal);

    let mut clauses = Vec::new();
    if let Some(gender) = attrs.gender {
        clauses.push(format!("berjenis kelamin {}", gender.animal_label().to_lowercase()));
    }
    if let Some(age) = attrs.age {
        clauses.push(format!(
            "berusia {} ({})",
            age.label().to_lowercase(),
            age.descriptor()
        ));
    }
    let optional = [
        ("bertubuh", &attrs.body_shape_posture),
        ("berhidung", &attrs.nose_shape),
        ("dengan wajah", &attrs.face_feature),
        ("bertelinga", &attrs.ear_feature),
        ("berbulu warna", &attrs.fur_colors),
        ("dengan bulu", &attrs.fur_characteristic),
        ("mengenakan", &attrs.clothing_accessories),
    ];
    for (prefix, field) in optional {
        if let Some(value) = lowered(field.as_deref()) {
            clauses.push(format!("{} {}", prefix, value));
        }
    }
    (head, clauses)
}

fn fantasy_clauses(attrs: &FantasyAttributes) -> (String, Vec<String>) {
    let clauses = lowered(Some(attrs.description.as_str())).into_iter().collect();
    ("makhluk fantasi".to_string(), clauses)
}

fn push_actions(sentences: &mut Vec<String>, store: &EntityStore) {
    for entry in store.actions() {
        let Some(character) = store.character(&entry.char_id) else {
            continue;
        };
        let name = character.name.trim();
        let action = lowered(Some(entry.action.as_str()));
        let expression = lowered(store.expression(&entry.char_id));

        match (action, expression) {
            (Some(action), Some(expression)) => sentences.push(format!(
                "{} sedang {} dengan ekspresi {}.",
                name, action, expression
            )),
            (Some(action), None) => sentences.push(format!("{} sedang {}.", name, action)),
            (None, Some(expression)) => {
                sentences.push(format!("{} menunjukkan ekspresi {}.", name, expression))
            }
            (None, None) => {}
        }

        for line in &entry.dialogue_lines {
            let sentence = line.sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            // Embedded lines only distinguish questions; audience lines
            // render as answers.
            let verb = match line.dialogue_type {
                DialogueType::Question => "bertanya",
                DialogueType::Answer | DialogueType::AddressAudience => "menjawab",
            };
            sentences.push(format!("{} {}: \"{}\"", name, verb, sentence));
        }
    }
}

fn push_scene(sentences: &mut Vec<String>, store: &EntityStore) {
    let scene = store.scene();

    let location = scene.location.trim();
    if !location.is_empty() {
        sentences.push(format!("Lokasi: {}.", location));
    }
    if let Some(time) = scene.time_of_day {
        sentences.push(format!("Waktu: {}.", time.label().to_lowercase()));
    }
    if let Some(camera) = scene.camera_motion {
        sentences.push(format!("Gerakan kamera: {}.", camera.display_label()));
    }
    if let Some(lighting) = scene.lighting {
        sentences.push(format!("Pencahayaan: {}.", lighting.label().to_lowercase()));
    }
    if !scene.visual_styles.is_empty() {
        let styles: Vec<String> = scene
            .visual_styles
            .iter()
            .map(|s| s.label().to_lowercase())
            .collect();
        sentences.push(format!("Gaya visual: {}.", styles.join(", ")));
    }
    if let Some(mood) = scene.mood {
        sentences.push(format!("Suasana: {}.", mood.label().to_lowercase()));
    }
    let sound = scene.sound_music.trim();
    if !sound.is_empty() {
        sentences.push(format!("Suara/musik: {}.", sound));
    }
}

fn push_spoken_dialogue(sentences: &mut Vec<String>, store: &EntityStore) {
    for entry in store.spoken_dialogue() {
        if let Some(line) = render_spoken(entry, store) {
            sentences.push(line);
        }
    }
}

fn render_spoken(entry: &SpokenDialogue, store: &EntityStore) -> Option<String> {
    let sentence = entry.sentence.trim();
    if sentence.is_empty() {
        return None;
    }
    let speaker = store.character(&entry.char_id)?.name.trim();
    let target = entry
        .target_char_id
        .as_ref()
        .filter(|id| **id != entry.char_id)
        .and_then(|id| store.character(id))
        .map(|c| c.name.trim());

    let line = match (entry.dialogue_type, target) {
        (DialogueType::Question, Some(target)) => {
            format!("{} bertanya kepada {}: \"{}\"", speaker, target, sentence)
        }
        (DialogueType::Question, None) => format!("{} bertanya: \"{}\"", speaker, sentence),
        (DialogueType::Answer, Some(target)) => {
            format!("{} menjawab {}: \"{}\"", speaker, target, sentence)
        }
        (DialogueType::Answer, None) => format!("{} menjawab: \"{}\"", speaker, sentence),
        (DialogueType::AddressAudience, _) => {
            format!("{} berbicara kepada penonton: \"{}\"", speaker, sentence)
        }
    };
    Some(line)
}

fn push_additional_details(sentences: &mut Vec<String>, store: &EntityStore) {
    let details = store.scene().additional_details.trim();
    if !details.is_empty() {
        sentences.push(details.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::{AgeBracket, CharacterId, Gender};
    use crate::schema::dialogue::{ActionUpdate, DialogueUpdate};
    use crate::schema::scene::{CameraMotion, SceneUpdate, StudioStyle, Technique, VisualStyle};

    fn character(id: &str, name: &str, attributes: CharacterAttributes) -> Character {
        Character {
            id: CharacterId::new(id),
            name: name.to_string(),
            attributes,
        }
    }

    #[test]
    fn join_names_uses_conjunction() {
        assert_eq!(join_names(&[]), "");
        assert_eq!(join_names(&["Aria"]), "Aria");
        assert_eq!(join_names(&["Aria", "Bima"]), "Aria dan Bima");
        assert_eq!(join_names(&["Aria", "Bima", "Citra"]), "Aria, Bima dan Citra");
    }

    #[test]
    fn empty_store_composes_empty_string() {
        assert_eq!(compose(&EntityStore::new()), "");
    }

    #[test]
    fn human_clause_order() {
        let aria = character(
            "a",
            "Aria",
            CharacterAttributes::Human(HumanAttributes {
                gender: Some(Gender::Female),
                age: Some("25 Tahun".to_string()),
                skin_color: Some(crate::schema::character::SkinColor::Tan),
                clothing_accessories: Some("Gaun Merah".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(
            introduce(&aria),
            "Seorang karakter bernama Aria, berjenis kelamin perempuan, berusia 25 tahun, \
             berkulit sawo matang, mengenakan gaun merah."
        );
    }

    #[test]
    fn quadruped_without_type_gets_generic_noun() {
        let rex = character(
            "r",
            "Rex",
            CharacterAttributes::QuadrupedAnimal(QuadrupedAttributes::default()),
        );
        assert_eq!(introduce(&rex), "Seekor hewan berkaki empat bernama Rex.");
    }

    #[test]
    fn biped_includes_age_descriptor() {
        let bruno = character(
            "b",
            "Bruno",
            CharacterAttributes::BipedAnimal(BipedAttributes {
                animal_type: "Beruang".to_string(),
                gender: Some(Gender::Male),
                age: Some(AgeBracket::Toddler),
                fur_colors: Some("Cokelat Madu".to_string()),
                fur_characteristic: Some("Lebat".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(
            introduce(&bruno),
            "Seekor beruang antropomorfik berkaki dua bernama Bruno, berjenis kelamin jantan, \
             berusia balita (toddler-style, playful and chubby, short legs), \
             berbulu warna cokelat madu, dengan bulu lebat."
        );
    }

    #[test]
    fn fantasy_appends_lowercased_description() {
        let naga = character(
            "n",
            "Naga",
            CharacterAttributes::FantasyCreature(FantasyAttributes {
                description: "Bersisik Emas dan Bersayap Kristal".to_string(),
            }),
        );
        assert_eq!(
            introduce(&naga),
            "Seekor makhluk fantasi bernama Naga, bersisik emas dan bersayap kristal."
        );
    }

    #[test]
    fn action_with_expression_and_embedded_dialogue() {
        let mut store = EntityStore::new();
        store
            .upsert_character(character("a", "Aria", CharacterAttributes::default()))
            .unwrap();
        let a: CharacterId = "a".into();
        store
            .set_character_action(&a, ActionUpdate::Action("Melambaikan Tangan".into()))
            .unwrap();
        store.set_expression(&a, "Gembira").unwrap();
        let q = store.add_dialogue_line(&a).unwrap();
        store
            .update_dialogue_line(&a, q, DialogueUpdate::Type(DialogueType::Question))
            .unwrap();
        store
            .update_dialogue_line(&a, q, DialogueUpdate::Sentence("Siapa di sana?".into()))
            .unwrap();
        let aud = store.add_dialogue_line(&a).unwrap();
        store
            .update_dialogue_line(&a, aud, DialogueUpdate::Type(DialogueType::AddressAudience))
            .unwrap();
        store
            .update_dialogue_line(&a, aud, DialogueUpdate::Sentence("Halo semua!".into()))
            .unwrap();

        let text = compose(&store);
        assert!(text.contains("Aria sedang melambaikan tangan dengan ekspresi gembira."));
        assert!(text.contains("Aria bertanya: \"Siapa di sana?\""));
        assert!(text.contains("Aria menjawab: \"Halo semua!\""));
    }

    #[test]
    fn expression_without_action() {
        let mut store = EntityStore::new();
        store
            .upsert_character(character("a", "Aria", CharacterAttributes::default()))
            .unwrap();
        store.toggle_main_character(&"a".into()).unwrap();
        store.set_expression(&"a".into(), "Kaget").unwrap();
        assert!(compose(&store).contains("Aria menunjukkan ekspresi kaget."));
    }

    #[test]
    fn scene_attributes_in_fixed_order() {
        let mut store = EntityStore::new();
        store.set_scene_attribute(SceneUpdate::SoundMusic("Gamelan lembut".into()));
        store.set_scene_attribute(SceneUpdate::CameraMotion(Some(CameraMotion::DollyIn)));
        store.set_scene_attribute(SceneUpdate::Location("Pasar Terapung".into()));
        store.toggle_visual_style(VisualStyle::Technique(Technique::Animation3D));
        store.toggle_visual_style(VisualStyle::Studio(StudioStyle::Pixar));
        store.set_scene_attribute(SceneUpdate::AdditionalDetails("Durasi 8 Detik.".into()));

        assert_eq!(
            compose(&store),
            "Lokasi: Pasar Terapung. Gerakan kamera: Dolly In. \
             Gaya visual: animasi 3d, gaya pixar. Suara/musik: Gamelan lembut. Durasi 8 Detik."
        );
    }
}
