/// Composition integration tests — whole scenes through the store and compiler.

use scene_prompt::core::compose::compose;
use scene_prompt::core::draft::Draft;
use scene_prompt::core::store::{EntityStore, StoreError};
use scene_prompt::schema::character::{
    AgeBracket, BipedAttributes, CharacterAttributes, CharacterForm, CharacterId, Gender,
    HumanAttributes, QuadrupedAttributes,
};
use scene_prompt::schema::dialogue::{ActionUpdate, DialogueType, DialogueUpdate};
use scene_prompt::schema::scene::{
    ArtisticStyle, CameraMotion, Lighting, Mood, SceneUpdate, Technique, TimeOfDay, VisualStyle,
};

fn add_human(store: &mut EntityStore, name: &str) -> CharacterId {
    store
        .add_character(CharacterForm::new(
            name,
            CharacterAttributes::Human(HumanAttributes::default()),
        ))
        .unwrap()
}

#[test]
fn single_human_introduction_only() {
    let mut store = EntityStore::new();
    store
        .add_character(CharacterForm::new(
            "Aria",
            CharacterAttributes::Human(HumanAttributes {
                gender: Some(Gender::Female),
                age: Some("25 tahun".to_string()),
                ..Default::default()
            }),
        ))
        .unwrap();

    let text = compose(&store);
    assert_eq!(
        text,
        "Seorang karakter bernama Aria, berjenis kelamin perempuan, berusia 25 tahun."
    );
}

#[test]
fn biped_toddler_descriptor_is_parenthesized() {
    let mut store = EntityStore::new();
    store
        .add_character(CharacterForm::new(
            "Bruno",
            CharacterAttributes::BipedAnimal(BipedAttributes {
                animal_type: "Beruang".to_string(),
                age: Some(AgeBracket::Toddler),
                ..Default::default()
            }),
        ))
        .unwrap();

    let text = compose(&store);
    assert!(text.starts_with("Seekor beruang antropomorfik berkaki dua bernama Bruno"));
    assert!(text.contains("(toddler-style, playful and chubby, short legs)"));
}

#[test]
fn main_character_callout_comes_first() {
    let mut store = EntityStore::new();
    let _aria = add_human(&mut store, "Aria");
    let bima = add_human(&mut store, "Bima");
    store.toggle_main_character(&bima).unwrap();

    let text = compose(&store);
    let first = text.split(". ").next().unwrap();
    assert_eq!(first, "Karakter utama: Bima");
    assert!(!first.contains("Aria"));
}

#[test]
fn empty_lines_are_dropped_and_targeted_question_renders_once() {
    let mut store = EntityStore::new();
    let aria = add_human(&mut store, "Aria");
    let bima = add_human(&mut store, "Bima");

    // An embedded line with no sentence contributes nothing.
    store.add_dialogue_line(&aria).unwrap();

    let idx = store.add_spoken_dialogue(&aria).unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Type(DialogueType::Question))
        .unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Target(Some(bima.clone())))
        .unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Sentence("Mau ke mana?".to_string()))
        .unwrap();

    let text = compose(&store);
    assert_eq!(text.matches('"').count(), 2);
    assert_eq!(text.matches("Aria bertanya kepada Bima: \"Mau ke mana?\"").count(), 1);
    assert!(!text.contains("menjawab"));
}

#[test]
fn full_scene_in_composition_order() {
    let mut store = EntityStore::new();
    let aria = add_human(&mut store, "Aria");
    let kiko = store
        .add_character(CharacterForm::new(
            "Kiko",
            CharacterAttributes::QuadrupedAnimal(QuadrupedAttributes {
                animal_type: "Kucing Oranye".to_string(),
                clothing_accessories: Some("Kalung Lonceng".to_string()),
            }),
        ))
        .unwrap();

    store.toggle_main_character(&aria).unwrap();
    store
        .set_character_action(&aria, ActionUpdate::Action("Memberi Makan Kucing".to_string()))
        .unwrap();
    store
        .set_character_action(&kiko, ActionUpdate::Action("Mengeong".to_string()))
        .unwrap();
    store.set_expression(&kiko, "Penasaran").unwrap();

    store.set_scene_attribute(SceneUpdate::Location("Taman Kota".to_string()));
    store.set_scene_attribute(SceneUpdate::TimeOfDay(Some(TimeOfDay::Morning)));
    store.set_scene_attribute(SceneUpdate::CameraMotion(Some(CameraMotion::DollyIn)));
    store.set_scene_attribute(SceneUpdate::Lighting(Some(Lighting::GoldenHour)));
    store.toggle_visual_style(VisualStyle::Technique(Technique::Animation3D));
    store.toggle_visual_style(VisualStyle::Artistic(ArtisticStyle::Watercolor));
    store.set_scene_attribute(SceneUpdate::Mood(Some(Mood::Cheerful)));
    store.set_scene_attribute(SceneUpdate::SoundMusic("Kicau burung".to_string()));

    let idx = store.add_spoken_dialogue(&kiko).unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Type(DialogueType::AddressAudience))
        .unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Sentence("Meong!".to_string()))
        .unwrap();
    store.set_scene_attribute(SceneUpdate::AdditionalDetails(
        "Durasi 8 detik, rasio 16:9.".to_string(),
    ));

    let text = compose(&store);
    let order = [
        "Karakter utama: Aria.",
        "Seorang karakter bernama Aria.",
        "Seekor kucing oranye bernama Kiko, mengenakan kalung lonceng.",
        "Aria sedang memberi makan kucing.",
        "Kiko sedang mengeong dengan ekspresi penasaran.",
        "Lokasi: Taman Kota.",
        "Waktu: pagi hari.",
        "Gerakan kamera: Dolly In.",
        "Pencahayaan:",
        "Gaya visual: animasi 3d, cat air.",
        "Suasana:",
        "Suara/musik: Kicau burung.",
        "Kiko berbicara kepada penonton: \"Meong!\"",
        "Durasi 8 detik, rasio 16:9.",
    ];
    let mut cursor = 0;
    for piece in order {
        let at = text[cursor..]
            .find(piece)
            .unwrap_or_else(|| panic!("missing or out of order: {piece}\n{text}"));
        cursor += at + piece.len();
    }
}

#[test]
fn compose_is_deterministic() {
    let mut store = EntityStore::new();
    let ids: Vec<CharacterId> = ["Aria", "Bima", "Citra", "Dodi"]
        .iter()
        .map(|name| add_human(&mut store, name))
        .collect();
    for (n, id) in ids.iter().enumerate().rev() {
        store
            .set_character_action(id, ActionUpdate::Action(format!("menari ke-{}", n)))
            .unwrap();
        store.set_expression(id, "senang").unwrap();
    }
    store.toggle_main_character(&ids[0]).unwrap();
    store.toggle_main_character(&ids[2]).unwrap();

    let first = compose(&store);
    let second = compose(&store.clone());
    assert_eq!(first, second);
    assert!(first.starts_with("Karakter utama: Aria dan Citra."));

    // Action entries render in the order they were first edited.
    let dodi = first.find("Dodi sedang").unwrap();
    let aria = first.find("Aria sedang").unwrap();
    assert!(dodi < aria);
}

#[test]
fn removal_cascades_and_compose_stays_quiet() {
    let mut store = EntityStore::new();
    let aria = add_human(&mut store, "Aria");
    let bima = add_human(&mut store, "Bima");

    store
        .set_character_action(&bima, ActionUpdate::Action("duduk".to_string()))
        .unwrap();
    store.set_expression(&bima, "lelah").unwrap();

    let line = store.add_dialogue_line(&aria).unwrap();
    store
        .update_dialogue_line(&aria, line, DialogueUpdate::Target(Some(bima.clone())))
        .unwrap();
    store
        .update_dialogue_line(&aria, line, DialogueUpdate::Sentence("Kamu capek?".to_string()))
        .unwrap();

    let asked = store.add_spoken_dialogue(&aria).unwrap();
    store
        .update_spoken_dialogue(asked, DialogueUpdate::Target(Some(bima.clone())))
        .unwrap();
    store
        .update_spoken_dialogue(asked, DialogueUpdate::Sentence("Ayo pulang.".to_string()))
        .unwrap();
    let spoken_by_bima = store.add_spoken_dialogue(&bima).unwrap();
    store
        .update_spoken_dialogue(spoken_by_bima, DialogueUpdate::Sentence("Iya.".to_string()))
        .unwrap();

    store.remove_character(&bima).unwrap();

    assert!(store.action(&bima).is_none());
    assert!(store.expression(&bima).is_none());
    assert_eq!(store.spoken_dialogue().len(), 1);
    assert_eq!(store.spoken_dialogue()[0].target_char_id, None);
    assert_eq!(store.dialogue_line(&aria, line).unwrap().target_char_id, None);

    let text = compose(&store);
    assert!(!text.contains("Bima"));
    assert!(text.contains("Aria menjawab: \"Kamu capek?\""));
    assert!(text.contains("Aria menjawab: \"Ayo pulang.\""));
}

#[test]
fn self_target_is_rejected_everywhere() {
    let mut store = EntityStore::new();
    let aria = add_human(&mut store, "Aria");
    let bima = add_human(&mut store, "Bima");

    let line = store.add_dialogue_line(&aria).unwrap();
    assert_eq!(
        store.update_dialogue_line(&aria, line, DialogueUpdate::Target(Some(aria.clone()))),
        Err(StoreError::SelfTarget(aria.clone()))
    );

    let idx = store.add_spoken_dialogue(&aria).unwrap();
    store
        .update_spoken_dialogue(idx, DialogueUpdate::Target(Some(bima.clone())))
        .unwrap();
    let before = store.clone();
    assert_eq!(
        store.update_spoken_dialogue(idx, DialogueUpdate::Speaker(bima.clone())),
        Err(StoreError::SelfTarget(bima.clone()))
    );
    assert_eq!(store, before);
}

#[test]
fn stale_references_are_skipped_at_render() {
    let input = r#"(
        store: (
            characters: [
                (id: ("a"), name: "Aria"),
                (id: ("b"), name: "Bima"),
            ],
            actions: {
                ("ghost"): (char_id: ("ghost"), action: "menari"),
            },
            action_order: [("ghost")],
            spoken_dialogue: [
                (char_id: ("ghost"), sentence: "Aku masih di sini."),
                (
                    char_id: ("a"),
                    dialogue_type: Question,
                    target_char_id: Some(("a")),
                    sentence: "Siapa itu?",
                ),
            ],
        ),
    )"#;
    let draft = Draft::parse_ron(input).unwrap();
    assert!(draft.store.action(&"ghost".into()).is_some());

    let text = compose(&draft.store);
    assert!(!text.contains("menari"));
    assert!(!text.contains("Aku masih di sini."));
    assert!(text.contains("Aria bertanya: \"Siapa itu?\""));
    assert!(!text.contains("kepada Aria"));
}
