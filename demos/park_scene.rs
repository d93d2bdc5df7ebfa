/// Park Scene example — builds a small scene in code and prints its prompt.
///
/// A girl and her anthropomorphic bear friend meet a stray cat in a city
/// park at golden hour. Shows every composition step: main-character
/// callout, introductions, actions with expressions, embedded and global
/// dialogue, scene attributes and free-form details.
///
/// Run with: cargo run --example park_scene

use scene_prompt::core::compose::compose;
use scene_prompt::core::draft::Draft;
use scene_prompt::core::store::EntityStore;
use scene_prompt::schema::character::{
    AgeBracket, BipedAttributes, CharacterAttributes, CharacterForm, Gender, HumanAttributes,
    QuadrupedAttributes, SkinColor,
};
use scene_prompt::schema::dialogue::{ActionUpdate, DialogueType, DialogueUpdate};
use scene_prompt::schema::scene::{
    CameraMotion, Lighting, Mood, SceneUpdate, StudioStyle, Technique, TimeOfDay, VisualStyle,
};

fn main() {
    let mut store = EntityStore::new();

    // --- Characters ---
    let sari = store
        .add_character(CharacterForm::new(
            "Sari",
            CharacterAttributes::Human(HumanAttributes {
                gender: Some(Gender::Female),
                age: Some("8 tahun".to_string()),
                skin_color: Some(SkinColor::Tan),
                clothing_accessories: Some("kaus kuning dan topi jerami".to_string()),
                ..Default::default()
            }),
        ))
        .expect("Sari is a valid character");

    let bruno = store
        .add_character(CharacterForm::new(
            "Bruno",
            CharacterAttributes::BipedAnimal(BipedAttributes {
                animal_type: "Beruang".to_string(),
                gender: Some(Gender::Male),
                age: Some(AgeBracket::Toddler),
                fur_colors: Some("cokelat madu".to_string()),
                clothing_accessories: Some("syal merah".to_string()),
                ..Default::default()
            }),
        ))
        .expect("Bruno is a valid character");

    let kiko = store
        .add_character(CharacterForm::new(
            "Kiko",
            CharacterAttributes::QuadrupedAnimal(QuadrupedAttributes {
                animal_type: "kucing oranye".to_string(),
                clothing_accessories: None,
            }),
        ))
        .expect("Kiko is a valid character");

    // --- Actions and expressions ---
    store.toggle_main_character(&sari).expect("known character");
    store.toggle_main_character(&bruno).expect("known character");
    store
        .set_character_action(&sari, ActionUpdate::Action("berjongkok di dekat bangku".into()))
        .expect("known character");
    store.set_expression(&sari, "penasaran").expect("known character");
    store
        .set_character_action(&bruno, ActionUpdate::Action("memegang roti".into()))
        .expect("known character");
    store.set_expression(&kiko, "waspada").expect("known character");

    let line = store.add_dialogue_line(&bruno).expect("known character");
    store
        .update_dialogue_line(&bruno, line, DialogueUpdate::Type(DialogueType::Question))
        .expect("line exists");
    store
        .update_dialogue_line(&bruno, line, DialogueUpdate::Sentence("Dia lapar, ya?".into()))
        .expect("line exists");

    // --- Global dialogue ---
    let reply = store.add_spoken_dialogue(&sari).expect("known character");
    store
        .update_spoken_dialogue(reply, DialogueUpdate::Target(Some(bruno.clone())))
        .expect("entry exists");
    store
        .update_spoken_dialogue(reply, DialogueUpdate::Sentence("Kita bagi rotinya!".into()))
        .expect("entry exists");

    let aside = store.add_spoken_dialogue(&kiko).expect("known character");
    store
        .update_spoken_dialogue(aside, DialogueUpdate::Type(DialogueType::AddressAudience))
        .expect("entry exists");
    store
        .update_spoken_dialogue(aside, DialogueUpdate::Sentence("Meong.".into()))
        .expect("entry exists");

    // --- Scene ---
    store.set_scene_attribute(SceneUpdate::Location("Taman Kota".into()));
    store.set_scene_attribute(SceneUpdate::TimeOfDay(Some(TimeOfDay::Afternoon)));
    store.set_scene_attribute(SceneUpdate::CameraMotion(Some(CameraMotion::DollyIn)));
    store.set_scene_attribute(SceneUpdate::Lighting(Some(Lighting::GoldenHour)));
    store.toggle_visual_style(VisualStyle::Technique(Technique::Animation3D));
    store.toggle_visual_style(VisualStyle::Studio(StudioStyle::Pixar));
    store.set_scene_attribute(SceneUpdate::Mood(Some(Mood::Cheerful)));
    store.set_scene_attribute(SceneUpdate::SoundMusic("Gitar akustik ringan".into()));
    store.set_scene_attribute(SceneUpdate::AdditionalDetails(
        "Durasi 8 detik, rasio 16:9.".into(),
    ));

    let composed = compose(&store);
    println!("=== Composed prompt ===\n");
    for sentence in composed.split_inclusive(". ") {
        println!("  {}", sentence.trim_end());
    }

    // --- Draft ---
    let draft = Draft {
        store,
        composed,
        refined: String::new(),
    };
    match draft.to_ron() {
        Ok(ron) => println!("\n=== Draft ({} bytes of RON) ===\n\n{}", ron.len(), ron),
        Err(e) => eprintln!("Failed to serialize draft: {}", e),
    }
}
