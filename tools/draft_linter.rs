/// Draft Linter — checks saved drafts for references and fields that
/// would be skipped or rejected when the scene is edited or composed.
///
/// Usage: draft_linter <drafts_dir>

use scene_prompt::core::draft::{Draft, DraftStore, RonDraftStore};
use scene_prompt::schema::character::CharacterId;
use scene_prompt::schema::dialogue::DialogueType;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: draft_linter <drafts_dir>");
        process::exit(0);
    }

    let dir = Path::new(&args[1]);
    if !dir.is_dir() {
        eprintln!("ERROR: Path '{}' is not a directory", args[1]);
        process::exit(1);
    }

    let store = RonDraftStore::new(dir);
    let keys = match store.list() {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("ERROR: Failed to list drafts: {}", e);
            process::exit(1);
        }
    };

    println!("Found {} drafts", keys.len());

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for key in &keys {
        match store.load(key) {
            Ok(Some(draft)) => {
                let (e, w) = lint_draft(&draft);
                errors.extend(e.into_iter().map(|msg| format!("[{}] {}", key, msg)));
                warnings.extend(w.into_iter().map(|msg| format!("[{}] {}", key, msg)));
            }
            Ok(None) => {}
            Err(e) => errors.push(format!("[{}] failed to load: {}", key, e)),
        }
    }

    println!("\n=== Draft Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_draft(draft: &Draft) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let store = &draft.store;
    let known = |id: &CharacterId| store.contains_character(id);

    if store.characters().is_empty() {
        warnings.push("Draft has no characters and cannot be composed".to_string());
    }

    for character in store.characters() {
        if let Err(e) = character.validate() {
            errors.push(format!("Character '{}': {}", character.id, e));
        }
    }

    for entry in store.actions() {
        if !known(&entry.char_id) {
            warnings.push(format!(
                "Action entry for unknown character '{}' is never composed",
                entry.char_id
            ));
        }
        for (i, line) in entry.dialogue_lines.iter().enumerate() {
            if line.sentence.trim().is_empty() {
                warnings.push(format!("Dialogue line {} of '{}' is empty", i, entry.char_id));
            }
            if let Some(target) = &line.target_char_id {
                if target == &entry.char_id {
                    errors.push(format!(
                        "Dialogue line {} of '{}' is addressed to its own speaker",
                        i, entry.char_id
                    ));
                } else if !known(target) {
                    errors.push(format!(
                        "Dialogue line {} of '{}' targets unknown character '{}'",
                        i, entry.char_id, target
                    ));
                }
            }
        }
    }

    for (id, _) in store.expressions() {
        if !known(id) {
            warnings.push(format!("Expression for unknown character '{}'", id));
        }
    }

    for (i, entry) in store.spoken_dialogue().iter().enumerate() {
        if !known(&entry.char_id) {
            errors.push(format!(
                "Spoken dialogue {} has unknown speaker '{}'",
                i, entry.char_id
            ));
        }
        if entry.sentence.trim().is_empty() {
            warnings.push(format!("Spoken dialogue {} is empty", i));
        }
        if let Some(target) = &entry.target_char_id {
            if target == &entry.char_id {
                errors.push(format!("Spoken dialogue {} is addressed to its own speaker", i));
            } else if !known(target) {
                errors.push(format!(
                    "Spoken dialogue {} targets unknown character '{}'",
                    i, target
                ));
            } else if entry.dialogue_type == DialogueType::AddressAudience {
                warnings.push(format!(
                    "Spoken dialogue {} addresses the audience but keeps a target",
                    i
                ));
            }
        }
    }

    if !draft.refined.is_empty() && draft.composed.trim().is_empty() {
        warnings.push("Refined text saved without a composed prompt".to_string());
    }

    (errors, warnings)
}
