/// Scene Preview — prints the composed prompt of a saved draft.
///
/// Usage: scene_preview --drafts <dir> (--key <key> [--refine] | --list)
///
/// With `--refine` the composed prompt is sent to the generation service
/// (configured through SCENE_PROMPT_ENDPOINT / SCENE_PROMPT_API_KEY) and
/// the refined text is saved back into the draft.

use scene_prompt::core::compose::compose;
use scene_prompt::core::draft::{DraftStore, RonDraftStore};
use scene_prompt::core::generation::GeminiClient;
use scene_prompt::core::session::SceneSession;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_prompt=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scene_preview --drafts <dir> (--key <key> [--refine] | --list)");
        process::exit(0);
    }

    let mut drafts_dir = None;
    let mut key = None;
    let mut refine = false;
    let mut list = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--drafts" if i + 1 < args.len() => {
                i += 1;
                drafts_dir = Some(args[i].clone());
            }
            "--key" if i + 1 < args.len() => {
                i += 1;
                key = Some(args[i].clone());
            }
            "--refine" => refine = true,
            "--list" => list = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: scene_preview --drafts <dir> (--key <key> [--refine] | --list)");
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(drafts_dir) = drafts_dir else {
        eprintln!("ERROR: --drafts is required");
        process::exit(1);
    };
    let store = RonDraftStore::new(drafts_dir);

    if list {
        match store.list() {
            Ok(keys) if keys.is_empty() => println!("No drafts in {}", store.dir().display()),
            Ok(keys) => {
                for key in keys {
                    println!("{}", key);
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let Some(key) = key else {
        eprintln!("ERROR: --key or --list is required");
        process::exit(1);
    };

    let draft = match store.load(&key) {
        Ok(Some(draft)) => draft,
        Ok(None) => {
            eprintln!("ERROR: no draft named '{}' in {}", key, store.dir().display());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: failed to load draft '{}': {}", key, e);
            process::exit(1);
        }
    };

    if !refine {
        if draft.store.characters().is_empty() {
            eprintln!("ERROR: draft '{}' has no characters", key);
            process::exit(1);
        }
        println!("=== Composed ===\n{}", compose(&draft.store));
        if !draft.refined.is_empty() {
            println!("\n=== Refined (saved) ===\n{}", draft.refined);
        }
        return;
    }

    let client = match GeminiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    let session = SceneSession::from_draft(client, draft);

    match session.compose() {
        Ok(text) => println!("=== Composed ===\n{}", text),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }

    match session.refine().await {
        Ok(text) => println!("\n=== Refined ===\n{}", text),
        Err(e) => {
            eprintln!("ERROR: refinement failed: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = store.save(&key, &session.to_draft()) {
        eprintln!("ERROR: failed to save draft '{}': {}", key, e);
        process::exit(1);
    }
    println!("\nSaved to {}", store.dir().join(format!("{}.ron", key)).display());
}
