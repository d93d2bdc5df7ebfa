/// Scene session — owns the Entity Store and the two output strings, runs
/// suggestion and refinement requests, and writes their results back.
///
/// The store sits behind a single lock that is never held across a network
/// call: a request snapshots what it needs, awaits the service, then applies
/// its result in one locked step. Overlapping requests for the same key are
/// not sequenced, so whichever response resolves last determines the final
/// value.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::compose::compose;
use crate::core::draft::Draft;
use crate::core::generation::GenerationPort;
use crate::core::inflight::InFlight;
use crate::core::refine::{RefineError, RefinementClient};
use crate::core::store::EntityStore;
use crate::core::suggest::{
    DialogueRequest, SceneContext, SuggestionClient, SuggestionError, SuggestionKey,
};
use crate::schema::character::{CharacterId, ValidationError};
use crate::schema::dialogue::{ActionUpdate, DialogueType, DialogueUpdate};

#[derive(Debug, Default)]
struct Outputs {
    composed: String,
    refined: Option<String>,
}

pub struct SceneSession<G> {
    store: Mutex<EntityStore>,
    outputs: Mutex<Outputs>,
    suggestions: SuggestionClient<Arc<G>>,
    refinement: RefinementClient<Arc<G>>,
    loading: InFlight<SuggestionKey>,
    refining: InFlight<()>,
}

impl<G: GenerationPort> SceneSession<G> {
    pub fn new(port: G) -> Self {
        Self::with_store(port, EntityStore::new())
    }

    pub fn with_store(port: G, store: EntityStore) -> Self {
        let port = Arc::new(port);
        Self {
            store: Mutex::new(store),
            outputs: Mutex::new(Outputs::default()),
            suggestions: SuggestionClient::new(Arc::clone(&port)),
            refinement: RefinementClient::new(port),
            loading: InFlight::new(),
            refining: InFlight::new(),
        }
    }

    /// Restores a session from a saved draft.
    pub fn from_draft(port: G, draft: Draft) -> Self {
        let session = Self::with_store(port, draft.store);
        {
            let mut outputs = session.outputs();
            outputs.composed = draft.composed;
            outputs.refined = Some(draft.refined).filter(|r| !r.is_empty());
        }
        session
    }

    pub fn to_draft(&self) -> Draft {
        let outputs = self.outputs();
        Draft {
            store: self.snapshot(),
            composed: outputs.composed.clone(),
            refined: outputs.refined.clone().unwrap_or_default(),
        }
    }

    fn store(&self) -> MutexGuard<'_, EntityStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outputs(&self) -> MutexGuard<'_, Outputs> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one store operation atomically.
    pub fn edit<R>(&self, op: impl FnOnce(&mut EntityStore) -> R) -> R {
        op(&mut self.store())
    }

    pub fn read<R>(&self, op: impl FnOnce(&EntityStore) -> R) -> R {
        op(&self.store())
    }

    pub fn snapshot(&self) -> EntityStore {
        self.store().clone()
    }

    // ---- composition ----

    /// Composes the current scene and keeps the result as the displayed
    /// prompt. A scene without characters is rejected.
    pub fn compose(&self) -> Result<String, ValidationError> {
        let text = {
            let store = self.store();
            if store.characters().is_empty() {
                return Err(ValidationError::NoCharacters);
            }
            compose(&store)
        };
        self.outputs().composed = text.clone();
        Ok(text)
    }

    pub fn composed(&self) -> String {
        self.outputs().composed.clone()
    }

    pub fn refined(&self) -> Option<String> {
        self.outputs().refined.clone()
    }

    // ---- loading flags ----

    pub fn is_loading(&self, key: &SuggestionKey) -> bool {
        self.loading.is_active(key)
    }

    pub fn is_refining(&self) -> bool {
        self.refining.is_active(&())
    }

    // ---- suggestions ----

    /// Suggests an action for a character and stores it in the character's
    /// action entry. On failure the entry keeps its previous value.
    pub async fn suggest_action(&self, id: &CharacterId) -> Result<String, SuggestionError> {
        let character = self
            .read(|store| store.character(id).cloned())
            .ok_or_else(|| SuggestionError::UnknownCharacter(id.clone()))?;

        let _loading = self.loading.begin(SuggestionKey::Action(id.clone()));
        let action = self
            .suggestions
            .suggest_action(&character)
            .await
            .inspect_err(|e| tracing::warn!(id = %id, error = %e, "action suggestion failed"))?;

        self.edit(|store| store.set_character_action(id, ActionUpdate::Action(action.clone())))?;
        Ok(action)
    }

    /// Suggests the sentence of a character's embedded dialogue line.
    pub async fn suggest_dialogue_line(
        &self,
        id: &CharacterId,
        index: usize,
    ) -> Result<String, SuggestionError> {
        let key = SuggestionKey::DialogueLine {
            char_id: id.clone(),
            index,
        };
        let (request, scene) = self
            .read(|store| {
                let speaker = store.character(id)?.clone();
                let line = store.dialogue_line(id, index)?;
                let target = line
                    .target_char_id
                    .as_ref()
                    .and_then(|t| store.character(t))
                    .cloned();
                let request = DialogueRequest {
                    speaker,
                    dialogue_type: line.dialogue_type,
                    target,
                };
                Some((request, SceneContext::from_scene(store.scene())))
            })
            .ok_or_else(|| SuggestionError::UnknownDialogue(key.clone()))?;

        let _loading = self.loading.begin(key.clone());
        let sentence = self
            .suggestions
            .suggest_dialogue_sentence(&request, &scene)
            .await
            .inspect_err(|e| {
                tracing::warn!(key = %key, error = %e, "dialogue suggestion failed")
            })?;

        self.edit(|store| {
            store.update_dialogue_line(id, index, DialogueUpdate::Sentence(sentence.clone()))
        })?;
        Ok(sentence)
    }

    /// Suggests the sentence of a global spoken dialogue entry.
    pub async fn suggest_spoken_sentence(&self, index: usize) -> Result<String, SuggestionError> {
        let key = SuggestionKey::SpokenDialogue(index);
        let (request, scene) = self
            .read(|store| {
                let entry = store.spoken_dialogue().get(index)?;
                let speaker = store.character(&entry.char_id)?.clone();
                let target = match entry.dialogue_type {
                    DialogueType::AddressAudience => None,
                    _ => entry
                        .target_char_id
                        .as_ref()
                        .and_then(|t| store.character(t))
                        .cloned(),
                };
                let request = DialogueRequest {
                    speaker,
                    dialogue_type: entry.dialogue_type,
                    target,
                };
                Some((request, SceneContext::from_scene(store.scene())))
            })
            .ok_or_else(|| SuggestionError::UnknownDialogue(key.clone()))?;

        let _loading = self.loading.begin(key.clone());
        let sentence = self
            .suggestions
            .suggest_dialogue_sentence(&request, &scene)
            .await
            .inspect_err(|e| {
                tracing::warn!(key = %key, error = %e, "dialogue suggestion failed")
            })?;

        self.edit(|store| {
            store.update_spoken_dialogue(index, DialogueUpdate::Sentence(sentence.clone()))
        })?;
        Ok(sentence)
    }

    // ---- refinement ----

    /// Refines the displayed composed prompt. Only one refinement may be
    /// outstanding; a failure leaves the previous refined text in place.
    pub async fn refine(&self) -> Result<String, RefineError> {
        let _slot = self.refining.try_begin(()).ok_or(RefineError::InFlight)?;
        let composed = self.composed();

        let refined = self
            .refinement
            .refine(&composed)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "refinement failed"))?;

        self.outputs().refined = Some(refined.clone());
        tracing::info!(chars = refined.chars().count(), "refinement complete");
        Ok(refined)
    }
}
