/// Refinement client — rewrites a composed prompt in the target language.

use thiserror::Error;

use crate::core::generation::{GenerateRequest, GenerationError, GenerationPort};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("a refinement is already in progress")]
    InFlight,
    #[error("there is no composed prompt to refine")]
    EmptyPrompt,
}

/// Instruction embedding the full composed text. Quoted dialogue must come
/// back unchanged, in its original language.
pub fn refine_instruction(composed: &str) -> String {
    format!(
        "Rewrite the following Indonesian description of an animated scene as one polished, \
         cinematic English prompt for an AI video generator. Keep every character detail, \
         action, camera, lighting, style and mood cue. Every sentence inside double quotes is \
         spoken dialogue: copy it exactly as written, in its original language, and keep it \
         inside double quotes. Reply with the rewritten prompt only.\n\n{}",
        composed.trim()
    )
}

#[derive(Debug, Clone)]
pub struct RefinementClient<G> {
    port: G,
}

impl<G: GenerationPort> RefinementClient<G> {
    pub fn new(port: G) -> Self {
        Self { port }
    }

    pub async fn refine(&self, composed: &str) -> Result<String, RefineError> {
        if composed.trim().is_empty() {
            return Err(RefineError::EmptyPrompt);
        }
        let request = GenerateRequest::from_instruction(refine_instruction(composed));
        let refined = self.port.generate(request).await?;
        Ok(refined.trim().to_string())
    }
}
