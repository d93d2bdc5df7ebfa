//! Scene Prompt — structured authoring of prompts for animated video scenes.
//!
//! Characters, their actions and dialogue, and the scene's cinematic
//! attributes are kept in an entity store and compiled into one deterministic
//! Indonesian prompt. A generation service can suggest single field values
//! and refine the compiled prompt into English.

pub mod core;
pub mod schema;
