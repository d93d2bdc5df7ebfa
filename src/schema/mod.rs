pub mod character;
pub mod dialogue;
pub mod scene;
