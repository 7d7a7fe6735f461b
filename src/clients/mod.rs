pub mod firebase;
pub mod openrouter;
