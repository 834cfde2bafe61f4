//! Text generation boundary and prompt construction

pub mod generator;
pub mod prompts;

pub use generator::{CommandGenerator, Explanation, TextGenerator};
pub use prompts::PromptTemplates;
