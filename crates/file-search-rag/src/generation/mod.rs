//! Grounded generation: wire types, prompts and answer rendering

pub mod grounding;
pub mod markdown;
pub mod prompt;

pub use grounding::{into_search_result, GenerateContentResponse, GenerateRequest};
pub use prompt::PromptSet;
