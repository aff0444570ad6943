pub mod backend;
pub mod ollama;

pub use crate::backend::{LlmClient, LlmError};
pub use crate::ollama::{OllamaClient, OllamaConfig};
