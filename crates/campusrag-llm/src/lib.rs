//! Completion-service client and prompt assembly.

pub mod error;
pub mod gemini;
pub mod prompt;

pub use error::LlmError;
pub use gemini::{parse_completion, GeminiClient, DEFAULT_MODEL};
pub use prompt::build_prompt;
