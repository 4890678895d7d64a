//! Question-answering pipeline and the interactive chat loop.

pub mod pipeline;
pub mod repl;

pub use pipeline::AnswerPipeline;
pub use repl::{is_exit_command, run_chat_loop};
